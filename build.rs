use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

// RRR's enumerative coding needs C(n, k) for n, k in [0, t] where t = 63 (see
// rrr::tables). Unlike the usual convention C(n, 0) = 1, the kernel in
// rrr::tables::{offset_of, of_offset} never queries a binomial once its
// class counter has reached zero, so we store C(n, 0) = C(0, k) = 0 instead
// of 1. Precomputing the table here avoids recomputing ~4,000 binomial
// coefficients, several of them close to u64::MAX, on every process start.
//
// The recurrence is the standard one:
//
//   C(n, n) = 1
//   C(n, k) = C(n - 1, k - 1) + C(n - 1, k)     for 0 < k < n
//
// computed with the textbook C(n, 0) = 1 base case internally (so the
// recurrence stays correct), then the n = 0 row and k = 0 column are
// overwritten with zero in the emitted table.

const T: usize = 63;

fn main() {
    let out_dir = env::var_os("OUT_DIR").expect("Failed to get output directory");
    let dst_path = Path::new(&out_dir).join("binomial.rs");

    let mut table = vec![vec![0u64; T + 1]; T + 1];
    for n in 0..=T {
        table[n][0] = 1;
        table[n][n] = 1;
        for k in 1..n {
            table[n][k] = table[n - 1][k - 1] + table[n - 1][k];
        }
    }

    let mut code = String::new();
    writeln!(
        code,
        "pub const BINOM: [[u64; {len}]; {len}] = [",
        len = T + 1
    )
    .unwrap();
    for n in 0..=T {
        write!(code, "    [").unwrap();
        for k in 0..=T {
            let value = if n == 0 || k == 0 { 0 } else { table[n][k] };
            write!(code, "{}, ", value).unwrap();
        }
        writeln!(code, "],").unwrap();
    }
    writeln!(code, "];").unwrap();

    writeln!(code).unwrap();
    writeln!(
        code,
        "pub const BITS_FOR_OFFSET: [u8; {}] = [",
        T + 1
    )
    .unwrap();
    write!(code, "    ").unwrap();
    for c in 0..=T {
        // Width needed for an offset in [0, C(t, c)], i.e. ceil(log2(C(t, c) + 1)).
        let count = table[T][c];
        let width = bits_to_represent(count);
        write!(code, "{}, ", width).unwrap();
    }
    writeln!(code).unwrap();
    writeln!(code, "];").unwrap();

    fs::write(&dst_path, code).expect("Failed to write binomial coefficient table");
    println!("cargo:rerun-if-changed=build.rs");
}

/// ceil(log2(count + 1)): the number of bits needed to distinguish
/// `count + 1` values (offsets `0..=count`).
fn bits_to_represent(count: u64) -> u8 {
    let values = count + 1;
    if values <= 1 {
        return 0;
    }
    (64 - (values - 1).leading_zeros()) as u8
}
