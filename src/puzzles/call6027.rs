//! Brute-force search for the register-7 value that makes the teleporter's
//! recursive subroutine return 6 when called with `(r0, r1) = (4, 1)`.
//!
//! The subroutine is a three-argument Ackermann-like recurrence:
//!
//! ```text
//! f(0, b, k) = (b + 1) mod 32768
//! f(a, 0, k) = f(a - 1, k, k)
//! f(a, b, k) = f(a - 1, f(a, b - 1, k), k)
//! ```
//!
//! `f(a, b, k)` for fixed `a` and `k` is `g_a` applied `b + 1` times to seed
//! `k`, where `g_a(y) = f(a - 1, y, k)`. For `a <= 2`, `g_a` has a closed
//! affine form in its argument; for `a == 3` it doesn't compose into one
//! further closed form, so it's tabulated once per candidate `k` and reused
//! for the two lookups `f(4, 1, k)` needs.

use rayon::prelude::*;

use crate::error::ToolError;

const MODULUS: u32 = 32768;

/// `g2(y) = f(2, y, k)`, which is affine in `y`: `g2(y) = (k1*y + c1) mod M`
/// where `k1 = (k+1) mod M` and `c1 = (k + k1) mod M`.
fn g2_coefficients(k: u32) -> (u32, u32) {
    let k1 = (k + 1) % MODULUS;
    let c1 = (k as u64 + k1 as u64) as u32 % MODULUS;
    (k1, c1)
}

fn g2(y: u32, k1: u32, c1: u32) -> u32 {
    ((k1 as u64 * y as u64 + c1 as u64) % MODULUS as u64) as u32
}

/// Builds the table `g3[b] = f(3, b, k)` for every `b` in `0..MODULUS`.
fn g3_table(k: u32) -> Vec<u32> {
    let (k1, c1) = g2_coefficients(k);
    let mut table = vec![0u32; MODULUS as usize];
    table[0] = g2(k, k1, c1);
    for b in 1..MODULUS as usize {
        table[b] = g2(table[b - 1], k1, c1);
    }
    table
}

/// Evaluates `f(4, 1, k)` given `k`'s `g3` table.
fn f_four_one(k: u32, g3: &[u32]) -> u32 {
    let step0 = g3[k as usize];
    g3[step0 as usize]
}

/// Finds the `r7` value such that `f(4, 1, r7) == target`, resolving the
/// recursive `call 6027` return value without ever running the VM. Shards
/// the search across `rayon`'s worker pool, since each candidate `k` is an
/// independent table build.
pub fn search_call_6027(target: u32) -> Result<u32, ToolError> {
    (0..MODULUS)
        .into_par_iter()
        .find_map_any(|k| {
            let g3 = g3_table(k);
            if f_four_one(k, &g3) == target {
                Some(k)
            } else {
                None
            }
        })
        .ok_or(ToolError::NoSolution("call-6027 register 7"))
}
