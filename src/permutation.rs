//! Ranked permutations in the factorial number system.
//!
//! Rank `k` of a sequence of length `n` is decoded into `n` Lehmer digits
//! (the first modulo `n`, the next modulo `n - 1`, ...) which are then turned
//! into absolute source positions. Ranks wrap modulo `n!`. Equal characters
//! are distinct positions and are never merged.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PermutationError {
    #[error("permutation rank must be non-negative")]
    NegativeRank,
}

/// `n!`; 1 for `n` of 0 or 1.
pub fn factorial(n: usize) -> BigUint {
    let mut acc = BigUint::one();
    for i in 2..=n {
        acc *= BigUint::from(i);
    }
    acc
}

/// Source positions, in output order, of the permutation with the given rank.
pub fn permutation_indices(n: usize, rank: &BigUint) -> Vec<usize> {
    let mut rank = rank.clone();
    let mut digits = Vec::with_capacity(n);
    for i in 0..n {
        let (quotient, digit) = rank.div_rem(&BigUint::from(n - i));
        // digit < n - i
        digits.push(digit.to_usize().unwrap_or_default());
        rank = quotient;
    }

    // Lehmer digits count among remaining positions; shift them to absolute ones.
    for i in (0..n).rev() {
        for j in (i + 1)..n {
            if digits[j] >= digits[i] {
                digits[j] += 1;
            }
        }
    }
    digits
}

/// Rank of the permutation given by its source positions.
///
/// Inverse of [`permutation_indices`]; `indices` must be an arrangement of
/// `0..indices.len()`. The result is in `[0, n!)`.
pub fn rank_of_indices(indices: &[usize]) -> BigUint {
    let n = indices.len();
    let mut digits = indices.to_vec();
    for i in 0..n {
        for j in (i + 1)..n {
            if digits[j] > digits[i] {
                digits[j] -= 1;
            }
        }
    }

    let mut rank = BigUint::zero();
    for i in (0..n).rev() {
        rank = rank * BigUint::from(n - i) + BigUint::from(digits[i]);
    }
    rank
}

/// The `rank`-th permutation of the characters of `chars`.
pub fn kth_permutation(chars: &str, rank: &BigUint) -> String {
    let source: Vec<char> = chars.chars().collect();
    permutation_indices(source.len(), rank)
        .into_iter()
        .map(|i| source[i])
        .collect()
}

/// Like [`kth_permutation`], for ranks held in a signed integer.
pub fn try_kth_permutation(chars: &str, rank: &BigInt) -> Result<String, PermutationError> {
    if rank.is_negative() {
        return Err(PermutationError::NegativeRank);
    }
    let rank = rank.magnitude();
    Ok(kth_permutation(chars, rank))
}
