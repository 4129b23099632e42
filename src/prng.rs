use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

use crate::permutation;

/// Printable ASCII special characters, in code point order.
/// The position of each character is its digit value when drawn.
pub const SPECIAL_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Deterministic stream of values decoded from a single large integer.
///
/// Every draw takes the least significant digit of the state in the radix
/// given by the caller, and keeps the quotient. A sequence of draws is thus
/// the mixed-radix decomposition of the seed; the order and the radices of the
/// calls are part of the output contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RadixGenerator {
    state: BigUint,
}

impl RadixGenerator {
    pub fn new(seed: BigUint) -> Self {
        Self { state: seed }
    }

    /// Value not yet consumed.
    pub fn remaining(&self) -> &BigUint {
        &self.state
    }

    pub fn into_inner(self) -> BigUint {
        self.state
    }

    /// Draws a value in [0, count).
    pub fn next_big_below(&mut self, count: &BigUint) -> BigUint {
        assert!(!count.is_zero(), "count must be > 0");
        let (quotient, remainder) = self.state.div_rem(count);
        self.state = quotient;
        remainder
    }

    /// Draws a value in [0, count).
    pub fn next_below(&mut self, count: u32) -> u32 {
        assert!(count > 0, "count must be > 0");
        let digit = self.next_big_below(&BigUint::from(count));
        // remainder < count, so it always fits
        digit.to_u32().unwrap_or_default()
    }

    /// Draws a value in [min, max], both inclusive.
    ///
    /// When `min == max` the draw is a division by one: the state is left
    /// unchanged and `min` is returned.
    pub fn next_in_range(&mut self, min: u32, max: u32) -> u32 {
        assert!(min <= max, "min must be <= max");
        min + self.next_below(max - min + 1)
    }

    /// Draws a character with a code point in [min, max].
    pub fn next_char_in(&mut self, min: char, max: char) -> char {
        let code = self.next_in_range(min as u32, max as u32);
        // Every code point between two ASCII bounds is a valid scalar.
        char::from_u32(code).unwrap_or(min)
    }

    pub fn next_upper(&mut self) -> char {
        self.next_char_in('A', 'Z')
    }

    pub fn next_lower(&mut self) -> char {
        self.next_char_in('a', 'z')
    }

    pub fn next_digit(&mut self) -> char {
        self.next_char_in('0', '9')
    }

    pub fn next_special(&mut self) -> char {
        self.next_in_str(SPECIAL_CHARS)
    }

    /// Picks one character of `chars`, by position.
    pub fn next_in_str(&mut self, chars: &str) -> char {
        let len = chars.chars().count();
        assert!(
            len > 0 && len <= u32::MAX as usize,
            "string length must be within [1, u32::MAX]"
        );
        let idx = self.next_below(len as u32) as usize;
        chars.chars().nth(idx).unwrap_or_default()
    }

    /// Draws one of the `n!` orderings of `chars`, where `n` is its length.
    pub fn next_permutation(&mut self, chars: &str) -> String {
        let n = chars.chars().count();
        let rank = self.next_big_below(&permutation::factorial(n));
        permutation::kth_permutation(chars, &rank)
    }
}

impl From<BigUint> for RadixGenerator {
    fn from(seed: BigUint) -> Self {
        Self::new(seed)
    }
}
