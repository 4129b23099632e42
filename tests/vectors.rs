use num_bigint::{BigInt, BigUint};
use polymorph::permutation::{self, PermutationError};
use polymorph::prng::{RadixGenerator, SPECIAL_CHARS};

/// Builds a seed whose mixed-radix digits, least significant first, are
/// `digits[i]` in radix `radices[i]`, on top of `rest`.
fn seed_from_digits(rest: u64, digits: &[(u64, u64)]) -> BigUint {
    let mut seed = BigUint::from(rest);
    for &(digit, radix) in digits.iter().rev() {
        seed = seed * radix + digit;
    }
    seed
}

#[test]
fn next_below_seed_zero() {
    let mut gen = RadixGenerator::new(BigUint::from(0u32));
    assert_eq!(gen.next_below(20), 0);
    assert_eq!(gen.next_below(40), 0);
    assert_eq!(gen.next_below(30), 0);
}

#[test]
fn next_below_decodes_mixed_radix_digits() {
    let seed = seed_from_digits(217, &[(17, 20), (11, 40), (29, 30)]);
    let mut gen = RadixGenerator::new(seed);
    assert_eq!(gen.next_below(20), 17);
    assert_eq!(gen.next_below(40), 11);
    assert_eq!(gen.next_below(30), 29);
    assert_eq!(gen.remaining(), &BigUint::from(217u32));
}

#[test]
fn next_big_below_decodes_mixed_radix_digits() {
    let seed = seed_from_digits(88, &[(44, 45), (0, 17), (111, 137)]);
    let mut gen = RadixGenerator::new(seed);
    assert_eq!(gen.next_big_below(&BigUint::from(45u32)), BigUint::from(44u32));
    assert_eq!(gen.next_big_below(&BigUint::from(17u32)), BigUint::from(0u32));
    assert_eq!(gen.next_big_below(&BigUint::from(137u32)), BigUint::from(111u32));
    assert_eq!(gen.into_inner(), BigUint::from(88u32));
}

#[test]
fn next_in_range_offsets_by_min() {
    let seed = seed_from_digits(314, &[(4, 10), (10, 14), (0, 11)]);
    let mut gen = RadixGenerator::new(seed);
    assert_eq!(gen.next_in_range(100, 109), 104);
    assert_eq!(gen.next_in_range(200, 213), 210);
    assert_eq!(gen.next_in_range(312, 322), 312);
}

#[test]
fn next_char_in_degenerate_range_consumes_nothing() {
    let seed = seed_from_digits(
        12,
        &[
            ((b'H' - b'A') as u64, 26),
            ((b'e' - b'a') as u64, 26),
            ((b'l' - b'b') as u64, 24),
            (0, 1),
            ((b'o' - b'a') as u64, 26),
        ],
    );
    let mut gen = RadixGenerator::new(seed);
    assert_eq!(gen.next_char_in('A', 'Z'), 'H');
    assert_eq!(gen.next_char_in('a', 'z'), 'e');
    assert_eq!(gen.next_char_in('b', 'y'), 'l');
    let before = gen.clone();
    assert_eq!(gen.next_char_in('l', 'l'), 'l');
    assert_eq!(gen, before, "single-value range must not change the state");
    assert_eq!(gen.next_char_in('a', 'z'), 'o');
}

#[test]
fn letters_and_digits() {
    let word: Vec<(u64, u64)> = "WORLD".bytes().map(|b| ((b - b'A') as u64, 26)).collect();

    let mut gen = RadixGenerator::new(seed_from_digits(872, &word));
    let upper: String = (0..5).map(|_| gen.next_upper()).collect();
    assert_eq!(upper, "WORLD");

    let mut gen = RadixGenerator::new(seed_from_digits(872, &word));
    let lower: String = (0..5).map(|_| gen.next_lower()).collect();
    assert_eq!(lower, "world");

    let mut gen = RadixGenerator::new(seed_from_digits(213, &[(0, 10), (5, 10), (9, 10)]));
    let digits: String = (0..3).map(|_| gen.next_digit()).collect();
    assert_eq!(digits, "059");
}

#[test]
fn special_chars_use_fixed_order() {
    assert_eq!(SPECIAL_CHARS.len(), 32);
    assert!(SPECIAL_CHARS.bytes().all(|b| b.is_ascii_punctuation()));

    let mut gen = RadixGenerator::new(seed_from_digits(131, &[(0, 32), (1, 32), (31, 32)]));
    assert_eq!(gen.next_special(), '!');
    assert_eq!(gen.next_special(), '"');
    assert_eq!(gen.next_special(), '~');
}

#[test]
fn next_in_str_picks_by_position() {
    let seed = seed_from_digits(968, &[(5, 6), (3, 6), (1, 6), (2, 6), (4, 6)]);
    let mut gen = RadixGenerator::new(seed);
    let picked: String = (0..5).map(|_| gen.next_in_str("ROMAIN")).collect();
    assert_eq!(picked, "NAOMI");
}

#[test]
fn next_permutation_draws_rank_modulo_factorial() {
    let seed = seed_from_digits(12, &[(533, 720), (719, 720), (0, 720)]);
    let mut gen = RadixGenerator::new(seed);
    assert_eq!(gen.next_permutation("ROMAIN"), "NAOMIR");
    assert_eq!(gen.next_permutation("ROMAIN"), "NIAMOR");
    assert_eq!(gen.next_permutation("ROMAIN"), "ROMAIN");
    assert_eq!(gen.remaining(), &BigUint::from(12u32));
}

#[test]
#[should_panic(expected = "count must be > 0")]
fn next_below_zero_count_panics() {
    RadixGenerator::new(BigUint::from(5u32)).next_below(0);
}

#[test]
#[should_panic(expected = "min must be <= max")]
fn next_in_range_inverted_bounds_panics() {
    RadixGenerator::new(BigUint::from(5u32)).next_in_range(3, 2);
}

const PERM_TABLE: [&str; 24] = [
    "perm", "eprm", "rpem", "mper", "prem", "erpm", "repm", "mepr", "pmer", "empr", "rmpe",
    "mrpe", "pemr", "epmr", "rpme", "mpre", "prme", "ermp", "remp", "merp", "pmre", "emrp",
    "rmep", "mrep",
];

#[test]
fn permutation_table_wraps_modulo_factorial() {
    for k in 0..100u32 {
        assert_eq!(
            permutation::kth_permutation("perm", &BigUint::from(k)),
            PERM_TABLE[k as usize % 24],
            "rank {}",
            k
        );
    }
}

#[test]
fn permutation_ranks_cover_all_orderings_once() {
    let mut seen = std::collections::BTreeSet::new();
    for k in 0..24u32 {
        seen.insert(permutation::kth_permutation("abcd", &BigUint::from(k)));
    }
    assert_eq!(seen.len(), 24);
    for p in &seen {
        let mut chars: Vec<char> = p.chars().collect();
        chars.sort_unstable();
        assert_eq!(chars.into_iter().collect::<String>(), "abcd");
    }
}

#[test]
fn permutation_keeps_duplicates_positional() {
    assert_eq!(permutation::kth_permutation("aab", &BigUint::from(3u32)), "aba");
    let all: Vec<String> = (0..6u32)
        .map(|k| permutation::kth_permutation("aab", &BigUint::from(k)))
        .collect();
    assert_eq!(all.iter().filter(|p| p.as_str() == "aab").count(), 2);
}

#[test]
fn permutation_of_empty_string() {
    for k in [0u32, 1, 17] {
        assert_eq!(permutation::kth_permutation("", &BigUint::from(k)), "");
    }
    assert_eq!(permutation::try_kth_permutation("", &BigInt::from(0)), Ok(String::new()));
}

#[test]
fn permutation_rejects_negative_rank() {
    assert_eq!(
        permutation::try_kth_permutation("1234", &BigInt::from(-1)),
        Err(PermutationError::NegativeRank)
    );
    assert_eq!(
        permutation::try_kth_permutation("", &BigInt::from(-1)),
        Err(PermutationError::NegativeRank)
    );
    assert_eq!(
        permutation::try_kth_permutation("perm", &BigInt::from(25)).unwrap(),
        "eprm"
    );
}

#[test]
fn rank_of_indices_inverts_decoding() {
    for k in 0..120u32 {
        let rank = BigUint::from(k);
        let indices = permutation::permutation_indices(5, &rank);
        assert_eq!(permutation::rank_of_indices(&indices), rank);
    }
}

#[test]
fn factorial_small_values() {
    assert_eq!(permutation::factorial(0), BigUint::from(1u32));
    assert_eq!(permutation::factorial(1), BigUint::from(1u32));
    assert_eq!(permutation::factorial(6), BigUint::from(720u32));
    assert_eq!(
        permutation::factorial(20),
        BigUint::from(2_432_902_008_176_640_000u64)
    );
}
