//! Term hashing for the open-addressed tables.
//!
//! The fold is `h = (h << 5) - h + byte` over a 64-bit signed accumulator that wraps on
//! overflow, with each byte sign-extended the way a C `char` is on x86. Bucket placement,
//! and with it the row order of the dictionary file, depends on these exact bits, so
//! indexes written by earlier builds stay readable only while this stays unchanged.

/// Hash a term. Pure and deterministic across runs and platforms.
pub fn term_hash(term: &str) -> i64 {
    // The legacy fold also masked `h & h` after every step; that is the identity.
    term.bytes()
        .fold(0i64, |h, b| h.wrapping_shl(5).wrapping_sub(h).wrapping_add(b as i8 as i64))
}

/// Starting bucket for `term` in a table of `capacity` slots.
///
/// The hash is reinterpreted as unsigned before reduction, so negative hashes still land
/// in `0..capacity`.
pub fn bucket(term: &str, capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    ((term_hash(term) as u64) % capacity as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        assert_eq!(term_hash(""), 0);
        assert_eq!(term_hash("a"), 97);
        assert_eq!(term_hash("cat"), 98_262);
        assert_eq!(term_hash("dog"), 99_644);
        assert_eq!(term_hash("fish"), 3_143_256);
    }

    #[test]
    fn matches_times_31_fold() {
        let term = "internationalization-of-everything";
        let expected = term
            .bytes()
            .fold(0i64, |h, b| h.wrapping_mul(31).wrapping_add(b as i8 as i64));
        assert_eq!(term_hash(term), expected);
    }

    #[test]
    fn high_bytes_are_sign_extended() {
        // "é" is 0xC3 0xA9 in UTF-8, i.e. -61 and -87 as signed chars.
        assert_eq!(term_hash("é"), -61 * 31 - 87);
        assert!(bucket("é", 7) < 7);
    }

    #[test]
    fn wrapped_hash_still_maps_into_range() {
        let term = "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz";
        let h = term_hash(term);
        assert_eq!(bucket(term, 1_000), ((h as u64) % 1_000) as usize);
        for cap in [1usize, 2, 3, 6, 97, 30_000] {
            assert!(bucket(term, cap) < cap);
        }
    }

    #[test]
    fn buckets_for_small_table() {
        assert_eq!(bucket("cat", 6), 0);
        assert_eq!(bucket("dog", 6), 2);
        assert_eq!(bucket("fish", 6), 0);
    }
}
