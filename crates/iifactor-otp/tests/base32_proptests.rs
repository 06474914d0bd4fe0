#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for the Base32 codec.

use proptest::prelude::*;
use iifactor_otp::base32::{decode, encode, normalize};

/// Re-case every other symbol and sprinkle spaces between 4-symbol groups,
/// the way secrets are shown to users.
fn humanize(encoded: &str) -> String {
    encoded
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let c = if i % 2 == 0 { c.to_ascii_lowercase() } else { c };
            if i > 0 && i % 4 == 0 {
                format!(" {c}")
            } else {
                c.to_string()
            }
        })
        .collect()
}

/// Pad to a multiple of 8 symbols.
fn pad(encoded: &str) -> String {
    let missing = (8 - encoded.len() % 8) % 8;
    format!("{encoded}{}", "=".repeat(missing))
}

proptest! {
    /// decode(encode(b)) == b.
    #[test]
    fn decode_inverts_encode(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
        prop_assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
    }

    /// Case, spacing and padding never change the decoded bytes.
    #[test]
    fn decode_ignores_case_spacing_and_padding(
        bytes in proptest::collection::vec(any::<u8>(), 0..128),
    ) {
        let encoded = encode(&bytes);
        prop_assert_eq!(decode(&humanize(&encoded)).unwrap(), bytes.clone());
        prop_assert_eq!(decode(&pad(&encoded)).unwrap(), bytes);
    }

    /// encode(decode(s)) is s up to normalization, for canonical s.
    #[test]
    fn encode_inverts_decode_modulo_normalization(
        bytes in proptest::collection::vec(any::<u8>(), 0..128),
    ) {
        let text = pad(&humanize(&encode(&bytes)));
        prop_assert_eq!(encode(&decode(&text).unwrap()), normalize(&text));
    }

    /// Any string over the alphabet decodes, to floor(5n/8) bytes.
    #[test]
    fn any_alphabet_string_decodes(text in "[A-Za-z2-7]{0,64}") {
        let decoded = decode(&text).unwrap();
        prop_assert_eq!(decoded.len(), text.len() * 5 / 8);
    }

    /// Characters outside the alphabet are always rejected.
    #[test]
    fn foreign_characters_are_rejected(
        prefix in "[A-Z2-7]{0,16}",
        bad in "[0189!@#%&*+/,.;-]",
    ) {
        let text = format!("{prefix}{bad}");
        prop_assert!(decode(&text).is_err());
    }
}
