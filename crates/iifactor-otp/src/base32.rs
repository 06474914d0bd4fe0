//! RFC 4648 Base32 for OTP shared secrets.
//!
//! Decoding is lenient in the ways real-world key URIs need: case and
//! whitespace are ignored, `=` padding is optional, and leftover bits after
//! the last full byte are dropped even when they are non-zero.

use data_encoding::{Encoding, BASE32_NOPAD};

use crate::error::Base32Error;

const PADDING: char = '=';

/// Whether `c` belongs to the Base32 alphabet (either case).
const fn is_symbol(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'a'..='z' | '2'..='7')
}

/// `BASE32_NOPAD` with trailing-bit checking disabled.
fn permissive() -> Result<Encoding, Base32Error> {
    let mut spec = BASE32_NOPAD.specification();
    spec.check_trailing_bits = false;
    spec.encoding()
        .map_err(|e| Base32Error::Encoding(e.to_string()))
}

/// Strip whitespace and padding and uppercase the rest.
///
/// Does not validate; use [`decode`] for that.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut symbols: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let len = symbols.trim_end_matches(PADDING).len();
    symbols.truncate(len);
    symbols
}

/// Decode Base32 text into bytes.
///
/// Empty (or all-whitespace) input yields an empty vector.
///
/// # Errors
///
/// Returns [`Base32Error::InvalidCharacter`] for a character outside the
/// alphabet, or for padding followed by more symbols.
pub fn decode(text: &str) -> Result<Vec<u8>, Base32Error> {
    let mut symbols = String::with_capacity(text.len());
    let mut padding_at: Option<usize> = None;

    for (position, character) in text.char_indices() {
        if character.is_whitespace() {
            continue;
        }
        if character == PADDING {
            padding_at.get_or_insert(position);
            continue;
        }
        if let Some(position) = padding_at {
            return Err(Base32Error::InvalidCharacter {
                character: PADDING,
                position,
            });
        }
        if !is_symbol(character) {
            return Err(Base32Error::InvalidCharacter {
                character,
                position,
            });
        }
        symbols.push(character.to_ascii_uppercase());
    }

    // 1, 3 or 6 symbols past a full block leave a last symbol that holds no
    // complete byte; dropping it gives the same bytes as a bit accumulator.
    if matches!(symbols.len() % 8, 1 | 3 | 6) {
        symbols.pop();
    }

    permissive()?
        .decode(symbols.as_bytes())
        .map_err(|e| Base32Error::Encoding(e.to_string()))
}

/// Encode bytes as unpadded uppercase Base32.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    BASE32_NOPAD.encode(bytes)
}
