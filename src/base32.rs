use std::sync::OnceLock;

use data_encoding::{Encoding, Specification};

use crate::UntisError;

const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const PADDING: char = '=';

/// RFC 4648 base32 without padding that tolerates non-zero trailing bits,
/// so secrets handed out by the server decode whatever their last symbol is.
fn secret_encoding() -> &'static Encoding {
    static ENCODING: OnceLock<Encoding> = OnceLock::new();

    ENCODING.get_or_init(|| {
        let mut spec = Specification::new();
        spec.symbols.push_str(ALPHABET);
        spec.check_trailing_bits = false;
        spec.encoding()
            .expect("the RFC 4648 alphabet is a valid base32 specification")
    })
}

/// Decodes a secret (given as an RFC4648 base32-encoded ASCII string)
/// into a byte string.
///
/// The input is case-insensitive and trailing `=` padding is ignored.
/// Bits left over after the last complete byte are discarded.
pub fn decode(secret: &str) -> Result<Vec<u8>, UntisError> {
    let unpadded = secret.trim_end_matches(PADDING);

    let mut normalized = String::with_capacity(unpadded.len());
    for (position, character) in unpadded.chars().enumerate() {
        let upper = character.to_ascii_uppercase();
        if !ALPHABET.contains(upper) {
            return Err(UntisError::InvalidEncoding {
                character,
                position,
            });
        }
        normalized.push(upper);
    }

    let usable = usable_len(normalized.len());

    // Every symbol is in the alphabet and the length is a valid one here,
    // so the decoder cannot fail
    secret_encoding()
        .decode(&normalized.as_bytes()[..usable])
        .map_err(UntisError::SecretDecode)
}

/// Length of the longest prefix that still yields every complete byte.
///
/// A block of 8 symbols carries 5 bytes; 1, 3 or 6 symbols into a block the
/// last symbol only contributes bits to an incomplete byte.
fn usable_len(len: usize) -> usize {
    match len % 8 {
        1 | 3 | 6 => len - 1,
        _ => len,
    }
}
