//! Reversible encoding of arbitrary version strings into alphabetic-only
//! storage keys.
//!
//! SQLite identifiers in the mapping store are built by prefixing table
//! names with an encoded version string, and version strings routinely
//! contain digits, dots and `+`/`-`. Each input byte becomes exactly two
//! letters: the high nibble indexes the alphabet from the front, the low
//! nibble indexes it from the back. The encoding is a bijection, so no
//! side table is needed to get the version string back.

const ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Encodes `text` into a string containing only ASCII letters.
///
/// The output is always exactly twice as long as the input.
pub fn encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);

    for byte in text.bytes() {
        out.push(ALPHABET[(byte >> 4) as usize] as char);
        out.push(ALPHABET[ALPHABET.len() - 1 - (byte & 0x0f) as usize] as char);
    }

    out
}

/// Decodes a string produced by [`encode`].
///
/// Returns `None` when `code` has odd length, contains a symbol outside the
/// alphabet, or does not correspond to any encoder output. Malformed input
/// is a normal outcome here, not a fault.
pub fn decode(code: &str) -> Option<String> {
    let bytes = code.as_bytes();

    if bytes.len() % 2 != 0 {
        return None;
    }

    let mut out = Vec::with_capacity(bytes.len() / 2);

    for pair in bytes.chunks_exact(2) {
        let hi = ALPHABET.iter().position(|&c| c == pair[0])?;
        let lo = ALPHABET.len() - 1 - ALPHABET.iter().position(|&c| c == pair[1])?;

        // Indices past the nibble range never come out of the encoder.
        if hi > 0x0f || lo > 0x0f {
            return None;
        }

        out.push(((hi << 4) | lo) as u8);
    }

    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_output_is_alphabetic_and_double_length() {
        let code = encode("1.15.2+build.7");
        assert_eq!(code.len(), "1.15.2+build.7".len() * 2);
        assert!(code.bytes().all(|b| b.is_ascii_alphabetic()));
    }

    #[test]
    fn empty_string_round_trips() {
        assert_eq!(decode(&encode("")), Some(String::new()));
    }
}
