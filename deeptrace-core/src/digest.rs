//! Content digests.
//!
//! Every analysis is keyed off the SHA-256 of the uploaded bytes. The digest is
//! kept as its lowercase hexadecimal text because both the score seed and the
//! ledger simulation read individual hex characters.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{DeeptraceError, Result};

/// Number of leading hex characters that make up the score seed.
const SEED_HEX_CHARS: usize = 8;

/// Lowercase hexadecimal content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Hash raw bytes with SHA-256.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hex::encode(hasher.finalize()))
    }

    /// Accept a caller-supplied digest.
    ///
    /// Any base-16 numeral is accepted: surrounding whitespace, a leading
    /// sign, a `0x` prefix, and single `_` separators between digits are
    /// allowed and dropped. The digest keeps the remaining digits lower-cased.
    /// It is not required to be 64 characters long.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let unsigned = trimmed
            .strip_prefix(|c: char| c == '+' || c == '-')
            .unwrap_or(trimmed);
        let body = match unsigned.get(..2) {
            // One separator may follow the prefix: `0x_ff`
            Some(prefix) if prefix.eq_ignore_ascii_case("0x") => {
                let rest = &unsigned[2..];
                rest.strip_prefix('_').unwrap_or(rest)
            }
            _ => unsigned,
        };

        let mut digits = String::with_capacity(body.len());
        let mut after_separator = false;
        for c in body.chars() {
            match c {
                '_' if digits.is_empty() || after_separator => {
                    return Err(misplaced_separator());
                }
                '_' => after_separator = true,
                c if c.is_ascii_hexdigit() => {
                    digits.push(c.to_ascii_lowercase());
                    after_separator = false;
                }
                other => {
                    return Err(DeeptraceError::InvalidDigest(format!(
                        "'{}' is not a hexadecimal digit",
                        other
                    )));
                }
            }
        }

        if after_separator {
            return Err(misplaced_separator());
        }
        if digits.is_empty() {
            return Err(DeeptraceError::InvalidDigest("digest is empty".into()));
        }

        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Integer value of the first eight hex characters.
    pub fn seed(&self) -> u64 {
        let end = self.0.len().min(SEED_HEX_CHARS);
        // Both constructors guarantee ASCII hex digits.
        u64::from_str_radix(&self.0[..end], 16).unwrap_or(0)
    }

    /// Whether the digest, read as one base-16 integer, is even.
    ///
    /// Parity of a base-16 numeral is decided by its last digit alone.
    pub fn is_even(&self) -> bool {
        self.0
            .bytes()
            .last()
            .and_then(|b| (b as char).to_digit(16))
            .map(|nibble| nibble % 2 == 0)
            .unwrap_or(false)
    }
}

fn misplaced_separator() -> DeeptraceError {
    DeeptraceError::InvalidDigest("'_' must sit between two digits".into())
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_of_empty_input() {
        let digest = ContentDigest::from_bytes(b"");
        assert_eq!(
            digest.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_known_vector() {
        let digest = ContentDigest::from_bytes(b"abc");
        assert_eq!(
            digest.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_is_deterministic_and_fixed_length() {
        for input in [&b""[..], b"a", b"clip contents", &[0u8; 4096]] {
            let a = ContentDigest::from_bytes(input);
            let b = ContentDigest::from_bytes(input);
            assert_eq!(a, b);
            assert_eq!(a.as_str().len(), 64);
            assert!(a
                .as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn test_seed_reads_first_eight_hex_chars() {
        let digest = ContentDigest::parse("000000ff00000000").unwrap();
        assert_eq!(digest.seed(), 255);

        let digest = ContentDigest::from_bytes(b"abc");
        assert_eq!(digest.seed(), 0xba7816bf);
    }

    #[test]
    fn test_seed_of_short_digest() {
        let digest = ContentDigest::parse("1f").unwrap();
        assert_eq!(digest.seed(), 31);
    }

    #[test]
    fn test_parse_lowercases() {
        let digest = ContentDigest::parse("ABCDEF01").unwrap();
        assert_eq!(digest.as_str(), "abcdef01");
    }

    #[test]
    fn test_parse_accepts_numeral_forms() {
        let cases = [
            ("0x1234", "1234"),
            ("0XABCD", "abcd"),
            (" abcd ", "abcd"),
            ("\tff\n", "ff"),
            ("dead_beef", "deadbeef"),
            ("0x_1f", "1f"),
            ("-0x1a", "1a"),
            ("+7", "7"),
            ("0b1", "0b1"),
        ];
        for (input, expected) in cases {
            let digest = ContentDigest::parse(input).unwrap();
            assert_eq!(digest.as_str(), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!(matches!(
            ContentDigest::parse("xyz"),
            Err(DeeptraceError::InvalidDigest(_))
        ));
        for input in [
            "", "   ", "0x", "-", "12 34", "_12", "12_", "1__2", "0x__1", "0x-1", "--1", "0xx1",
        ] {
            assert!(ContentDigest::parse(input).is_err(), "input {:?}", input);
        }
    }

    #[test]
    fn test_parity_follows_last_nibble() {
        assert!(ContentDigest::parse("ffa").unwrap().is_even());
        assert!(!ContentDigest::parse("00b").unwrap().is_even());
        assert!(ContentDigest::parse("0").unwrap().is_even());
        assert!(!ContentDigest::parse("F").unwrap().is_even());
        assert!(ContentDigest::parse("0x1234").unwrap().is_even());
        assert!(!ContentDigest::parse(" abcd ").unwrap().is_even());
        assert!(ContentDigest::parse("-0x1a").unwrap().is_even());
    }
}
