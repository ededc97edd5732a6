pub mod base32;
pub mod client;
pub mod clock;
pub mod config;
pub mod rpc;
pub mod setup_uri;
pub mod timetable;
pub mod totp;

use std::{fmt::Display, str::FromStr};

pub use client::{DateRange, UntisClient};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::UntisConfig;
pub use timetable::{normalize, MergedPeriod, Period, ReferenceTables, Timetable};
pub use totp::{OtpCode, Totp};

#[derive(Debug, thiserror::Error)]
pub enum UntisError {
    #[error("Invalid base32 character {character:?} at position {position}")]
    InvalidEncoding { character: char, position: usize },
    #[error("Secret decode error")]
    SecretDecode(data_encoding::DecodeError),
    #[error("Invalid digest")]
    InvalidDigest(Vec<u8>),
    #[error("Invalid digit count, found {0}. Expected a value between 1 and 9")]
    InvalidDigits(u32),
    #[error("Invalid hashing algorithm, found {0}. Expected one of: SHA1, SHA256 or SHA512")]
    InvalidHashingAlgorithm(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Invalid date {0:?}. Expected YYYYMMDD or YYYY-MM-DD")]
    InvalidDate(String),
    #[error("The provided URI is not a setup URI, found {0}. Expected: {1}")]
    InvalidSetupUri(String, String),
    #[error("Could not parse the URI")]
    UriParseError(url::ParseError),
    #[error("Could not retrieve the {0} from the URI")]
    UriMissingField(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),
    #[error("Server returned error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Configuration error: {0}")]
    Config(::config::ConfigError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum HashAlgorithm {
    #[default]
    SHA1,
    SHA256,
    SHA512,
}

impl Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SHA1 => write!(f, "SHA1"),
            Self::SHA256 => write!(f, "SHA256"),
            Self::SHA512 => write!(f, "SHA512"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = UntisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_uppercase();

        match normalized.as_str() {
            "SHA1" => Ok(Self::SHA1),
            "SHA256" => Ok(Self::SHA256),
            "SHA512" => Ok(Self::SHA512),
            _ => Err(UntisError::InvalidHashingAlgorithm(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{HashAlgorithm, UntisError};

    #[rstest]
    #[case("sha1", HashAlgorithm::SHA1)]
    #[case("Sha256", HashAlgorithm::SHA256)]
    #[case("SHA512", HashAlgorithm::SHA512)]
    fn parses_hash_algorithm(#[case] input: &str, #[case] expected: HashAlgorithm) {
        assert_eq!(expected, input.parse::<HashAlgorithm>().unwrap());
    }

    #[test]
    fn rejects_unknown_hash_algorithm() {
        let err = "md5".parse::<HashAlgorithm>().unwrap_err();

        assert!(matches!(err, UntisError::InvalidHashingAlgorithm(ref s) if s == "md5"));
    }

    #[test]
    fn wraps_config_crate_errors() {
        let err = UntisError::Config(::config::ConfigError::Message("missing field".into()));

        assert_eq!("Configuration error: missing field", err.to_string());
    }
}
