use std::fmt::Display;

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::{base32, clock::Clock, HashAlgorithm, UntisError};

const MAX_DIGITS: u32 = 9;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct OtpCode {
    code: u32,
    digits: u32,
}

impl OtpCode {
    pub fn integer(&self) -> u32 {
        self.code
    }
}

impl Display for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:0padding$}",
            self.code,
            padding = (self.digits as usize)
        )
    }
}

#[derive(Clone, PartialEq)]
pub struct Totp {
    secret: String,
    algorithm: HashAlgorithm,
    period: u64,
    digits: u32,
}

impl std::fmt::Debug for Totp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Totp")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("period", &self.period)
            .field("digits", &self.digits)
            .finish()
    }
}

impl Totp {
    /// Creates the config for the [Time-based One-time Password Algorithm](http://en.wikipedia.org/wiki/Time-based_One-time_Password_Algorithm)
    /// (TOTP) given an RFC4648 base32 encoded secret.
    ///
    /// Obs.: This method defaults to the SHA1 hash, a 6-digit code and a period of 30 seconds,
    /// which is what the timetable server verifies against
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            algorithm: HashAlgorithm::SHA1,
            period: 30,
            digits: 6,
        }
    }

    /// Sets hashing algorithm
    pub fn with_algorithm(&mut self, algorithm: HashAlgorithm) -> &mut Self {
        self.algorithm = algorithm;

        self
    }

    /// Sets the period in seconds
    ///
    /// A period of zero is treated as one second.
    pub fn with_period(&mut self, period: u64) -> &mut Self {
        self.period = period.max(1);

        self
    }

    /// Sets the number of digits to generate
    pub fn with_digits(&mut self, digits: u32) -> Result<&mut Self, UntisError> {
        if digits == 0 || digits > MAX_DIGITS {
            return Err(UntisError::InvalidDigits(digits));
        }
        self.digits = digits;

        Ok(self)
    }

    /// Generates a code from the provided seconds since the UNIX epoch
    /// truncated to the specified number of digits
    pub fn generate(&self, seconds_since_epoch: u64) -> Result<OtpCode, UntisError> {
        let counter = seconds_since_epoch / self.period;

        let decoded = base32::decode(self.secret.as_str())?;
        let digest = calc_digest(decoded.as_slice(), self.algorithm, counter)?;

        let code = encode_digest_truncated(digest.as_ref(), self.digits)?;

        Ok(OtpCode {
            code,
            digits: self.digits,
        })
    }

    /// Generates the code for the current window of `clock`
    pub fn generate_now(&self, clock: &impl Clock) -> Result<OtpCode, UntisError> {
        self.generate(clock.unix_seconds())
    }

    /// Seconds until the code generated at `seconds_since_epoch` expires
    pub fn remaining_seconds(&self, seconds_since_epoch: u64) -> u64 {
        self.period - seconds_since_epoch % self.period
    }
}

/// Calculates the HMAC digest of the big-endian counter.
fn calc_digest(
    decoded_secret: &[u8],
    algorithm: HashAlgorithm,
    counter: u64,
) -> Result<Vec<u8>, UntisError> {
    let data = counter.to_be_bytes();

    match algorithm {
        HashAlgorithm::SHA1 => sign::<Hmac<Sha1>>(decoded_secret, &data),
        HashAlgorithm::SHA256 => sign::<Hmac<Sha256>>(decoded_secret, &data),
        HashAlgorithm::SHA512 => sign::<Hmac<Sha512>>(decoded_secret, &data),
    }
}

fn sign<M: Mac + hmac::digest::KeyInit>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, UntisError> {
    // HMAC takes keys of any length, this never fails
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|_| UntisError::InvalidDigest(Vec::new()))?;
    mac.update(data);

    Ok(mac.finalize().into_bytes().to_vec())
}

/// Encodes the HMAC digest into a truncated integer.
fn encode_digest_truncated(digest: &[u8], target_digits_count: u32) -> Result<u32, UntisError> {
    // Low nibble of the last byte, for every digest size
    let offset = match digest.last() {
        Some(x) => *x & 0xf,
        None => return Err(UntisError::InvalidDigest(Vec::from(digest))),
    } as usize;

    // Big-endian word at the offset
    let code_bytes: [u8; 4] = match digest
        .get(offset..offset + 4)
        .and_then(|bytes| bytes.try_into().ok())
    {
        Some(x) => x,
        None => return Err(UntisError::InvalidDigest(Vec::from(digest))),
    };

    let code = u32::from_be_bytes(code_bytes);
    let truncation_factor = u32::pow(10, target_digits_count);

    Ok((code & 0x7fffffff) % truncation_factor)
}
