//! Time-based one-time codes (RFC 6238).
//!
//! Codes are six digits, HMAC-SHA1, 30 second steps, derived from a base32
//! shared secret. Verification accepts any code from `window` steps before
//! to `window` steps after the supplied instant, so a window of 2 tolerates
//! roughly a minute of clock skew either way.

use chrono::{DateTime, TimeDelta, Utc};
use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use thiserror::Error;

/// Length of one time step.
pub const TIME_STEP_SECS: i64 = 30;

/// Digits in a generated code.
pub const CODE_DIGITS: u32 = 6;

/// Steps of tolerance on either side of now when none is configured.
pub const DEFAULT_WINDOW: u32 = 2;

/// Widest window `verify` will search; larger values are clamped.
pub const MAX_WINDOW: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtpError {
    #[error("OTP secret is empty")]
    EmptySecret,
    #[error("OTP secret is not valid base32: {0}")]
    InvalidBase32(String),
    #[error("OTP key rejected by HMAC")]
    InvalidKey,
}

/// Decoded shared secret.
#[derive(Clone, PartialEq, Eq)]
pub struct TotpSecret(Vec<u8>);

impl std::fmt::Debug for TotpSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TotpSecret(..)")
    }
}

impl TotpSecret {
    /// Parse a base32 secret. Case, whitespace and `=` padding are ignored.
    pub fn parse(encoded: &str) -> Result<Self, OtpError> {
        let cleaned: String = encoded
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '=')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if cleaned.is_empty() {
            return Err(OtpError::EmptySecret);
        }
        let bytes = BASE32_NOPAD
            .decode(cleaned.as_bytes())
            .map_err(|e| OtpError::InvalidBase32(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The code valid during the step containing `at`.
    ///
    /// Instants before the Unix epoch have no step and yield `None`.
    pub fn code_at(&self, at: DateTime<Utc>) -> Result<Option<String>, OtpError> {
        let step = at.timestamp().div_euclid(TIME_STEP_SECS);
        if step < 0 {
            return Ok(None);
        }
        let code = hotp(&self.0, step as u64)?;
        Ok(Some(format!("{:0width$}", code, width = CODE_DIGITS as usize)))
    }
}

/// Check `candidate` against the `2 * window + 1` steps centred on `now`.
///
/// `window` is clamped to [`MAX_WINDOW`].
pub fn verify(secret: &TotpSecret, candidate: &str, window: u32, now: DateTime<Utc>) -> bool {
    let window = i64::from(window.min(MAX_WINDOW));
    (-window..=window).any(|offset| {
        let Some(at) = now.checked_add_signed(TimeDelta::seconds(offset * TIME_STEP_SECS)) else {
            return false;
        };
        matches!(secret.code_at(at), Ok(Some(code)) if code == candidate)
    })
}

fn hotp(key: &[u8], counter: u64) -> Result<u32, OtpError> {
    let mut mac = Hmac::<Sha1>::new_from_slice(key).map_err(|_| OtpError::InvalidKey)?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    // Dynamic truncation
    let offset = usize::from(digest[digest.len() - 1] & 0x0f);
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    Ok(binary % 10u32.pow(CODE_DIGITS))
}
