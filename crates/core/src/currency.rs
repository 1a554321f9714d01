//! CurrencyCode - validated currency/asset codes
//!
//! Codes are trimmed and uppercased on parse so that denylist lookups
//! ("BTC", "XMR") do not depend on caller casing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum code length accepted (fits a 10-char currency column)
pub const MAX_CODE_LEN: usize = 10;

/// Errors that can occur when parsing currency codes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("Empty currency code")]
    EmptyCode,

    #[error("Currency code too long (max {MAX_CODE_LEN} chars): {0}")]
    TooLong(String),

    #[error("Invalid currency code format: {0}")]
    InvalidFormat(String),
}

/// A short uppercase alphanumeric currency code (e.g. "USD", "BTC").
///
/// ```
/// use amlwatch_core::CurrencyCode;
///
/// let xmr: CurrencyCode = " xmr ".parse().unwrap();
/// assert_eq!(xmr.as_str(), "XMR");
/// assert!("".parse::<CurrencyCode>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();

        if s.is_empty() {
            return Err(CurrencyError::EmptyCode);
        }

        if s.len() > MAX_CODE_LEN {
            return Err(CurrencyError::TooLong(s));
        }

        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CurrencyError::InvalidFormat(s));
        }

        Ok(Self(s))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(c: CurrencyCode) -> Self {
        c.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uppercases() {
        assert_eq!("btc".parse::<CurrencyCode>().unwrap().as_str(), "BTC");
        assert_eq!("USD".parse::<CurrencyCode>().unwrap().to_string(), "USD");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("  ".parse::<CurrencyCode>(), Err(CurrencyError::EmptyCode));
        assert!(matches!(
            "VERYLONGTOKEN".parse::<CurrencyCode>(),
            Err(CurrencyError::TooLong(_))
        ));
        assert!(matches!(
            "US-D".parse::<CurrencyCode>(),
            Err(CurrencyError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_serde_validates() {
        let code: CurrencyCode = serde_json::from_str("\"xmr\"").unwrap();
        assert_eq!(code.as_str(), "XMR");
        assert!(serde_json::from_str::<CurrencyCode>("\"\"").is_err());
    }
}
