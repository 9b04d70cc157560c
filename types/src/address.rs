//! Account address type with `0x` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// An externally owned account address: `0x` followed by 20 hex-encoded bytes.
///
/// Stored in lowercase so that a checksummed spelling and a lowercase spelling
/// of the same account compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    /// The standard prefix for all account addresses.
    pub const PREFIX: &'static str = "0x";

    /// Number of raw bytes in an address.
    pub const BYTE_LEN: usize = 20;

    /// Parse and normalise an address string.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let body = raw
            .strip_prefix(Self::PREFIX)
            .or_else(|| raw.strip_prefix("0X"))
            .ok_or_else(|| TypesError::InvalidAddress(format!("missing 0x prefix: {raw}")))?;

        let bytes = hex::decode(body)
            .map_err(|e| TypesError::InvalidAddress(format!("{raw}: {e}")))?;
        if bytes.len() != Self::BYTE_LEN {
            return Err(TypesError::InvalidAddress(format!(
                "{raw}: expected {} bytes, got {}",
                Self::BYTE_LEN,
                bytes.len()
            )));
        }

        Ok(Self(format!("{}{}", Self::PREFIX, hex::encode(bytes))))
    }

    /// Build an address from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(format!("{}{}", Self::PREFIX, hex::encode(bytes)))
    }

    /// Return the normalised address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display, e.g. `0x0a0f…f0a0`.
    pub fn short(&self) -> String {
        format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<AccountAddress> for String {
    fn from(address: AccountAddress) -> Self {
        address.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0x0A0f4321214BB6C7811dD8a71cF587bdaF03f0A0";

    #[test]
    fn parse_normalises_case() {
        let a = AccountAddress::parse(CHECKSUMMED).unwrap();
        let b = AccountAddress::parse(&CHECKSUMMED.to_lowercase()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0x0a0f4321214bb6c7811dd8a71cf587bdaf03f0a0");
    }

    #[test]
    fn parse_rejects_missing_prefix() {
        let err = AccountAddress::parse("0a0f4321214bb6c7811dd8a71cf587bdaf03f0a0").unwrap_err();
        assert!(matches!(err, TypesError::InvalidAddress(_)));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(AccountAddress::parse("0x1234").is_err());
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert!(AccountAddress::parse("0xzz0f4321214bb6c7811dd8a71cf587bdaf03f0a0").is_err());
    }

    #[test]
    fn short_form() {
        let a = AccountAddress::parse(CHECKSUMMED).unwrap();
        assert_eq!(a.short(), "0x0a0f…f0a0");
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<AccountAddress, _> = serde_json::from_str(&format!("\"{CHECKSUMMED}\""));
        assert!(ok.is_ok());
        let bad: Result<AccountAddress, _> = serde_json::from_str("\"0xnothex\"");
        assert!(bad.is_err());
    }
}
