//! Fee amount type.
//!
//! Amounts are represented as integers (u128) of the chain's smallest unit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// An amount of wei attached to a write request.
///
/// Serialised as a decimal string, since JSON numbers cannot carry the full
/// u128 range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Wei(u128);

impl Wei {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

impl FromStr for Wei {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u128>()
            .map(Self)
            .map_err(|e| TypesError::InvalidAmount(format!("{s}: {e}")))
    }
}

impl TryFrom<String> for Wei {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Wei> for String {
    fn from(w: Wei) -> Self {
        w.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_appends_unit() {
        assert_eq!(Wei::new(1000).to_string(), "1000 wei");
    }

    #[test]
    fn serializes_as_decimal_string() {
        let json = serde_json::to_string(&Wei::new(u128::MAX)).unwrap();
        assert_eq!(json, format!("\"{}\"", u128::MAX));
        let back: Wei = serde_json::from_str(&json).unwrap();
        assert_eq!(back.raw(), u128::MAX);
    }

    #[test]
    fn rejects_negative() {
        assert!("-1".parse::<Wei>().is_err());
    }
}
