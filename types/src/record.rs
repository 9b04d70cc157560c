//! Request identifiers and the evaluation outcome read back from the contract.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Identifier the contract assigns to an accepted proposal submission.
///
/// Used as the key for polling the evaluation result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| TypesError::InvalidRequestId(format!("{s}: {e}")))
    }
}

/// Result of reading a proposal's evaluation by identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub request_id: RequestId,
    /// The proposal text as stored by the contract.
    pub proposal: String,
    /// The evaluator's verdict; empty until `completed` is set.
    pub result: String,
    pub completed: bool,
}

impl CompletionRecord {
    /// The decision badge for this record, once the evaluation is complete.
    pub fn decision(&self) -> Option<Decision> {
        self.completed.then(|| Decision::from_result(&self.result))
    }
}

/// Coarse reading of an evaluator verdict, used for badge styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// `Approved` iff the verdict mentions "approved", ignoring case.
    pub fn from_result(result: &str) -> Self {
        if result.to_lowercase().contains("approved") {
            Decision::Approved
        } else {
            Decision::Rejected
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(result: &str, completed: bool) -> CompletionRecord {
        CompletionRecord {
            request_id: RequestId::new(7),
            proposal: "Increase treasury allocation".into(),
            result: result.into(),
            completed,
        }
    }

    #[test]
    fn decision_matches_case_insensitively() {
        assert_eq!(Decision::from_result("Approved"), Decision::Approved);
        assert_eq!(Decision::from_result("NOT APPROVED"), Decision::Approved);
        assert_eq!(Decision::from_result("Denied: violates article 2"), Decision::Rejected);
        assert_eq!(Decision::from_result(""), Decision::Rejected);
    }

    #[test]
    fn pending_record_has_no_decision() {
        assert_eq!(record("", false).decision(), None);
        assert_eq!(record("Approved", true).decision(), Some(Decision::Approved));
    }

    #[test]
    fn request_id_parses() {
        assert_eq!("42".parse::<RequestId>().unwrap(), RequestId::new(42));
        assert!("x".parse::<RequestId>().is_err());
    }
}
