//! Submission sessions and their lifecycle phases.

use aim_gateway::SubmissionReceipt;
use aim_types::{AccountAddress, CompletionRecord, Decision, RequestId, TxHash, Wei};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SyncError;

/// Identifies one submission. Strictly increasing per synchronizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle phase of a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// No submission in flight.
    Idle,
    /// Write issued, waiting for acceptance.
    Submitting,
    /// Write accepted; waiting for the matching `ProposalSubmitted` event.
    /// No timeout: a dropped event leaves the session here.
    AwaitingIdentifier,
    /// Request id bound; reading the result at a fixed interval.
    Polling,
    /// Evaluation finished. Terminal.
    Completed,
    /// Write rejected, or the bound result turned out inconsistent. Terminal.
    Errored,
    /// Poll attempt limit reached without completion. Terminal.
    Abandoned,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Submitting => "submitting",
            Phase::AwaitingIdentifier => "awaiting identifier",
            Phase::Polling => "polling",
            Phase::Completed => "completed",
            Phase::Errored => "errored",
            Phase::Abandoned => "abandoned",
        }
    }

    /// No further transitions happen from a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Errored | Phase::Abandoned)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submission and everything learned about it so far.
///
/// Owned by the synchronizer; everyone else sees cloned snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub account: AccountAddress,
    pub proposal: String,
    /// Fee attached to the write, taken from the estimate at submit time.
    pub fee: Wei,
    pub phase: Phase,
    pub tx_hash: Option<TxHash>,
    pub request_id: Option<RequestId>,
    /// Latest read result; overwritten on every read.
    pub record: Option<CompletionRecord>,
    /// Timer-driven reads performed so far.
    pub poll_attempts: u32,
    pub error: Option<String>,
}

impl Session {
    /// A session whose write has just been issued.
    pub(crate) fn submitting(id: SessionId, account: AccountAddress, proposal: String, fee: Wei) -> Self {
        Self {
            id,
            account,
            proposal,
            fee,
            phase: Phase::Submitting,
            tx_hash: None,
            request_id: None,
            record: None,
            poll_attempts: 0,
            error: None,
        }
    }

    /// Whether the presentation layer should show a spinner and disable input.
    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Decision badge, once completed.
    pub fn decision(&self) -> Option<Decision> {
        self.record.as_ref().and_then(CompletionRecord::decision)
    }

    fn expect_phase(&self, expected: Phase, action: &'static str) -> Result<(), SyncError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SyncError::InvalidTransition {
                from: self.phase,
                action,
            })
        }
    }

    /// `Submitting → AwaitingIdentifier`.
    pub(crate) fn accept(&mut self, receipt: SubmissionReceipt) -> Result<(), SyncError> {
        self.expect_phase(Phase::Submitting, "accept submission")?;
        self.tx_hash = Some(receipt.tx_hash);
        self.phase = Phase::AwaitingIdentifier;
        Ok(())
    }

    /// `Submitting | Polling → Errored`.
    pub(crate) fn fail(&mut self, reason: impl Into<String>) -> Result<(), SyncError> {
        match self.phase {
            Phase::Submitting | Phase::Polling => {
                self.error = Some(reason.into());
                self.phase = Phase::Errored;
                Ok(())
            }
            from => Err(SyncError::InvalidTransition {
                from,
                action: "fail",
            }),
        }
    }

    /// `AwaitingIdentifier → Polling`. A session binds at most one id.
    pub(crate) fn bind(&mut self, request_id: RequestId) -> Result<(), SyncError> {
        self.expect_phase(Phase::AwaitingIdentifier, "bind request id")?;
        if self.request_id.is_some() {
            return Err(SyncError::InvalidTransition {
                from: self.phase,
                action: "rebind request id",
            });
        }
        self.request_id = Some(request_id);
        self.phase = Phase::Polling;
        Ok(())
    }

    /// Overwrite the cached record; `Polling → Completed` once it reports
    /// completion. Returns whether the session is now complete.
    pub(crate) fn apply_record(&mut self, record: CompletionRecord) -> Result<bool, SyncError> {
        self.expect_phase(Phase::Polling, "apply read result")?;
        let completed = record.completed;
        self.record = Some(record);
        if completed {
            self.phase = Phase::Completed;
        }
        Ok(completed)
    }

    /// `Polling → Abandoned`.
    pub(crate) fn abandon(&mut self) -> Result<(), SyncError> {
        self.expect_phase(Phase::Polling, "abandon")?;
        self.phase = Phase::Abandoned;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::submitting(
            SessionId::new(1),
            AccountAddress::from_bytes([0xA1; 20]),
            "Increase treasury allocation".into(),
            Wei::new(1000),
        )
    }

    fn receipt() -> SubmissionReceipt {
        SubmissionReceipt {
            tx_hash: TxHash::new("0xabc"),
        }
    }

    fn record(completed: bool) -> CompletionRecord {
        CompletionRecord {
            request_id: RequestId::new(7),
            proposal: "Increase treasury allocation".into(),
            result: if completed { "Approved".into() } else { String::new() },
            completed,
        }
    }

    #[test]
    fn happy_path_ordering() {
        let mut s = session();
        assert!(s.is_busy());
        s.accept(receipt()).unwrap();
        assert_eq!(s.phase, Phase::AwaitingIdentifier);
        assert!(!s.is_busy());
        s.bind(RequestId::new(7)).unwrap();
        assert_eq!(s.phase, Phase::Polling);
        assert!(!s.apply_record(record(false)).unwrap());
        assert_eq!(s.phase, Phase::Polling);
        assert!(s.apply_record(record(true)).unwrap());
        assert_eq!(s.phase, Phase::Completed);
        assert_eq!(s.decision(), Some(Decision::Approved));
    }

    #[test]
    fn cannot_bind_before_acceptance() {
        let mut s = session();
        let err = s.bind(RequestId::new(7)).unwrap_err();
        assert!(matches!(
            err,
            SyncError::InvalidTransition { from: Phase::Submitting, .. }
        ));
        assert!(s.request_id.is_none());
    }

    #[test]
    fn binds_at_most_once() {
        let mut s = session();
        s.accept(receipt()).unwrap();
        s.bind(RequestId::new(7)).unwrap();
        assert!(s.bind(RequestId::new(8)).is_err());
        assert_eq!(s.request_id, Some(RequestId::new(7)));
    }

    #[test]
    fn completed_is_terminal() {
        let mut s = session();
        s.accept(receipt()).unwrap();
        s.bind(RequestId::new(7)).unwrap();
        s.apply_record(record(true)).unwrap();
        assert!(s.phase.is_terminal());
        assert!(s.apply_record(record(false)).is_err());
        assert!(s.fail("late").is_err());
        assert!(s.abandon().is_err());
        assert_eq!(s.phase, Phase::Completed);
    }

    #[test]
    fn rejection_from_submitting() {
        let mut s = session();
        s.fail("user denied transaction").unwrap();
        assert_eq!(s.phase, Phase::Errored);
        assert_eq!(s.error.as_deref(), Some("user denied transaction"));
    }

    #[test]
    fn awaiting_identifier_cannot_fail_or_abandon() {
        let mut s = session();
        s.accept(receipt()).unwrap();
        assert!(s.fail("x").is_err());
        assert!(s.abandon().is_err());
        assert_eq!(s.phase, Phase::AwaitingIdentifier);
    }

    #[test]
    fn identical_reads_keep_phase() {
        let mut s = session();
        s.accept(receipt()).unwrap();
        s.bind(RequestId::new(7)).unwrap();
        for _ in 0..3 {
            s.apply_record(record(false)).unwrap();
            assert_eq!(s.phase, Phase::Polling);
            assert_eq!(s.record, Some(record(false)));
        }
    }
}
