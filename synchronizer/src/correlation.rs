//! Correlation of confirmation events with pending submissions.
//!
//! A write does not return the request id it is assigned. The id arrives in a
//! `ProposalSubmitted` event on a feed shared with every other user, so events
//! are joined to submissions on `(proposer account, proposal text)`. Both must
//! match exactly; text that differs only in truncation or encoding does not
//! match.

use aim_types::{AccountAddress, ConfirmationEvent};
use std::collections::{HashMap, VecDeque};

use crate::session::SessionId;

/// Join key between a submission and its confirmation event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CorrelationKey {
    pub account: AccountAddress,
    pub proposal: String,
}

impl CorrelationKey {
    pub fn new(account: AccountAddress, proposal: impl Into<String>) -> Self {
        Self {
            account,
            proposal: proposal.into(),
        }
    }

    pub fn of_event(event: &ConfirmationEvent) -> Self {
        Self::new(event.proposer.clone(), event.proposal.clone())
    }
}

/// Submissions accepted by the write gateway whose id is not yet known.
///
/// Identical submissions from one account are matched in submission order.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    pending: HashMap<CorrelationKey, VecDeque<SessionId>>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an accepted submission as waiting for its event.
    pub fn register(&mut self, key: CorrelationKey, session: SessionId) {
        self.pending.entry(key).or_default().push_back(session);
    }

    /// Consume the oldest pending session matching `event`, if any.
    ///
    /// Non-matching events leave the table untouched.
    pub fn take_match(&mut self, event: &ConfirmationEvent) -> Option<SessionId> {
        let key = CorrelationKey::of_event(event);
        let queue = self.pending.get_mut(&key)?;
        let session = queue.pop_front();
        if queue.is_empty() {
            self.pending.remove(&key);
        }
        session
    }

    /// Forget a session, e.g. because it was superseded.
    pub fn remove_session(&mut self, session: SessionId) {
        self.pending.retain(|_, queue| {
            queue.retain(|s| *s != session);
            !queue.is_empty()
        });
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn contains_session(&self, session: SessionId) -> bool {
        self.pending.values().any(|q| q.contains(&session))
    }

    /// Number of sessions waiting for an event.
    pub fn len(&self) -> usize {
        self.pending.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
