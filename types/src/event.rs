//! Contract events consumed by the client.

use serde::{Deserialize, Serialize};

use crate::address::AccountAddress;
use crate::record::RequestId;

/// Emitted once per accepted submission (`ProposalSubmitted`).
///
/// The only place the assigned [`RequestId`] is ever revealed to the submitter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationEvent {
    pub request_id: RequestId,
    pub proposer: AccountAddress,
    pub proposal: String,
}

/// Where an event sits in the chain; orders the evaluation history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventPosition {
    pub block_number: u64,
    pub log_index: u64,
}

impl EventPosition {
    pub fn new(block_number: u64, log_index: u64) -> Self {
        Self {
            block_number,
            log_index,
        }
    }
}

/// Emitted when the evaluator delivers a verdict (`ProposalEvaluated`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationEvent {
    pub request_id: RequestId,
    pub proposer: AccountAddress,
    pub proposal: String,
    pub result: String,
    #[serde(default)]
    pub position: EventPosition,
}
