//! The three interfaces the client consumes.

use aim_types::{
    AccountAddress, CompletionRecord, ConfirmationEvent, EvaluationEvent, RequestId, TxHash, Wei,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::GatewayError;

/// Point-in-time reads of contract state.
///
/// Reads may lag the chain head by a block, and nothing is cached: callers
/// re-invoke to observe a new value.
#[async_trait]
pub trait ReadGateway: Send + Sync {
    /// The constitution text proposals are evaluated against.
    async fn constitution(&self) -> Result<String, GatewayError>;

    /// Whether a constitution has been set on the contract.
    async fn constitution_set(&self) -> Result<bool, GatewayError>;

    /// The fee currently required by `evaluate_proposal`.
    async fn estimate_fee(&self) -> Result<Wei, GatewayError>;

    /// The evaluation record for a request.
    async fn proposal_result(&self, id: RequestId) -> Result<CompletionRecord, GatewayError>;
}

/// Acknowledgement that a write was accepted for inclusion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub tx_hash: TxHash,
}

/// State-changing calls.
#[async_trait]
pub trait WriteGateway: Send + Sync {
    /// Submit `proposal` for evaluation from `from`, attaching `value` as the fee.
    ///
    /// Resolves once the transaction is accepted into the pending pool. The
    /// assigned [`RequestId`] is *not* returned; it only appears later in a
    /// [`ConfirmationEvent`].
    async fn evaluate_proposal(
        &self,
        from: &AccountAddress,
        proposal: &str,
        value: Wei,
    ) -> Result<SubmissionReceipt, GatewayError>;
}

/// Contract event delivery.
#[async_trait]
pub trait EventFeed: Send + Sync {
    /// Live `ProposalSubmitted` events. At-least-once, unordered relative to reads.
    async fn subscribe_submissions(
        &self,
    ) -> Result<mpsc::Receiver<ConfirmationEvent>, GatewayError>;

    /// Live `ProposalEvaluated` events.
    async fn subscribe_evaluations(&self) -> Result<mpsc::Receiver<EvaluationEvent>, GatewayError>;

    /// Past `ProposalEvaluated` events from `from_block` (inclusive) to head.
    async fn evaluation_history(
        &self,
        from_block: u64,
    ) -> Result<Vec<EvaluationEvent>, GatewayError>;
}
