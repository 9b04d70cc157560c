use aim_gateway::GatewayError;
use thiserror::Error;

use crate::session::Phase;

/// Why `submit_proposal` did not produce an accepted submission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("proposal text is empty")]
    EmptyProposal,

    #[error("no connected account")]
    NoAccount,

    #[error("constitution must be set before submitting proposals")]
    ConstitutionNotSet,

    #[error("precondition check failed: {0}")]
    PreconditionRead(GatewayError),

    #[error("submission rejected: {0}")]
    Rejected(GatewayError),

    #[error("synchronizer stopped")]
    Stopped,
}

impl SubmitError {
    /// Precondition failures are caught before any session exists.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SubmitError::EmptyProposal
                | SubmitError::NoAccount
                | SubmitError::ConstitutionNotSet
                | SubmitError::PreconditionRead(_)
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("no active session")]
    NoSession,

    #[error("session has no bound request id")]
    NoBoundRequest,

    #[error("cannot {action} while {from}")]
    InvalidTransition { from: Phase, action: &'static str },

    #[error("read failed: {0}")]
    Read(#[from] GatewayError),

    #[error("config error: {0}")]
    Config(String),

    #[error("synchronizer stopped")]
    Stopped,
}
