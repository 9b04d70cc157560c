//! Proposal lifecycle synchronizer.
//!
//! Submitting a proposal does not return the identifier the contract assigns
//! to it. The identifier only shows up later in a `ProposalSubmitted` event on
//! a feed shared by every user. The synchronizer:
//!
//! 1. checks preconditions and submits through the [`WriteGateway`]
//! 2. correlates confirmation events with the pending submission by
//!    `(account, proposal text)` ([`CorrelationTable`])
//! 3. polls the [`ReadGateway`] at a fixed interval until the evaluation
//!    completes ([`PollTimer`])
//! 4. publishes every phase change as a [`Session`] snapshot
//!
//! Lifecycle: `Idle → Submitting → AwaitingIdentifier → Polling → Completed`,
//! with `Errored` reachable from `Submitting` and `Polling`, and `Abandoned`
//! from `Polling` when a poll attempt limit is configured.
//!
//! [`WriteGateway`]: aim_gateway::WriteGateway
//! [`ReadGateway`]: aim_gateway::ReadGateway

pub mod config;
pub mod context;
pub mod correlation;
pub mod error;
pub mod poller;
pub mod runner;
pub mod session;
pub mod synchronizer;

pub use config::SyncConfig;
pub use context::AccountContext;
pub use correlation::{CorrelationKey, CorrelationTable};
pub use error::{SubmitError, SyncError};
pub use poller::{PollOutcome, PollTimer};
pub use runner::{Command, SyncHandle};
pub use session::{Phase, Session, SessionId};
pub use synchronizer::Synchronizer;
