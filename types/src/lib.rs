//! Fundamental types for the AIM evaluator client.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account addresses, request identifiers, fee amounts, transaction hashes, and
//! the contract's events and read results.

pub mod address;
pub mod amount;
pub mod error;
pub mod event;
pub mod hash;
pub mod record;

pub use address::AccountAddress;
pub use amount::Wei;
pub use error::TypesError;
pub use event::{ConfirmationEvent, EvaluationEvent, EventPosition};
pub use hash::TxHash;
pub use record::{CompletionRecord, Decision, RequestId};
