//! Evaluation history for display.
//!
//! Every `ProposalEvaluated` event ever emitted, deduplicated by request id,
//! newest first, shown through a growing window.

pub mod config;
pub mod error;
pub mod follower;
pub mod view;

pub use config::HistoryConfig;
pub use error::HistoryError;
pub use follower::HistoryFollower;
pub use view::{truncate_for_display, HistoryEntry, HistoryView, EMPTY_HISTORY_MESSAGE};
