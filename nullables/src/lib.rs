//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the synchronizer (contract reads, contract
//! writes, the event feed) sits behind a trait in `aim-gateway`. This crate
//! provides in-memory implementations that:
//! - Return scripted values
//! - Record every call for assertions
//! - Never touch the network
//!
//! Usage: hand these to the synchronizer in place of the relay client.

pub mod feed;
pub mod read;
pub mod write;

pub use feed::NullEventFeed;
pub use read::NullReadGateway;
pub use write::{NullWriteGateway, WriteCall};
