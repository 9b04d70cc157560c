//! Gateways to the evaluator contract.
//!
//! The client never talks to the chain directly. Everything goes through three
//! narrow interfaces:
//! - [`ReadGateway`]: point-in-time reads (constitution, fee, result by id)
//! - [`WriteGateway`]: submit a proposal; resolves on acceptance, not completion
//! - [`EventFeed`]: live event subscriptions and historical range queries
//!
//! [`RelayClient`] and [`WsEventFeed`] implement them against a relay node that
//! exposes the contract over JSON-RPC and a websocket.

pub mod error;
pub mod relay;
pub mod traits;
pub mod ws;

pub use error::GatewayError;
pub use relay::RelayClient;
pub use traits::{EventFeed, ReadGateway, SubmissionReceipt, WriteGateway};
pub use ws::{FeedTopic, WsEventFeed};
