//! Websocket event feed.
//!
//! Connects to the relay's `/ws` endpoint, subscribes to one topic per
//! connection and forwards decoded events to an mpsc channel. The forwarder
//! task exits when the socket closes or the receiving side is dropped.

use aim_types::{ConfirmationEvent, EvaluationEvent};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::GatewayError;
use crate::relay::RelayClient;
use crate::traits::EventFeed;

/// Default buffer between the socket task and the consumer.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Contract event topics the relay publishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedTopic {
    /// `ProposalSubmitted(requestId, proposer, proposal)`.
    ProposalSubmitted,
    /// `ProposalEvaluated(requestId, proposer, proposal, result)`.
    ProposalEvaluated,
}

impl FeedTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedTopic::ProposalSubmitted => "proposal_submitted",
            FeedTopic::ProposalEvaluated => "proposal_evaluated",
        }
    }

    /// The subscribe request sent right after connecting.
    pub fn subscribe_message(&self) -> String {
        serde_json::json!({ "action": "subscribe", "topic": self.as_str() }).to_string()
    }
}

/// A frame pushed by the relay.
#[derive(Debug, Deserialize)]
struct EventFrame {
    topic: String,
    data: serde_json::Value,
}

/// Decode a text frame into an event for `topic`.
///
/// Returns `Ok(None)` for frames on other topics (acks, pings).
fn decode_frame<T: DeserializeOwned>(
    topic: FeedTopic,
    text: &str,
) -> Result<Option<T>, GatewayError> {
    let frame: EventFrame = serde_json::from_str(text)
        .map_err(|e| GatewayError::InvalidResponse(format!("bad frame: {e}")))?;
    if frame.topic != topic.as_str() {
        return Ok(None);
    }
    serde_json::from_value(frame.data)
        .map(Some)
        .map_err(|e| GatewayError::InvalidResponse(format!("bad {} payload: {e}", topic.as_str())))
}

/// [`EventFeed`] backed by the relay websocket for live events and the
/// JSON-RPC client for history.
pub struct WsEventFeed {
    ws_url: String,
    relay: RelayClient,
    channel_capacity: usize,
}

impl WsEventFeed {
    pub fn new(ws_url: impl Into<String>, relay: RelayClient) -> Self {
        Self {
            ws_url: ws_url.into(),
            relay,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Open a connection, subscribe to `topic` and spawn the forwarder.
    async fn subscribe<T>(&self, topic: FeedTopic) -> Result<mpsc::Receiver<T>, GatewayError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let (socket, _) = tokio_tungstenite::connect_async(self.ws_url.as_str())
            .await
            .map_err(|e| GatewayError::Unreachable(format!("{}: {e}", self.ws_url)))?;
        let (mut sink, mut stream) = socket.split();

        sink.send(Message::Text(topic.subscribe_message()))
            .await
            .map_err(|e| GatewayError::RequestFailed(format!("subscribe failed: {e}")))?;
        info!(topic = topic.as_str(), url = %self.ws_url, "subscribed to event feed");

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        tokio::spawn(async move {
            while let Some(msg) = stream.next().await {
                let text = match msg {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Ping(payload)) => {
                        let _ = sink.send(Message::Pong(payload)).await;
                        continue;
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!(topic = topic.as_str(), "event feed receive error: {e}");
                        break;
                    }
                };

                match decode_frame::<T>(topic, &text) {
                    Ok(Some(event)) => {
                        if tx.send(event).await.is_err() {
                            debug!(topic = topic.as_str(), "event feed consumer dropped");
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(topic = topic.as_str(), "skipping frame: {e}"),
                }
            }
            let _ = sink.close().await;
            debug!(topic = topic.as_str(), "event feed closed");
        });

        Ok(rx)
    }
}

#[async_trait]
impl EventFeed for WsEventFeed {
    async fn subscribe_submissions(
        &self,
    ) -> Result<mpsc::Receiver<ConfirmationEvent>, GatewayError> {
        self.subscribe(FeedTopic::ProposalSubmitted).await
    }

    async fn subscribe_evaluations(&self) -> Result<mpsc::Receiver<EvaluationEvent>, GatewayError> {
        self.subscribe(FeedTopic::ProposalEvaluated).await
    }

    async fn evaluation_history(
        &self,
        from_block: u64,
    ) -> Result<Vec<EvaluationEvent>, GatewayError> {
        self.relay.evaluation_history(from_block).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aim_types::RequestId;

    #[test]
    fn subscribe_message_names_topic() {
        let msg: serde_json::Value =
            serde_json::from_str(&FeedTopic::ProposalSubmitted.subscribe_message()).unwrap();
        assert_eq!(msg["action"], "subscribe");
        assert_eq!(msg["topic"], "proposal_submitted");
    }

    #[test]
    fn decode_matching_frame() {
        let text = r#"{
            "topic": "proposal_submitted",
            "data": {
                "request_id": 7,
                "proposer": "0x0a0f4321214bb6c7811dd8a71cf587bdaf03f0a0",
                "proposal": "Increase treasury allocation"
            }
        }"#;
        let event: ConfirmationEvent = decode_frame(FeedTopic::ProposalSubmitted, text)
            .unwrap()
            .unwrap();
        assert_eq!(event.request_id, RequestId::new(7));
    }

    #[test]
    fn decode_skips_other_topics() {
        let text = r#"{"topic": "ack", "data": {}}"#;
        let event: Option<ConfirmationEvent> =
            decode_frame(FeedTopic::ProposalSubmitted, text).unwrap();
        assert!(event.is_none());
    }

    #[test]
    fn decode_rejects_malformed_payload() {
        let text = r#"{"topic": "proposal_evaluated", "data": {"request_id": "x"}}"#;
        let result: Result<Option<EvaluationEvent>, _> =
            decode_frame(FeedTopic::ProposalEvaluated, text);
        assert!(matches!(result, Err(GatewayError::InvalidResponse(_))));
    }
}
