//! Nullable event feed. Events are injected by the test.

use aim_gateway::{EventFeed, GatewayError};
use aim_types::{ConfirmationEvent, EvaluationEvent};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 64;

/// An [`EventFeed`] whose live events and history are supplied by the test.
///
/// Every subscriber gets its own channel; `emit_*` fans out to all of them.
pub struct NullEventFeed {
    submission_subscribers: Mutex<Vec<mpsc::Sender<ConfirmationEvent>>>,
    evaluation_subscribers: Mutex<Vec<mpsc::Sender<EvaluationEvent>>>,
    history: Mutex<Vec<EvaluationEvent>>,
    history_queries: Mutex<Vec<u64>>,
}

impl NullEventFeed {
    pub fn new() -> Self {
        Self {
            submission_subscribers: Mutex::new(Vec::new()),
            evaluation_subscribers: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
            history_queries: Mutex::new(Vec::new()),
        }
    }

    /// Deliver a `ProposalSubmitted` event to every live subscriber.
    pub fn emit_submission(&self, event: ConfirmationEvent) {
        self.submission_subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.try_send(event.clone()).is_ok());
    }

    /// Deliver a `ProposalEvaluated` event to every live subscriber and
    /// append it to the queryable history.
    pub fn emit_evaluation(&self, event: EvaluationEvent) {
        self.history.lock().unwrap().push(event.clone());
        self.evaluation_subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.try_send(event.clone()).is_ok());
    }

    /// Add past events without notifying live subscribers.
    pub fn seed_history(&self, events: impl IntoIterator<Item = EvaluationEvent>) {
        self.history.lock().unwrap().extend(events);
    }

    /// `from_block` of every history query, in order.
    pub fn history_queries(&self) -> Vec<u64> {
        self.history_queries.lock().unwrap().clone()
    }

    pub fn submission_subscriber_count(&self) -> usize {
        self.submission_subscribers.lock().unwrap().len()
    }
}

impl Default for NullEventFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventFeed for NullEventFeed {
    async fn subscribe_submissions(
        &self,
    ) -> Result<mpsc::Receiver<ConfirmationEvent>, GatewayError> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        self.submission_subscribers.lock().unwrap().push(tx);
        Ok(rx)
    }

    async fn subscribe_evaluations(&self) -> Result<mpsc::Receiver<EvaluationEvent>, GatewayError> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        self.evaluation_subscribers.lock().unwrap().push(tx);
        Ok(rx)
    }

    async fn evaluation_history(
        &self,
        from_block: u64,
    ) -> Result<Vec<EvaluationEvent>, GatewayError> {
        self.history_queries.lock().unwrap().push(from_block);
        Ok(self
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.position.block_number >= from_block)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aim_types::{AccountAddress, EventPosition, RequestId};

    fn evaluation(id: u64, block: u64) -> EvaluationEvent {
        EvaluationEvent {
            request_id: RequestId::new(id),
            proposer: AccountAddress::from_bytes([1; 20]),
            proposal: format!("proposal {id}"),
            result: "Approved".into(),
            position: EventPosition::new(block, 0),
        }
    }

    #[tokio::test]
    async fn emit_reaches_every_subscriber() {
        let feed = NullEventFeed::new();
        let mut a = feed.subscribe_submissions().await.unwrap();
        let mut b = feed.subscribe_submissions().await.unwrap();
        let event = ConfirmationEvent {
            request_id: RequestId::new(1),
            proposer: AccountAddress::from_bytes([1; 20]),
            proposal: "p".into(),
        };
        feed.emit_submission(event.clone());
        assert_eq!(a.recv().await.unwrap(), event);
        assert_eq!(b.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn dropped_subscribers_are_pruned() {
        let feed = NullEventFeed::new();
        let rx = feed.subscribe_submissions().await.unwrap();
        drop(rx);
        feed.emit_submission(ConfirmationEvent {
            request_id: RequestId::new(1),
            proposer: AccountAddress::from_bytes([1; 20]),
            proposal: "p".into(),
        });
        assert_eq!(feed.submission_subscriber_count(), 0);
    }

    #[tokio::test]
    async fn history_filters_by_block() {
        let feed = NullEventFeed::new();
        feed.seed_history([evaluation(1, 10), evaluation(2, 20)]);
        let events = feed.evaluation_history(15).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].request_id, RequestId::new(2));
        assert_eq!(feed.history_queries(), vec![15]);
    }
}
