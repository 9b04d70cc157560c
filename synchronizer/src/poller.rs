//! Fixed-interval polling of a request's evaluation result.
//!
//! A [`PollTimer`] is a tokio task that reads the result on start and then
//! once per interval, sending each outcome back to the synchronizer. The task
//! stops on its own after a completed read or after the attempt limit, and is
//! aborted when the timer is cancelled or dropped.

use aim_gateway::{GatewayError, ReadGateway};
use aim_types::{CompletionRecord, RequestId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use crate::session::SessionId;

/// Result of one timer-driven read.
#[derive(Debug)]
pub struct PollOutcome {
    pub session: SessionId,
    /// Generation of the timer that produced this outcome.
    pub generation: u64,
    pub request_id: RequestId,
    /// 1-based attempt counter.
    pub attempt: u32,
    pub result: Result<CompletionRecord, GatewayError>,
}

/// Handle to a running poll task. At most one exists per synchronizer.
pub struct PollTimer {
    session: SessionId,
    generation: u64,
    handle: JoinHandle<()>,
}

impl PollTimer {
    /// Spawn the poll task. The first read happens immediately.
    pub fn start(
        session: SessionId,
        generation: u64,
        request_id: RequestId,
        read: Arc<dyn ReadGateway>,
        interval: Duration,
        max_attempts: Option<u32>,
        outcome_tx: mpsc::Sender<PollOutcome>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut attempt = 0u32;

            loop {
                ticker.tick().await;
                attempt += 1;
                trace!(%session, %request_id, attempt, "polling result");

                let result = read.proposal_result(request_id).await;
                let completed = matches!(&result, Ok(record) if record.completed);

                let outcome = PollOutcome {
                    session,
                    generation,
                    request_id,
                    attempt,
                    result,
                };
                if outcome_tx.send(outcome).await.is_err() {
                    break;
                }
                if completed || max_attempts.is_some_and(|max| attempt >= max) {
                    break;
                }
            }
            debug!(%session, %request_id, attempt, "poll task finished");
        });

        debug!(%session, %request_id, ?interval, generation, "poll timer started");
        Self {
            session,
            generation,
            handle,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the task has exited (completed, limit reached, or aborted).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the task. No read starts after this returns.
    pub fn cancel(self) {
        // Drop aborts.
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.handle.abort();
        debug!(session = %self.session, generation = self.generation, "poll timer cancelled");
    }
}
