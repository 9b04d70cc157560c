//! Keeps a [`HistoryView`] current from the event feed.

use aim_gateway::EventFeed;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, RwLock};
use tracing::{debug, info, warn};

use crate::config::HistoryConfig;
use crate::error::HistoryError;
use crate::view::HistoryView;

/// Loads the full evaluation history and then merges live events into a
/// shared view.
///
/// Subscribers to [`HistoryFollower::subscribe`] see the number of distinct
/// evaluations after every change.
pub struct HistoryFollower {
    feed: Arc<dyn EventFeed>,
    view: Arc<RwLock<HistoryView>>,
    updates: watch::Sender<usize>,
}

impl HistoryFollower {
    pub fn new(feed: Arc<dyn EventFeed>, config: HistoryConfig) -> Self {
        let (updates, _) = watch::channel(0);
        Self {
            feed,
            view: Arc::new(RwLock::new(HistoryView::new(config))),
            updates,
        }
    }

    pub fn view(&self) -> Arc<RwLock<HistoryView>> {
        Arc::clone(&self.view)
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.updates.subscribe()
    }

    /// Query every evaluation from block 0 and merge it in.
    pub async fn load(&self) -> Result<usize, HistoryError> {
        let events = self.feed.evaluation_history(0).await?;
        let fetched = events.len();
        let added = self.view.write().await.ingest(events);
        debug!(fetched, added, "evaluation history loaded");
        self.publish().await;
        Ok(added)
    }

    /// Follow live evaluations until shutdown or until the feed closes.
    ///
    /// Subscribes before loading so nothing emitted during the history query
    /// is missed; overlap is removed by request id.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), HistoryError> {
        let mut live = self.feed.subscribe_evaluations().await?;
        self.load().await?;

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    debug!("history follower shutting down");
                    break;
                }
                event = live.recv() => match event {
                    Some(event) => {
                        let request_id = event.request_id;
                        if self.view.write().await.ingest([event]) > 0 {
                            info!(%request_id, "new evaluation");
                            self.publish().await;
                        }
                    }
                    None => {
                        warn!("evaluation feed closed");
                        break;
                    }
                },
            }
        }
        Ok(())
    }

    async fn publish(&self) {
        let len = self.view.read().await.len();
        self.updates.send_replace(len);
    }
}
