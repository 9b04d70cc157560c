//! Windowed, deduplicated view over evaluation events.

use aim_types::{AccountAddress, Decision, EvaluationEvent, RequestId};
use std::collections::HashSet;

use crate::config::HistoryConfig;

/// Shown when no evaluation has ever been emitted.
pub const EMPTY_HISTORY_MESSAGE: &str = "No proposal evaluations yet";

/// Cut `text` to at most `max_chars` characters, appending `...` when
/// anything was removed. Counts characters, not bytes.
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// One evaluation as presented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub request_id: RequestId,
    pub proposer: AccountAddress,
    /// Possibly truncated proposal text.
    pub proposal: String,
    pub result: String,
    pub decision: Decision,
}

/// All evaluations seen so far, newest first.
///
/// Ordering is by chain position (block, then log index); ties on position
/// are broken by request id.
#[derive(Debug)]
pub struct HistoryView {
    config: HistoryConfig,
    events: Vec<EvaluationEvent>,
    seen: HashSet<RequestId>,
    window: usize,
}

impl HistoryView {
    pub fn new(config: HistoryConfig) -> Self {
        let window = config.initial_window;
        Self {
            config,
            events: Vec::new(),
            seen: HashSet::new(),
            window,
        }
    }

    /// Merge events into the view. Returns how many were new.
    ///
    /// An event whose request id is already present is dropped, whichever
    /// source (history query or live feed) delivered it first.
    pub fn ingest(&mut self, events: impl IntoIterator<Item = EvaluationEvent>) -> usize {
        let before = self.events.len();
        for event in events {
            if self.seen.insert(event.request_id) {
                self.events.push(event);
            }
        }
        let added = self.events.len() - before;
        if added > 0 {
            self.events.sort_by(|a, b| {
                b.position
                    .cmp(&a.position)
                    .then_with(|| b.request_id.cmp(&a.request_id))
            });
        }
        added
    }

    /// The entries inside the current window.
    pub fn visible(&self) -> Vec<HistoryEntry> {
        self.events
            .iter()
            .take(self.window)
            .map(|e| self.entry(e))
            .collect()
    }

    /// Widen the window by the configured increment.
    pub fn show_more(&mut self) {
        self.window = self.window.saturating_add(self.config.increment);
    }

    pub fn set_window(&mut self, window: usize) {
        self.window = window;
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Whether entries exist beyond the window.
    pub fn has_more(&self) -> bool {
        self.events.len() > self.window
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains(&self, request_id: RequestId) -> bool {
        self.seen.contains(&request_id)
    }

    fn entry(&self, event: &EvaluationEvent) -> HistoryEntry {
        HistoryEntry {
            request_id: event.request_id,
            proposer: event.proposer.clone(),
            proposal: truncate_for_display(&event.proposal, self.config.truncate_chars),
            result: event.result.clone(),
            decision: Decision::from_result(&event.result),
        }
    }
}

impl Default for HistoryView {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}
