//! Property tests for the history view.

use aim_history::{truncate_for_display, HistoryConfig, HistoryView};
use aim_types::{AccountAddress, EvaluationEvent, EventPosition, RequestId};
use proptest::prelude::*;

fn arb_event() -> impl Strategy<Value = EvaluationEvent> {
    (0u64..50, 0u64..1_000, 0u64..4).prop_map(|(id, block, log)| EvaluationEvent {
        request_id: RequestId::new(id),
        proposer: AccountAddress::from_bytes([1; 20]),
        proposal: format!("proposal {id}"),
        result: "Rejected".into(),
        position: EventPosition::new(block, log),
    })
}

proptest! {
    #[test]
    fn visible_entries_are_unique(
        batches in prop::collection::vec(prop::collection::vec(arb_event(), 0..10), 1..5),
        clicks in 0usize..5,
    ) {
        let mut view = HistoryView::new(HistoryConfig::default());
        for batch in batches {
            view.ingest(batch);
        }
        for _ in 0..clicks {
            view.show_more();
        }
        view.set_window(view.len());

        let visible = view.visible();
        let mut ids: Vec<_> = visible.iter().map(|e| e.request_id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);
        prop_assert_eq!(total, view.len());
        prop_assert!(!view.has_more());
    }

    #[test]
    fn window_grows_by_increment(count in 0usize..30, clicks in 0usize..8) {
        let mut view = HistoryView::new(HistoryConfig::default());
        view.ingest((0..count as u64).map(|i| EvaluationEvent {
            request_id: RequestId::new(i),
            proposer: AccountAddress::from_bytes([2; 20]),
            proposal: String::new(),
            result: String::new(),
            position: EventPosition::new(i, 0),
        }));
        for _ in 0..clicks {
            view.show_more();
        }
        let expected = count.min(4 + 4 * clicks);
        prop_assert_eq!(view.visible().len(), expected);
        prop_assert_eq!(view.has_more(), count > 4 + 4 * clicks);
    }

    #[test]
    fn truncation_never_exceeds_limit(text in "\\PC{0,200}", max in 1usize..150) {
        let shown = truncate_for_display(&text, max);
        let chars = text.chars().count();
        if chars > max {
            prop_assert_eq!(shown.chars().count(), max + 3);
            prop_assert!(shown.ends_with("..."));
        } else {
            prop_assert_eq!(shown, text);
        }
    }
}
