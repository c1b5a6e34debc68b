//! Do/undo functions that call back into the tracker while a traversal
//! replays them.

use provenance_core::{ActionError, ProvenanceTracker, TraverserConfig};
use provenance_tests::{add, Harness};
use provenance_types::Action;
use serde_json::{json, Value};
use std::sync::{Arc, Weak};

/// Register `echo_add`/`echo_subtract`, which forward to the calculator and
/// also record an `annotate` action through the tracker.
fn register_echo(h: &Harness) {
    for (name, inner) in [("echo_add", "add"), ("echo_subtract", "subtract")] {
        let tracker: Weak<ProvenanceTracker> = Arc::downgrade(&h.tracker);
        let registry = h.registry.clone();
        h.registry
            .register_fn(name, move |args| {
                let tracker = tracker.clone();
                let registry = registry.clone();
                async move {
                    let Some(tracker) = tracker.upgrade() else {
                        return Err::<Value, ActionError>("tracker dropped".into());
                    };
                    let value = registry.get_function_by_name(inner)?.invoke(&args).await?;
                    tracker
                        .apply_action(Action::irreversible("annotate", vec![json!(inner)]), true)
                        .await?;
                    Ok(value)
                }
            })
            .unwrap();
    }
}

fn echo_add(n: i64) -> Action {
    Action::reversible("echo_add", vec![json!(n)], "echo_subtract", vec![json!(n)])
}

#[tokio::test]
async fn re_entrant_actions_are_ignored_while_traversing() {
    let h = Harness::new().unwrap();
    register_echo(&h);
    let root = h.graph.root_id();

    let a = h.tracker.apply_action(echo_add(5), false).await.unwrap();
    // Outside a traversal the nested call is recorded normally.
    assert_eq!(h.graph.node_count(), 3);
    let b = h.tracker.apply_action(add(1), false).await.unwrap();
    let count = h.graph.node_count();

    h.traverser.to_state_node(&root, None).await.unwrap().unwrap();
    assert_eq!(h.graph.node_count(), count);
    assert_eq!(h.offset(), 42);

    h.traverser.to_state_node(b.id(), None).await.unwrap().unwrap();
    assert_eq!(h.graph.node_count(), count);
    assert_eq!(h.offset(), 48);
    assert_eq!(h.graph.current_id(), *b.id());
    assert!(h.tracker.accepts_actions());
    assert!(h.graph.contains(a.id()));
}

#[tokio::test]
async fn re_entrant_actions_are_recorded_when_tracking_while_traversing() {
    let h = Harness::with_traverser_config(
        TraverserConfig::default().with_tracking_when_traversing(true),
    )
    .unwrap();
    register_echo(&h);
    let root = h.graph.root_id();

    let first = h.tracker.apply_action(echo_add(5), false).await.unwrap();
    // The nested annotation lands before `first` and under the same parent.
    assert_eq!(h.graph.current_id(), *first.id());
    assert_eq!(h.graph.root().children().len(), 2);
    let count = h.graph.node_count();

    h.traverser.to_state_node(&root, None).await.unwrap().unwrap();

    // Exactly one extra node for the single replayed echo function.
    assert_eq!(h.graph.node_count(), count + 1);
    assert_eq!(h.graph.current_id(), root);
    assert_eq!(h.offset(), 42);
}
