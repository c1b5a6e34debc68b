//! Traversals that would undo an irreversible action.

use parking_lot::Mutex;
use provenance_core::{ProvenanceError, TraversalEventKind};
use provenance_tests::{add, reset, Harness};
use std::sync::Arc;

#[tokio::test]
async fn undoing_an_irreversible_action_is_refused() {
    let h = Harness::new().unwrap();
    let root = h.graph.root_id();
    h.tracker.apply_action(add(13), false).await.unwrap();
    let r = h.tracker.apply_action(reset(0), false).await.unwrap();
    assert_eq!(h.offset(), 0);
    h.take_calls();

    let targets = Arc::new(Mutex::new(Vec::new()));
    let sink = targets.clone();
    h.traverser.on(TraversalEventKind::InvalidTraversal, move |event| {
        sink.lock().push(event.target_id().clone());
    });

    let outcome = h.traverser.to_state_node(&root, None).await.unwrap();

    assert!(outcome.is_none());
    assert_eq!(*targets.lock(), vec![root]);
    assert_eq!(h.offset(), 0);
    assert!(h.take_calls().is_empty());
    assert_eq!(h.graph.current_id(), *r.id());
}

#[tokio::test]
async fn refusal_happens_before_any_earlier_step_runs() {
    let h = Harness::new().unwrap();
    let root = h.graph.root_id();
    h.tracker.apply_action(reset(7), false).await.unwrap();
    let above = h.tracker.apply_action(add(3), false).await.unwrap();
    assert_eq!(h.offset(), 10);
    h.take_calls();

    // The undo of `add(3)` would be valid on its own; the plan is still refused.
    let outcome = h.traverser.to_state_node(&root, None).await.unwrap();

    assert!(outcome.is_none());
    assert!(h.take_calls().is_empty());
    assert_eq!(h.offset(), 10);
    assert_eq!(h.graph.current_id(), *above.id());
    assert!(matches!(
        h.traverser.plan(&root),
        Err(ProvenanceError::IrreversibleAction { ref function, .. }) if function == "reset"
    ));
}

#[tokio::test]
async fn traversal_below_an_irreversible_action_still_works() {
    let h = Harness::new().unwrap();
    let r = h.tracker.apply_action(reset(100), false).await.unwrap();
    h.tracker.apply_action(add(5), false).await.unwrap();
    h.take_calls();

    h.traverser.to_state_node(r.id(), None).await.unwrap().unwrap();

    assert_eq!(h.take_calls(), vec!["subtract(5)"]);
    assert_eq!(h.offset(), 100);
}

#[tokio::test]
async fn invalid_traversal_reaches_broadcast_subscribers() {
    let h = Harness::new().unwrap();
    let mut rx = h.traverser.subscribe();
    h.tracker.apply_action(reset(1), false).await.unwrap();

    let root = h.graph.root_id();
    assert!(h.traverser.to_state_node(&root, None).await.unwrap().is_none());

    let event = rx.recv().await.unwrap();
    assert_eq!(event.target_id(), &root);
}
