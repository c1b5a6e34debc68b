//! Duplicate node ids and function names leave prior state untouched.

use provenance_core::{ProvenanceError, ProvenanceGraph};
use provenance_tests::{add, Harness};
use provenance_types::{Application, ProvenanceNode, RootNode};
use serde_json::{json, Value};

#[tokio::test]
async fn re_adding_an_existing_node_fails() {
    let h = Harness::new().unwrap();
    let a = h.tracker.apply_action(add(13), false).await.unwrap();
    let before = h.graph.nodes();

    let err = h.graph.add_node(a.clone()).unwrap_err();

    assert!(matches!(err, ProvenanceError::DuplicateNode(ref id) if id == a.id()));
    assert_eq!(h.graph.nodes(), before);
    assert_eq!(h.graph.root().children().len(), 1);
}

#[test]
fn adding_a_second_root_fails() {
    let graph = ProvenanceGraph::new(Application::new("calculator", "1.0.0"));
    let err = graph
        .add_node(ProvenanceNode::Root(RootNode::new("intruder")))
        .unwrap_err();

    assert!(matches!(err, ProvenanceError::InvalidGraph(_)));
    assert_eq!(graph.node_count(), 1);
}

#[tokio::test]
async fn re_registering_a_function_keeps_the_original() {
    let h = Harness::new().unwrap();

    let err = h
        .registry
        .register_fn("add", |_args| async move { Ok(json!("hijacked")) })
        .unwrap_err();
    assert!(matches!(err, ProvenanceError::DuplicateFunction(ref name) if name == "add"));

    let result = h
        .registry
        .get_function_by_name("add")
        .unwrap()
        .invoke(&[json!(8)])
        .await
        .unwrap();
    assert_eq!(result, json!(50));
    assert_eq!(h.registry.names(), vec!["add", "reset", "subtract"]);
}

#[tokio::test]
async fn unknown_function_fails_the_action_without_a_node() {
    let h = Harness::new().unwrap();
    let err = h
        .tracker
        .apply_action(
            provenance_types::Action::irreversible("multiply", vec![Value::from(2)]),
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProvenanceError::FunctionNotFound(ref name) if name == "multiply"));
    assert_eq!(h.graph.node_count(), 1);
    assert_eq!(h.graph.current_id(), h.graph.root_id());
}
