//! Property tests: serialize, restore and serialize again yields the same
//! graph for any history built through the tracker and traverser.

use proptest::prelude::*;
use provenance_core::{from_json, restore_provenance_graph, serialize_provenance_graph, to_json};
use provenance_tests::{add, reset, subtract, Harness};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Step {
    Add(i64),
    Subtract(i64),
    Reset(i64),
    /// Traverse to the node at this index (modulo the node count).
    Jump(usize),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (1i64..100).prop_map(Step::Add),
        3 => (1i64..100).prop_map(Step::Subtract),
        1 => (0i64..10).prop_map(Step::Reset),
        2 => any::<usize>().prop_map(Step::Jump),
    ]
}

async fn build(steps: &[Step]) -> Harness {
    let h = Harness::new().unwrap();
    for step in steps {
        let action = match step {
            Step::Add(n) => add(*n),
            Step::Subtract(n) => subtract(*n),
            Step::Reset(n) => reset(*n),
            Step::Jump(i) => {
                let nodes = h.graph.nodes();
                let target = nodes[i % nodes.len()].id().clone();
                // Refused jumps (across a reset) leave `current` alone.
                h.traverser.to_state_node(&target, None).await.unwrap();
                continue;
            }
        };
        h.tracker.apply_action(action, false).await.unwrap();
    }
    h
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn serialize_restore_serialize_is_a_fixed_point(
        steps in prop::collection::vec(arb_step(), 0..40),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let h = build(&steps).await;

            let first = serialize_provenance_graph(&h.graph);
            let restored = restore_provenance_graph(first.clone()).unwrap();
            let second = serialize_provenance_graph(&restored);

            assert_eq!(first, second);
            assert_eq!(restored.current_id(), h.graph.current_id());
            let applied = steps.iter().filter(|s| !matches!(s, Step::Jump(_))).count();
            assert_eq!(restored.node_count(), applied + 1);
        });
    }

    #[test]
    fn json_round_trip_is_a_fixed_point(
        steps in prop::collection::vec(arb_step(), 0..25),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let h = build(&steps).await;

            let json = to_json(&h.graph).unwrap();
            let restored = from_json(&json).unwrap();

            assert_eq!(to_json(&restored).unwrap(), json);
        });
    }
}
