//! Property tests: over any tree of reversible actions, traversing to a node
//! leaves the external state exactly as it was when that node was recorded.

use proptest::prelude::*;
use provenance_tests::{add, subtract, Harness, START};
use provenance_types::NodeId;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Grow {
    Add(i64),
    Subtract(i64),
    /// Move to an earlier node before growing further.
    Branch(usize),
}

fn arb_grow() -> impl Strategy<Value = Grow> {
    prop_oneof![
        (1i64..50).prop_map(Grow::Add),
        (1i64..50).prop_map(Grow::Subtract),
        any::<usize>().prop_map(Grow::Branch),
    ]
}

proptest! {
    #[test]
    fn traversal_reaches_each_recorded_state(
        history in prop::collection::vec(arb_grow(), 1..30),
        targets in prop::collection::vec(any::<usize>(), 1..10),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let h = Harness::new().unwrap();
            let mut expected: HashMap<NodeId, i64> = HashMap::new();
            expected.insert(h.graph.root_id(), START);

            for grow in &history {
                let action = match grow {
                    Grow::Add(n) => add(*n),
                    Grow::Subtract(n) => subtract(*n),
                    Grow::Branch(i) => {
                        let nodes = h.graph.nodes();
                        let target = nodes[i % nodes.len()].id().clone();
                        h.traverser.to_state_node(&target, None).await.unwrap().unwrap();
                        continue;
                    }
                };
                let node = h.tracker.apply_action(action, false).await.unwrap();
                expected.insert(node.id().clone(), h.offset());
            }

            let origin = h.graph.current_id();
            let nodes = h.graph.nodes();
            for i in &targets {
                let target = nodes[i % nodes.len()].id();
                let traversal = h.traverser.to_state_node(target, None).await.unwrap().unwrap();
                assert_eq!(traversal.node.id(), target);
                assert_eq!(h.offset(), expected[target]);
            }

            h.traverser.to_state_node(&origin, None).await.unwrap().unwrap();
            assert_eq!(h.offset(), expected[&origin]);
            assert_eq!(h.graph.node_count(), expected.len());
        });
    }
}
