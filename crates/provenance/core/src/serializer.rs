//! Serialize and restore whole graphs.
//!
//! Restoration validates every id reference before handing out a usable
//! graph, so a restored graph satisfies the same invariants as one built
//! through the tracker.

use provenance_types::{NodeId, ProvenanceNode, SerializedProvenanceGraph};
use std::collections::{HashMap, HashSet};

use crate::error::{ProvenanceError, Result};
use crate::graph::ProvenanceGraph;

pub fn serialize_provenance_graph(graph: &ProvenanceGraph) -> SerializedProvenanceGraph {
    SerializedProvenanceGraph {
        nodes: graph.nodes(),
        root: graph.root_id(),
        application: graph.application(),
        current: graph.current_id(),
    }
}

/// Rebuild a live graph from its serialized form.
///
/// Fails with [`ProvenanceError::InvalidGraph`] when ids collide, when the
/// root or current node is missing, when there is not exactly one root, or
/// when parent and children references disagree.
pub fn restore_provenance_graph(serialized: SerializedProvenanceGraph) -> Result<ProvenanceGraph> {
    let SerializedProvenanceGraph {
        nodes,
        root,
        application,
        current,
    } = serialized;

    let mut by_id: HashMap<&NodeId, &ProvenanceNode> = HashMap::with_capacity(nodes.len());
    for node in &nodes {
        if by_id.insert(node.id(), node).is_some() {
            return Err(invalid(format!("duplicate node id {}", node.id())));
        }
    }

    match by_id.get(&root) {
        Some(node) if node.is_root() => {}
        Some(_) => return Err(invalid(format!("root {} has a parent", root))),
        None => return Err(invalid(format!("root {} not among nodes", root))),
    }
    if !by_id.contains_key(&current) {
        return Err(invalid(format!("current {} not among nodes", current)));
    }

    for node in &nodes {
        match node.parent() {
            None if node.id() != &root => {
                return Err(invalid(format!("second root node {}", node.id())))
            }
            None => {}
            Some(parent_id) => {
                let parent = by_id
                    .get(parent_id)
                    .ok_or_else(|| invalid(format!("dangling parent {} of {}", parent_id, node.id())))?;
                if !parent.children().contains(node.id()) {
                    return Err(invalid(format!(
                        "{} is not listed among the children of its parent {}",
                        node.id(),
                        parent_id
                    )));
                }
            }
        }

        let mut seen = HashSet::new();
        for child_id in node.children() {
            if !seen.insert(child_id) {
                return Err(invalid(format!("child {} listed twice under {}", child_id, node.id())));
            }
            let child = by_id
                .get(child_id)
                .ok_or_else(|| invalid(format!("dangling child {} of {}", child_id, node.id())))?;
            if child.parent() != Some(node.id()) {
                return Err(invalid(format!(
                    "{} lists {} as a child but the child disagrees",
                    node.id(),
                    child_id
                )));
            }
        }
    }

    // Parent/child agreement plus a single root already rules out
    // shared ownership; a cycle would leave nodes unreachable from the root.
    let reachable = count_reachable(&by_id, &root);
    if reachable != nodes.len() {
        return Err(invalid(format!(
            "{} of {} nodes are unreachable from the root",
            nodes.len() - reachable,
            nodes.len()
        )));
    }
    drop(by_id);

    tracing::info!(
        nodes = nodes.len(),
        root = %root,
        current = %current,
        "Provenance graph restored"
    );
    Ok(ProvenanceGraph::from_parts(application, root, current, nodes))
}

fn count_reachable(by_id: &HashMap<&NodeId, &ProvenanceNode>, root: &NodeId) -> usize {
    let mut seen: HashSet<&NodeId> = HashSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(node) = by_id.get(id) {
            stack.extend(node.children().iter());
        }
    }
    seen.len()
}

fn invalid(msg: String) -> ProvenanceError {
    ProvenanceError::InvalidGraph(msg)
}

/// Serialize a graph to a JSON string.
pub fn to_json(graph: &ProvenanceGraph) -> Result<String> {
    Ok(serde_json::to_string(&serialize_provenance_graph(graph))?)
}

/// Restore a graph from a JSON string.
pub fn from_json(json: &str) -> Result<ProvenanceGraph> {
    restore_provenance_graph(serde_json::from_str(json)?)
}
