//! Export form of a provenance graph.

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;
use crate::node::{Application, ProvenanceNode};

/// A serialized node. Nodes already express `parent`/`children` as ids, so
/// the live and serialized forms coincide.
pub type SerializedProvenanceNode = ProvenanceNode;

/// A whole graph: `{ nodes, root, application, current }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedProvenanceGraph {
    /// Every node, in the order it was added to the graph.
    pub nodes: Vec<SerializedProvenanceNode>,
    pub root: NodeId,
    pub application: Application,
    pub current: NodeId,
}
