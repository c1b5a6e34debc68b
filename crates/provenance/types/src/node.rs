use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::Action;
use crate::ids::NodeId;

/// Open key/value map of cached payloads attached to a node after the fact.
pub type Artifacts = Map<String, Value>;

/// The application whose state transitions a graph records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    pub version: String,
}

impl Application {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Creation metadata carried by every node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    pub created_by: String,
    pub created_on: DateTime<Utc>,
    /// Screenshot captured by the tracker when auto-screenshot is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_shot: Option<Value>,
    /// Open extension map.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeMetadata {
    pub fn new(created_by: impl Into<String>) -> Self {
        Self {
            created_by: created_by.into(),
            created_on: Utc::now(),
            screen_shot: None,
            extra: Map::new(),
        }
    }
}

/// The single parentless node of a graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootNode {
    pub id: NodeId,
    pub label: String,
    pub metadata: NodeMetadata,
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub artifacts: Artifacts,
}

impl RootNode {
    pub fn new(created_by: impl Into<String>) -> Self {
        Self {
            id: NodeId::generate(),
            label: "Root".to_string(),
            metadata: NodeMetadata::new(created_by),
            children: Vec::new(),
            artifacts: Artifacts::new(),
        }
    }
}

/// A node produced by applying an action to its parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateNode {
    pub id: NodeId,
    pub label: String,
    pub metadata: NodeMetadata,
    pub action: Action,
    /// Value returned by the do-function. Serialized as `null` when the
    /// call was skipped or returned nothing.
    pub action_result: Option<Value>,
    pub parent: NodeId,
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub artifacts: Artifacts,
}

/// Any node of a provenance graph.
///
/// Serialized untagged; a `parent` field marks a state node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProvenanceNode {
    State(StateNode),
    Root(RootNode),
}

impl ProvenanceNode {
    pub fn id(&self) -> &NodeId {
        match self {
            Self::State(n) => &n.id,
            Self::Root(n) => &n.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::State(n) => &n.label,
            Self::Root(n) => &n.label,
        }
    }

    pub fn metadata(&self) -> &NodeMetadata {
        match self {
            Self::State(n) => &n.metadata,
            Self::Root(n) => &n.metadata,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            Self::State(n) => &n.children,
            Self::Root(n) => &n.children,
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<NodeId> {
        match self {
            Self::State(n) => &mut n.children,
            Self::Root(n) => &mut n.children,
        }
    }

    pub fn artifacts(&self) -> &Artifacts {
        match self {
            Self::State(n) => &n.artifacts,
            Self::Root(n) => &n.artifacts,
        }
    }

    pub fn artifacts_mut(&mut self) -> &mut Artifacts {
        match self {
            Self::State(n) => &mut n.artifacts,
            Self::Root(n) => &mut n.artifacts,
        }
    }

    /// Parent id; `None` only for the root.
    pub fn parent(&self) -> Option<&NodeId> {
        match self {
            Self::State(n) => Some(&n.parent),
            Self::Root(_) => None,
        }
    }

    pub fn action(&self) -> Option<&Action> {
        match self {
            Self::State(n) => Some(&n.action),
            Self::Root(_) => None,
        }
    }

    pub fn is_state_node(&self) -> bool {
        matches!(self, Self::State(_))
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root(_))
    }
}

impl From<RootNode> for ProvenanceNode {
    fn from(node: RootNode) -> Self {
        Self::Root(node)
    }
}

impl From<StateNode> for ProvenanceNode {
    fn from(node: StateNode) -> Self {
        Self::State(node)
    }
}
