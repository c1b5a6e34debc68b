//! The provenance graph: an id-indexed, append-only tree of nodes plus the
//! `current` pointer.
//!
//! Nodes live in an arena keyed by [`NodeId`]; parent and children are
//! stored as ids. Accessors hand out owned snapshots, and event handlers are
//! always invoked after the internal lock has been released, so handlers
//! (and re-entrant do/undo functions) may freely read the graph.

use parking_lot::RwLock;
use provenance_types::{Application, Artifacts, NodeId, ProvenanceNode, RootNode};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::error::{ProvenanceError, Result};
use crate::events::{EventEmitter, GraphEvent, GraphEventKind, SubscriptionId};

struct GraphState {
    application: Application,
    nodes: HashMap<NodeId, ProvenanceNode>,
    /// Insertion order, for deterministic enumeration and serialization.
    order: Vec<NodeId>,
    current: NodeId,
}

struct GraphInner {
    root: NodeId,
    state: RwLock<GraphState>,
    events: EventEmitter<GraphEvent>,
}

/// Handle to a provenance graph. Cloning shares the same graph.
#[derive(Clone)]
pub struct ProvenanceGraph {
    inner: Arc<GraphInner>,
}

impl ProvenanceGraph {
    /// Create a graph with a fresh root created by `"Unknown"`.
    pub fn new(application: Application) -> Self {
        Self::with_user(application, "Unknown")
    }

    /// Create a graph with a fresh root created by `user_id`.
    pub fn with_user(application: Application, user_id: impl Into<String>) -> Self {
        Self::with_root(application, RootNode::new(user_id))
    }

    /// Create a graph around an externally supplied root, e.g. when
    /// importing a prior session. The root becomes the current node.
    pub fn with_root(application: Application, root: RootNode) -> Self {
        let root_id = root.id.clone();
        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), ProvenanceNode::Root(root));

        tracing::debug!(root = %root_id, application = %application.name, "Provenance graph created");

        Self {
            inner: Arc::new(GraphInner {
                root: root_id.clone(),
                state: RwLock::new(GraphState {
                    application,
                    nodes,
                    order: vec![root_id.clone()],
                    current: root_id,
                }),
                events: EventEmitter::new(),
            }),
        }
    }

    /// Assemble a graph from already-validated parts. No events are emitted.
    pub(crate) fn from_parts(
        application: Application,
        root: NodeId,
        current: NodeId,
        nodes: Vec<ProvenanceNode>,
    ) -> Self {
        let order = nodes.iter().map(|n| n.id().clone()).collect();
        let nodes = nodes.into_iter().map(|n| (n.id().clone(), n)).collect();
        Self {
            inner: Arc::new(GraphInner {
                root,
                state: RwLock::new(GraphState {
                    application,
                    nodes,
                    order,
                    current,
                }),
                events: EventEmitter::new(),
            }),
        }
    }

    pub fn application(&self) -> Application {
        self.inner.state.read().application.clone()
    }

    pub fn set_application(&self, application: Application) {
        self.inner.state.write().application = application;
    }

    pub fn root_id(&self) -> NodeId {
        self.inner.root.clone()
    }

    pub fn root(&self) -> ProvenanceNode {
        let state = self.inner.state.read();
        // The root is inserted at construction and never removed.
        state.nodes[&self.inner.root].clone()
    }

    /// Store a node and emit `NodeAdded`.
    ///
    /// A state node's parent must already be present; the node is linked
    /// into the parent's `children` unless it is already listed there.
    /// A new node arrives as a leaf, so a non-empty `children` list is
    /// rejected. Root nodes cannot be added: a graph has exactly one root.
    pub fn add_node(&self, node: ProvenanceNode) -> Result<()> {
        let snapshot = {
            let mut state = self.inner.state.write();
            let id = node.id().clone();
            if state.nodes.contains_key(&id) {
                return Err(ProvenanceError::DuplicateNode(id));
            }
            if !node.children().is_empty() {
                return Err(ProvenanceError::InvalidGraph(format!(
                    "new node {} already lists {} children",
                    id,
                    node.children().len()
                )));
            }
            let parent_id = match node.parent() {
                Some(parent) => parent.clone(),
                None => {
                    return Err(ProvenanceError::InvalidGraph(format!(
                        "cannot add a second root node {}",
                        id
                    )))
                }
            };
            let parent = state
                .nodes
                .get_mut(&parent_id)
                .ok_or_else(|| ProvenanceError::NodeNotFound(parent_id.clone()))?;
            if !parent.children().contains(&id) {
                parent.children_mut().push(id.clone());
            }
            state.order.push(id.clone());
            state.nodes.insert(id, node.clone());
            node
        };

        tracing::debug!(node_id = %snapshot.id(), label = snapshot.label(), "Node added");
        self.inner.events.emit(GraphEvent::NodeAdded(snapshot));
        Ok(())
    }

    pub fn get_node(&self, id: &NodeId) -> Result<ProvenanceNode> {
        self.inner
            .state
            .read()
            .nodes
            .get(id)
            .cloned()
            .ok_or_else(|| ProvenanceError::NodeNotFound(id.clone()))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.inner.state.read().nodes.contains_key(id)
    }

    pub fn current(&self) -> ProvenanceNode {
        let state = self.inner.state.read();
        // `current` always references a stored node.
        state.nodes[&state.current].clone()
    }

    pub fn current_id(&self) -> NodeId {
        self.inner.state.read().current.clone()
    }

    /// Move the current pointer and emit `CurrentChanged`.
    pub fn set_current(&self, id: &NodeId) -> Result<()> {
        let snapshot = {
            let mut state = self.inner.state.write();
            let node = state
                .nodes
                .get(id)
                .cloned()
                .ok_or_else(|| ProvenanceError::NodeNotFound(id.clone()))?;
            state.current = id.clone();
            node
        };

        tracing::debug!(node_id = %id, "Current node changed");
        self.inner.events.emit(GraphEvent::CurrentChanged(snapshot));
        Ok(())
    }

    /// Emit `NodeChanged` for a node whose artifacts were updated.
    pub fn emit_node_changed_event(&self, id: &NodeId) -> Result<()> {
        let snapshot = self.get_node(id)?;
        self.inner.events.emit(GraphEvent::NodeChanged(snapshot));
        Ok(())
    }

    /// Mutate a node's artifacts in place. Does not emit; follow up with
    /// [`emit_node_changed_event`](Self::emit_node_changed_event).
    pub fn update_artifacts<R>(&self, id: &NodeId, f: impl FnOnce(&mut Artifacts) -> R) -> Result<R> {
        let mut state = self.inner.state.write();
        let node = state
            .nodes
            .get_mut(id)
            .ok_or_else(|| ProvenanceError::NodeNotFound(id.clone()))?;
        Ok(f(node.artifacts_mut()))
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> Vec<ProvenanceNode> {
        let state = self.inner.state.read();
        state
            .order
            .iter()
            .filter_map(|id| state.nodes.get(id).cloned())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.inner.state.read().nodes.len()
    }

    pub fn children_of(&self, id: &NodeId) -> Result<Vec<ProvenanceNode>> {
        let state = self.inner.state.read();
        let node = state
            .nodes
            .get(id)
            .ok_or_else(|| ProvenanceError::NodeNotFound(id.clone()))?;
        Ok(node
            .children()
            .iter()
            .filter_map(|c| state.nodes.get(c).cloned())
            .collect())
    }

    pub fn parent_of(&self, id: &NodeId) -> Result<Option<ProvenanceNode>> {
        let state = self.inner.state.read();
        let node = state
            .nodes
            .get(id)
            .ok_or_else(|| ProvenanceError::NodeNotFound(id.clone()))?;
        Ok(node.parent().and_then(|p| state.nodes.get(p).cloned()))
    }

    /// The unique simple path `from → … → to`, both ends included.
    ///
    /// Breadth-first over the tree with an explicit queue; each node's
    /// children and its parent are neighbours, and the search never steps
    /// back into the node it just came from.
    pub fn path_between(&self, from: &NodeId, to: &NodeId) -> Result<Vec<NodeId>> {
        let state = self.inner.state.read();
        for id in [from, to] {
            if !state.nodes.contains_key(id) {
                return Err(ProvenanceError::NodeNotFound(id.clone()));
            }
        }
        if from == to {
            return Ok(vec![from.clone()]);
        }

        let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(from.clone());

        while let Some(current_id) = queue.pop_front() {
            let Some(node) = state.nodes.get(&current_id) else {
                continue;
            };
            let previous = came_from.get(&current_id).cloned();
            let neighbours = node.children().iter().chain(node.parent());

            for next in neighbours {
                if Some(next) == previous.as_ref() || next == from {
                    continue;
                }
                came_from.insert(next.clone(), current_id.clone());

                if next == to {
                    let mut path = vec![to.clone()];
                    let mut cur = to.clone();
                    while let Some(prev) = came_from.get(&cur) {
                        path.push(prev.clone());
                        cur = prev.clone();
                    }
                    path.reverse();
                    return Ok(path);
                }

                queue.push_back(next.clone());
            }
        }

        Err(ProvenanceError::InvalidGraph(format!(
            "no path from {} to {}",
            from, to
        )))
    }

    /// Register a handler for a graph topic.
    pub fn on<F>(&self, kind: GraphEventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&GraphEvent) + Send + Sync + 'static,
    {
        self.inner.events.on(kind, handler)
    }

    pub fn off(&self, kind: GraphEventKind, id: SubscriptionId) -> bool {
        self.inner.events.off(kind, id)
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<GraphEvent> {
        self.inner.events.subscribe()
    }

    /// Whether both handles refer to the same graph.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for ProvenanceGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("ProvenanceGraph")
            .field("application", &state.application)
            .field("root", &self.inner.root)
            .field("current", &state.current)
            .field("nodes", &state.nodes.len())
            .finish()
    }
}
