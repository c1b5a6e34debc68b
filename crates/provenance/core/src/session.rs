//! One-stop wiring of graph, registry, tracker and traverser.

use provenance_types::{Action, NodeId, ProvenanceNode, SerializedProvenanceGraph};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ProvenanceConfig;
use crate::error::Result;
use crate::graph::ProvenanceGraph;
use crate::registry::ActionFunctionRegistry;
use crate::serializer::{restore_provenance_graph, serialize_provenance_graph};
use crate::tracker::ProvenanceTracker;
use crate::traverser::{ProvenanceGraphTraverser, Traversal};

/// A graph with its tracker and traverser sharing one function registry.
///
/// The traverser holds the tracker so that actions applied by replayed
/// functions are ignored unless `traverser.tracking_when_traversing` is set.
pub struct ProvenanceSession {
    config: ProvenanceConfig,
    graph: ProvenanceGraph,
    registry: Arc<ActionFunctionRegistry>,
    tracker: Arc<ProvenanceTracker>,
    traverser: ProvenanceGraphTraverser,
}

impl ProvenanceSession {
    /// Start a session on a fresh graph whose root is created by the
    /// configured user.
    pub fn new(config: ProvenanceConfig) -> Result<Self> {
        config.validate()?;
        let graph =
            ProvenanceGraph::with_user(config.application.clone(), config.tracker.username.clone());
        Ok(Self::with_graph(config, graph))
    }

    /// Resume a session from a previously serialized graph.
    pub fn restore(config: ProvenanceConfig, serialized: SerializedProvenanceGraph) -> Result<Self> {
        config.validate()?;
        let graph = restore_provenance_graph(serialized)?;
        Ok(Self::with_graph(config, graph))
    }

    fn with_graph(config: ProvenanceConfig, graph: ProvenanceGraph) -> Self {
        let registry = Arc::new(ActionFunctionRegistry::new());
        let tracker = Arc::new(ProvenanceTracker::new(
            registry.clone(),
            graph.clone(),
            config.tracker.clone(),
        ));
        let traverser =
            ProvenanceGraphTraverser::new(registry.clone(), graph.clone(), config.traverser.clone())
                .with_tracker(tracker.clone());

        tracing::info!(
            application = %config.application.name,
            nodes = graph.node_count(),
            "Provenance session started"
        );

        Self {
            config,
            graph,
            registry,
            tracker,
            traverser,
        }
    }

    pub fn config(&self) -> &ProvenanceConfig {
        &self.config
    }

    pub fn graph(&self) -> &ProvenanceGraph {
        &self.graph
    }

    pub fn registry(&self) -> &Arc<ActionFunctionRegistry> {
        &self.registry
    }

    pub fn tracker(&self) -> &Arc<ProvenanceTracker> {
        &self.tracker
    }

    pub fn traverser(&self) -> &ProvenanceGraphTraverser {
        &self.traverser
    }

    pub async fn apply_action(&self, action: Action, skip_do_call: bool) -> Result<ProvenanceNode> {
        self.tracker.apply_action(action, skip_do_call).await
    }

    pub async fn to_state_node(
        &self,
        target: &NodeId,
        transition_hint: Option<Duration>,
    ) -> Result<Option<Traversal>> {
        self.traverser.to_state_node(target, transition_hint).await
    }

    pub fn serialize(&self) -> SerializedProvenanceGraph {
        serialize_provenance_graph(&self.graph)
    }
}

impl std::fmt::Debug for ProvenanceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvenanceSession")
            .field("config", &self.config)
            .field("graph", &self.graph)
            .field("functions", &self.registry.len())
            .finish()
    }
}
