//! Tracker: applies new actions and grows the tree.

use provenance_types::{Action, Artifacts, NodeId, NodeMetadata, ProvenanceNode, StateNode};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::TrackerConfig;
use crate::error::{ProvenanceError, Result};
use crate::graph::ProvenanceGraph;
use crate::registry::{ActionError, ActionFunctionRegistry};

/// Produces an opaque screenshot payload for a freshly created node.
pub trait ScreenshotProvider: Send + Sync {
    fn capture(&self) -> std::result::Result<Value, ActionError>;
}

impl<F> ScreenshotProvider for F
where
    F: Fn() -> std::result::Result<Value, ActionError> + Send + Sync,
{
    fn capture(&self) -> std::result::Result<Value, ActionError> {
        self()
    }
}

/// Applies actions against the current node of a graph.
///
/// Each successful application creates exactly one [`StateNode`] as a child
/// of the node that was current when the call began, and moves `current` to
/// it. Only one `apply_action` or traversal may be in flight at a time.
pub struct ProvenanceTracker {
    registry: Arc<ActionFunctionRegistry>,
    graph: ProvenanceGraph,
    config: TrackerConfig,
    accept_actions: AtomicBool,
    screenshot_provider: Option<Arc<dyn ScreenshotProvider>>,
}

impl ProvenanceTracker {
    pub fn new(
        registry: Arc<ActionFunctionRegistry>,
        graph: ProvenanceGraph,
        config: TrackerConfig,
    ) -> Self {
        Self {
            registry,
            graph,
            config,
            accept_actions: AtomicBool::new(true),
            screenshot_provider: None,
        }
    }

    pub fn with_screenshot_provider(mut self, provider: Arc<dyn ScreenshotProvider>) -> Self {
        self.screenshot_provider = Some(provider);
        self
    }

    pub fn graph(&self) -> &ProvenanceGraph {
        &self.graph
    }

    pub fn registry(&self) -> &Arc<ActionFunctionRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn accepts_actions(&self) -> bool {
        self.accept_actions.load(Ordering::SeqCst)
    }

    /// Pause or resume recording. While paused, `apply_action` is a no-op
    /// that returns the current node.
    pub fn set_accept_actions(&self, accept: bool) {
        self.accept_actions.store(accept, Ordering::SeqCst);
    }

    /// Apply `action` to the current node.
    ///
    /// With `skip_do_call`, the do-function is not invoked and the node is
    /// recorded with a `None` result; use this when the side effect has
    /// already happened elsewhere. A do-function returning `null` is
    /// recorded the same way, matching the serialized form.
    ///
    /// Failures leave the graph untouched. A do-function's own error is
    /// returned as [`ProvenanceError::ActionFailed`] with that error as its
    /// `source`; use [`std::error::Error::source`] or downcast the `source`
    /// field to recover the original type.
    pub async fn apply_action(&self, action: Action, skip_do_call: bool) -> Result<ProvenanceNode> {
        if !self.accepts_actions() {
            tracing::debug!(function = action.do_function(), "Tracker paused, action ignored");
            return Ok(self.graph.current());
        }

        let label = action.label().to_string();
        let parent_id = self.graph.current_id();

        let action_result = if skip_do_call {
            None
        } else {
            let function = self.registry.get_function_by_name(action.do_function())?;
            let value = function
                .invoke(action.do_arguments().as_slice())
                .await
                .map_err(|source| ProvenanceError::ActionFailed {
                    function: action.do_function().to_string(),
                    source,
                })?;
            Some(value).filter(|v| !v.is_null())
        };

        let mut metadata = NodeMetadata::new(self.config.username.clone());
        if self.config.auto_screenshot {
            metadata.screen_shot = self.capture_screenshot();
        }

        let node = StateNode {
            id: NodeId::generate(),
            label,
            metadata,
            action,
            action_result,
            parent: parent_id.clone(),
            children: Vec::new(),
            artifacts: Artifacts::new(),
        };
        let node_id = node.id.clone();

        self.graph.add_node(ProvenanceNode::State(node))?;
        self.graph.set_current(&node_id)?;

        tracing::info!(node_id = %node_id, parent = %parent_id, "Action applied");
        self.graph.get_node(&node_id)
    }

    fn capture_screenshot(&self) -> Option<Value> {
        let provider = self.screenshot_provider.as_ref()?;
        match provider.capture() {
            Ok(shot) => Some(shot),
            Err(e) => {
                tracing::warn!(error = %e, "Screenshot capture failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for ProvenanceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvenanceTracker")
            .field("graph", &self.graph)
            .field("config", &self.config)
            .field("accept_actions", &self.accepts_actions())
            .field("screenshots", &self.screenshot_provider.is_some())
            .finish()
    }
}
