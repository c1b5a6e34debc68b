//! Traverser: moves the current pointer to any existing node by replaying
//! undo/do functions along the unique tree path.
//!
//! A traversal first plans the full step list (every undo from the current
//! node up to the lowest common ancestor, then every do down to the target)
//! and resolves each function in the registry. Nothing runs unless the whole
//! plan is valid. Steps then execute strictly one after another.

use provenance_types::{ActionArguments, NodeId, ProvenanceNode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::TraverserConfig;
use crate::error::{ProvenanceError, Result};
use crate::events::{EventEmitter, SubscriptionId, TraversalEvent, TraversalEventKind};
use crate::graph::ProvenanceGraph;
use crate::registry::{ActionFunctionRegistry, RegisteredFunction};
use crate::tracker::ProvenanceTracker;

/// Which half of an action a step replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    /// Moving from a node to its parent: run the node's undo.
    Undo,
    /// Moving from a node to one of its children: run the child's do.
    Do,
}

/// One resolved replay step.
#[derive(Debug, Clone)]
pub struct TraversalStep {
    /// Node whose action is replayed.
    pub node: NodeId,
    pub direction: StepDirection,
    pub function_name: String,
    pub arguments: ActionArguments,
    function: RegisteredFunction,
}

/// A fully resolved traversal, ready to execute.
#[derive(Debug, Clone)]
pub struct TraversalPlan {
    /// Node path from the current node to the target, both included.
    pub path: Vec<NodeId>,
    pub steps: Vec<TraversalStep>,
}

impl TraversalPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// `(direction, function)` pairs in execution order.
    pub fn calls(&self) -> Vec<(StepDirection, &str)> {
        self.steps
            .iter()
            .map(|s| (s.direction, s.function_name.as_str()))
            .collect()
    }
}

/// Outcome of a completed traversal.
#[derive(Debug, Clone)]
pub struct Traversal {
    /// The node that is now current.
    pub node: ProvenanceNode,
    /// Value returned by the last replayed function; `None` if nothing ran.
    pub result: Option<Value>,
    /// Number of functions replayed.
    pub steps: usize,
    /// Caller-supplied animation hint, passed through untouched.
    pub transition_hint: Option<Duration>,
}

/// Finds the path between the current node and a target and replays it.
///
/// Only one traversal or `apply_action` may be in flight at a time; there is
/// no cancellation, and steps that ran before a failure are not rolled back.
pub struct ProvenanceGraphTraverser {
    registry: Arc<ActionFunctionRegistry>,
    graph: ProvenanceGraph,
    tracker: Option<Arc<ProvenanceTracker>>,
    config: TraverserConfig,
    events: EventEmitter<TraversalEvent>,
}

impl ProvenanceGraphTraverser {
    pub fn new(
        registry: Arc<ActionFunctionRegistry>,
        graph: ProvenanceGraph,
        config: TraverserConfig,
    ) -> Self {
        Self {
            registry,
            graph,
            tracker: None,
            config,
            events: EventEmitter::new(),
        }
    }

    /// Attach the tracker to pause while functions replay.
    pub fn with_tracker(mut self, tracker: Arc<ProvenanceTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn graph(&self) -> &ProvenanceGraph {
        &self.graph
    }

    pub fn config(&self) -> &TraverserConfig {
        &self.config
    }

    pub fn on<F>(&self, kind: TraversalEventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&TraversalEvent) + Send + Sync + 'static,
    {
        self.events.on(kind, handler)
    }

    pub fn off(&self, kind: TraversalEventKind, id: SubscriptionId) -> bool {
        self.events.off(kind, id)
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<TraversalEvent> {
        self.events.subscribe()
    }

    /// Plan the replay from the current node to `target` without running it.
    ///
    /// Fails with [`ProvenanceError::IrreversibleAction`] if the path climbs
    /// over an action without an undo, and with
    /// [`ProvenanceError::FunctionNotFound`] if a step's function is not
    /// registered.
    pub fn plan(&self, target: &NodeId) -> Result<TraversalPlan> {
        let current = self.graph.current_id();
        let path = self.graph.path_between(&current, target)?;

        let mut steps = Vec::with_capacity(path.len().saturating_sub(1));
        for pair in path.windows(2) {
            let (this, next) = (&pair[0], &pair[1]);
            let this_node = self.graph.get_node(this)?;

            let step = if this_node.parent() == Some(next) {
                self.undo_step(&this_node)?
            } else {
                let next_node = self.graph.get_node(next)?;
                if next_node.parent() != Some(this) {
                    return Err(ProvenanceError::InvalidGraph(format!(
                        "{} and {} are not adjacent",
                        this, next
                    )));
                }
                self.do_step(&next_node)?
            };
            steps.push(step);
        }

        Ok(TraversalPlan { path, steps })
    }

    fn undo_step(&self, node: &ProvenanceNode) -> Result<TraversalStep> {
        let action = node.action().ok_or_else(|| {
            ProvenanceError::InvalidGraph(format!("cannot step up from root {}", node.id()))
        })?;
        let (undo, undo_arguments) =
            action
                .undo()
                .ok_or_else(|| ProvenanceError::IrreversibleAction {
                    node: node.id().clone(),
                    function: action.do_function().to_string(),
                })?;
        Ok(TraversalStep {
            node: node.id().clone(),
            direction: StepDirection::Undo,
            function_name: undo.to_string(),
            arguments: undo_arguments.clone(),
            function: self.registry.get_function_by_name(undo)?,
        })
    }

    fn do_step(&self, node: &ProvenanceNode) -> Result<TraversalStep> {
        let action = node.action().ok_or_else(|| {
            ProvenanceError::InvalidGraph(format!("cannot step down into root {}", node.id()))
        })?;
        Ok(TraversalStep {
            node: node.id().clone(),
            direction: StepDirection::Do,
            function_name: action.do_function().to_string(),
            arguments: action.do_arguments().clone(),
            function: self.registry.get_function_by_name(action.do_function())?,
        })
    }

    /// Move to `target` by replaying undo/do functions along the path.
    ///
    /// Returns `Ok(None)` and emits `InvalidTraversal` when the path crosses
    /// an irreversible action; the current node is unchanged in that case
    /// and no function has run. Every other failure is returned as an error,
    /// with `current` unchanged.
    pub async fn to_state_node(
        &self,
        target: &NodeId,
        transition_hint: Option<Duration>,
    ) -> Result<Option<Traversal>> {
        let current = self.graph.current();
        let target_node = self.graph.get_node(target)?;

        if current.id() == target_node.id() {
            return Ok(Some(Traversal {
                node: current,
                result: None,
                steps: 0,
                transition_hint,
            }));
        }

        let plan = match self.plan(target) {
            Ok(plan) => plan,
            Err(ProvenanceError::IrreversibleAction { node, function }) => {
                tracing::warn!(
                    target = %target,
                    node_id = %node,
                    function = %function,
                    "Invalid traversal: path crosses an irreversible action"
                );
                self.events.emit(TraversalEvent::InvalidTraversal {
                    target: target_node,
                });
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let steps = plan.steps.len();
        let result = self.execute(&plan).await?;

        self.graph.set_current(target)?;
        tracing::info!(
            from = %current.id(),
            target = %target,
            steps,
            hint_ms = transition_hint.map(|d| d.as_millis() as u64),
            "Traversal complete"
        );

        Ok(Some(Traversal {
            node: self.graph.get_node(target)?,
            result,
            steps,
            transition_hint,
        }))
    }

    async fn execute(&self, plan: &TraversalPlan) -> Result<Option<Value>> {
        let mut last = None;
        for step in &plan.steps {
            tracing::debug!(
                node_id = %step.node,
                function = %step.function_name,
                direction = ?step.direction,
                "Replaying step"
            );

            let pause = self.pause_tracker();
            let outcome = step.function.invoke(step.arguments.as_slice()).await;
            drop(pause);

            let value = outcome.map_err(|source| ProvenanceError::ActionFailed {
                function: step.function_name.clone(),
                source,
            })?;
            last = Some(value);
        }
        Ok(last)
    }

    /// Stop the tracker from recording while one function replays, unless
    /// tracking during traversal is enabled. The tracker resumes when the
    /// guard drops, including when the traversal future is cancelled.
    fn pause_tracker(&self) -> Option<TrackerPause<'_>> {
        let tracker = self.tracker.as_deref()?;
        if self.config.tracking_when_traversing || !tracker.accepts_actions() {
            return None;
        }
        tracker.set_accept_actions(false);
        Some(TrackerPause { tracker })
    }
}

struct TrackerPause<'a> {
    tracker: &'a ProvenanceTracker,
}

impl Drop for TrackerPause<'_> {
    fn drop(&mut self) {
        self.tracker.set_accept_actions(true);
    }
}

impl std::fmt::Debug for ProvenanceGraphTraverser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvenanceGraphTraverser")
            .field("graph", &self.graph)
            .field("config", &self.config)
            .field("tracker", &self.tracker.is_some())
            .finish()
    }
}
