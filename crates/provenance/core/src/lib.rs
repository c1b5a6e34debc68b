//! # provenance-core
//!
//! Provenance graph engine: records an application's state transitions as an
//! append-only tree and moves between any two recorded states by replaying
//! undo and do functions.
//!
//! ## Components
//!
//! 1. **Registry** ([`ActionFunctionRegistry`]): maps function names stored in
//!    actions to async callables, optionally bound to a receiver
//! 2. **Graph** ([`ProvenanceGraph`]): id-indexed tree of nodes with a
//!    `current` pointer and node/current change events
//! 3. **Tracker** ([`ProvenanceTracker`]): runs a new action and records it as
//!    a child of the current node
//! 4. **Traverser** ([`ProvenanceGraphTraverser`]): plans the tree path to a
//!    target, refuses paths that would undo an irreversible action, and
//!    replays the path one function at a time
//! 5. **Serializer** ([`serialize_provenance_graph`],
//!    [`restore_provenance_graph`]): flat export with validated restore
//!
//! [`ProvenanceSession`] wires all of them from a single
//! [`ProvenanceConfig`].
//!
//! Only one `apply_action` or traversal may be in flight per graph at a
//! time. Do and undo functions may call back into the tracker; whether
//! those calls are recorded during a traversal is controlled by
//! [`TraverserConfig::tracking_when_traversing`].

pub mod config;
pub mod error;
pub mod events;
pub mod graph;
pub mod registry;
pub mod serializer;
pub mod session;
pub mod telemetry;
pub mod tracker;
pub mod traverser;

pub use config::{ProvenanceConfig, TrackerConfig, TraverserConfig};
pub use error::{ProvenanceError, Result};
pub use events::{
    Event, EventEmitter, EventHandler, GraphEvent, GraphEventKind, SubscriptionId, TraversalEvent,
    TraversalEventKind,
};
pub use graph::ProvenanceGraph;
pub use registry::{
    action_fn, context_fn, ActionError, ActionFunction, ActionFunctionRegistry, BoundContext,
    RegisteredFunction,
};
pub use serializer::{from_json, restore_provenance_graph, serialize_provenance_graph, to_json};
pub use session::ProvenanceSession;
pub use telemetry::{init_tracing, TracingConfig};
pub use tracker::{ProvenanceTracker, ScreenshotProvider};
pub use traverser::{ProvenanceGraphTraverser, StepDirection, Traversal, TraversalPlan, TraversalStep};

pub use provenance_types as types;
