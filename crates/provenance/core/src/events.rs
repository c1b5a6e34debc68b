//! Synchronous, multi-subscriber event emitter.
//!
//! Handlers are registered per topic and invoked in registration order with
//! a reference to the event. Every emitted event is also broadcast on a
//! `tokio` channel for asynchronous observers.

use parking_lot::Mutex;
use provenance_types::{NodeId, ProvenanceNode};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

const BROADCAST_CAPACITY: usize = 256;

/// An event that can be routed by topic.
pub trait Event: Clone + Send + 'static {
    type Kind: Copy + Eq + Hash + Send;

    fn kind(&self) -> Self::Kind;
}

/// Callback registered for one topic.
pub type EventHandler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handle returned by [`EventEmitter::on`], used to unregister the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Per-topic handler lists plus a broadcast channel.
pub struct EventEmitter<E: Event> {
    handlers: Mutex<HashMap<E::Kind, Vec<(SubscriptionId, EventHandler<E>)>>>,
    next_id: AtomicU64,
    sender: broadcast::Sender<E>,
}

impl<E: Event> EventEmitter<E> {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            handlers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            sender,
        }
    }

    /// Register a handler for the given topic.
    pub fn on<F>(&self, kind: E::Kind, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .lock()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns whether it was registered for this topic.
    pub fn off(&self, kind: E::Kind, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock();
        match handlers.get_mut(&kind) {
            Some(list) => {
                let before = list.len();
                list.retain(|(sid, _)| *sid != id);
                before != list.len()
            }
            None => false,
        }
    }

    /// Invoke every handler registered for the event's topic.
    ///
    /// The handler list is snapshotted first, so handlers may subscribe or
    /// unsubscribe while being called.
    pub fn emit(&self, event: E) {
        let snapshot: Vec<EventHandler<E>> = self
            .handlers
            .lock()
            .get(&event.kind())
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();

        for handler in snapshot {
            handler(&event);
        }

        // No receivers is not an error.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }

    pub fn handler_count(&self, kind: E::Kind) -> usize {
        self.handlers.lock().get(&kind).map_or(0, Vec::len)
    }
}

impl<E: Event> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Topics emitted by a provenance graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphEventKind {
    NodeAdded,
    CurrentChanged,
    NodeChanged,
}

/// Graph notification carrying a snapshot of the affected node.
#[derive(Debug, Clone)]
pub enum GraphEvent {
    NodeAdded(ProvenanceNode),
    CurrentChanged(ProvenanceNode),
    NodeChanged(ProvenanceNode),
}

impl GraphEvent {
    pub fn node(&self) -> &ProvenanceNode {
        match self {
            Self::NodeAdded(n) | Self::CurrentChanged(n) | Self::NodeChanged(n) => n,
        }
    }
}

impl Event for GraphEvent {
    type Kind = GraphEventKind;

    fn kind(&self) -> GraphEventKind {
        match self {
            Self::NodeAdded(_) => GraphEventKind::NodeAdded,
            Self::CurrentChanged(_) => GraphEventKind::CurrentChanged,
            Self::NodeChanged(_) => GraphEventKind::NodeChanged,
        }
    }
}

/// Topics emitted by a traverser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalEventKind {
    InvalidTraversal,
}

#[derive(Debug, Clone)]
pub enum TraversalEvent {
    /// A traversal was refused because the path crosses an irreversible action.
    InvalidTraversal { target: ProvenanceNode },
}

impl TraversalEvent {
    pub fn target_id(&self) -> &NodeId {
        match self {
            Self::InvalidTraversal { target } => target.id(),
        }
    }
}

impl Event for TraversalEvent {
    type Kind = TraversalEventKind;

    fn kind(&self) -> TraversalEventKind {
        match self {
            Self::InvalidTraversal { .. } => TraversalEventKind::InvalidTraversal,
        }
    }
}
