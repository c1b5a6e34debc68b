//! # provenance-types
//!
//! Data model for provenance graphs: the append-only tree of application
//! states produced by a sequence of actions.
//!
//! ## Key Types
//!
//! - [`NodeId`]: opaque, unique identifier of a node within a graph
//! - [`Action`]: reversible or irreversible record of a state transition
//! - [`ProvenanceNode`]: either the [`RootNode`] or a [`StateNode`]
//! - [`SerializedProvenanceGraph`]: export form of a whole graph
//!
//! Nodes reference their parent and children by [`NodeId`], never by
//! pointer, so the same structures double as the serialized form.

pub mod action;
pub mod ids;
pub mod node;
pub mod serialized;

pub use action::{Action, ActionArguments, ActionMetadata, FunctionName, IrreversibleAction, ReversibleAction};
pub use ids::NodeId;
pub use node::{Application, Artifacts, NodeMetadata, ProvenanceNode, RootNode, StateNode};
pub use serialized::{SerializedProvenanceGraph, SerializedProvenanceNode};
