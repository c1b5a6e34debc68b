use provenance_types::NodeId;
use thiserror::Error;

use crate::registry::ActionError;

/// Errors from provenance graph operations.
#[derive(Error, Debug)]
pub enum ProvenanceError {
    #[error("node already added: {0}")]
    DuplicateNode(NodeId),

    #[error("function already registered: {0}")]
    DuplicateFunction(String),

    #[error("node id not found: {0}")]
    NodeNotFound(NodeId),

    #[error("function '{0}' not found in registry")]
    FunctionNotFound(String),

    #[error("trying to undo an irreversible action: {function} on {node}")]
    IrreversibleAction { node: NodeId, function: String },

    #[error("action function '{function}' failed: {source}")]
    ActionFailed {
        function: String,
        #[source]
        source: ActionError,
    },

    #[error("invalid serialized graph: {0}")]
    InvalidGraph(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for provenance operations
pub type Result<T> = std::result::Result<T, ProvenanceError>;
