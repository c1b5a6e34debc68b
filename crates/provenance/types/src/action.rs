//! Actions: the recorded cause of every state transition.
//!
//! An action names its do-function (and, when reversible, its undo-function)
//! instead of holding a callable, which is what keeps the history
//! serializable and replayable. Arguments are captured once, at creation
//! time, and cannot be mutated afterwards.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Name under which a function is registered in an action function registry.
pub type FunctionName = String;

/// Immutable snapshot of the positional arguments passed to a do/undo function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Value>", into = "Vec<Value>")]
pub struct ActionArguments(Arc<[Value]>);

impl ActionArguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self(Arc::from(values))
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ActionArguments {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<Value>> for ActionArguments {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl From<ActionArguments> for Vec<Value> {
    fn from(args: ActionArguments) -> Self {
        args.0.to_vec()
    }
}

impl<T: Into<Value>> FromIterator<T> for ActionArguments {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Optional descriptive metadata attached to an action.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMetadata {
    /// Display label for the node this action produces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Open extension map (`tags`, `userIntent`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActionMetadata {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            extra: Map::new(),
        }
    }
}

/// An action with no undo function. Navigating back across it is disallowed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IrreversibleAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ActionMetadata>,
    #[serde(rename = "do")]
    pub do_function: FunctionName,
    #[serde(rename = "doArguments")]
    pub do_arguments: ActionArguments,
}

/// An action whose effect can be reversed by its undo function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReversibleAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ActionMetadata>,
    #[serde(rename = "do")]
    pub do_function: FunctionName,
    #[serde(rename = "doArguments")]
    pub do_arguments: ActionArguments,
    #[serde(rename = "undo")]
    pub undo_function: FunctionName,
    #[serde(rename = "undoArguments")]
    pub undo_arguments: ActionArguments,
}

/// A recorded action, distinguished by whether it can be undone.
///
/// Serialized untagged: the presence of `undo`/`undoArguments` marks a
/// reversible action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Action {
    Reversible(ReversibleAction),
    Irreversible(IrreversibleAction),
}

impl Action {
    pub fn reversible(
        do_function: impl Into<FunctionName>,
        do_arguments: impl Into<ActionArguments>,
        undo_function: impl Into<FunctionName>,
        undo_arguments: impl Into<ActionArguments>,
    ) -> Self {
        Self::Reversible(ReversibleAction {
            metadata: None,
            do_function: do_function.into(),
            do_arguments: do_arguments.into(),
            undo_function: undo_function.into(),
            undo_arguments: undo_arguments.into(),
        })
    }

    pub fn irreversible(
        do_function: impl Into<FunctionName>,
        do_arguments: impl Into<ActionArguments>,
    ) -> Self {
        Self::Irreversible(IrreversibleAction {
            metadata: None,
            do_function: do_function.into(),
            do_arguments: do_arguments.into(),
        })
    }

    /// Attach metadata, replacing any already present.
    pub fn with_metadata(mut self, metadata: ActionMetadata) -> Self {
        match &mut self {
            Self::Reversible(a) => a.metadata = Some(metadata),
            Self::Irreversible(a) => a.metadata = Some(metadata),
        }
        self
    }

    /// Set the display label of the node this action will produce.
    pub fn with_label(self, label: impl Into<String>) -> Self {
        let mut metadata = self.metadata().cloned().unwrap_or_default();
        metadata.label = Some(label.into());
        self.with_metadata(metadata)
    }

    pub fn metadata(&self) -> Option<&ActionMetadata> {
        match self {
            Self::Reversible(a) => a.metadata.as_ref(),
            Self::Irreversible(a) => a.metadata.as_ref(),
        }
    }

    pub fn do_function(&self) -> &str {
        match self {
            Self::Reversible(a) => &a.do_function,
            Self::Irreversible(a) => &a.do_function,
        }
    }

    pub fn do_arguments(&self) -> &ActionArguments {
        match self {
            Self::Reversible(a) => &a.do_arguments,
            Self::Irreversible(a) => &a.do_arguments,
        }
    }

    /// The undo function and its arguments, if the action is reversible.
    pub fn undo(&self) -> Option<(&str, &ActionArguments)> {
        match self {
            Self::Reversible(a) => Some((&a.undo_function, &a.undo_arguments)),
            Self::Irreversible(_) => None,
        }
    }

    pub fn is_reversible(&self) -> bool {
        matches!(self, Self::Reversible(_))
    }

    /// Label for the node produced by this action: the metadata label when
    /// present, otherwise the do-function name.
    pub fn label(&self) -> &str {
        self.metadata()
            .and_then(|m| m.label.as_deref())
            .unwrap_or_else(|| self.do_function())
    }
}
