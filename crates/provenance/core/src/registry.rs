//! Action function registry: name → callable resolution.
//!
//! Actions store function *names*; the registry resolves them at call time.
//! A function may be registered with a bound context, which is handed to it
//! on every invocation as its receiver.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{ProvenanceError, Result};

/// Error type returned by do/undo functions; passed through untouched.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Receiver bound to a function at registration time.
pub type BoundContext = Arc<dyn Any + Send + Sync>;

/// A do/undo function callable by name.
#[async_trait]
pub trait ActionFunction: Send + Sync {
    async fn call(
        &self,
        context: Option<&BoundContext>,
        args: &[Value],
    ) -> std::result::Result<Value, ActionError>;
}

/// Adapter for plain async closures taking the positional arguments.
pub struct FnAction<F> {
    func: F,
}

/// Wrap an async closure as an [`ActionFunction`]. Any bound context is ignored.
pub fn action_fn<F, Fut>(func: F) -> FnAction<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Value, ActionError>> + Send,
{
    FnAction { func }
}

#[async_trait]
impl<F, Fut> ActionFunction for FnAction<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Value, ActionError>> + Send,
{
    async fn call(
        &self,
        _context: Option<&BoundContext>,
        args: &[Value],
    ) -> std::result::Result<Value, ActionError> {
        (self.func)(args.to_vec()).await
    }
}

/// Adapter for async closures that receive their bound context as `Arc<T>`.
pub struct ContextFnAction<T, F> {
    func: F,
    _context: PhantomData<fn() -> T>,
}

/// Wrap an async closure that expects a bound context of type `T`.
///
/// Invocation fails if the function was registered without a context or
/// with one of a different type.
pub fn context_fn<T, F, Fut>(func: F) -> ContextFnAction<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(Arc<T>, Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Value, ActionError>> + Send,
{
    ContextFnAction {
        func,
        _context: PhantomData,
    }
}

#[async_trait]
impl<T, F, Fut> ActionFunction for ContextFnAction<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(Arc<T>, Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Value, ActionError>> + Send,
{
    async fn call(
        &self,
        context: Option<&BoundContext>,
        args: &[Value],
    ) -> std::result::Result<Value, ActionError> {
        let receiver = context
            .cloned()
            .ok_or("function requires a bound context")?
            .downcast::<T>()
            .map_err(|_| "bound context has an unexpected type")?;
        (self.func)(receiver, args.to_vec()).await
    }
}

/// A registered function together with its bound context.
#[derive(Clone)]
pub struct RegisteredFunction {
    pub func: Arc<dyn ActionFunction>,
    pub bound_context: Option<BoundContext>,
}

impl RegisteredFunction {
    pub async fn invoke(&self, args: &[Value]) -> std::result::Result<Value, ActionError> {
        self.func.call(self.bound_context.as_ref(), args).await
    }
}

impl std::fmt::Debug for RegisteredFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredFunction")
            .field("bound", &self.bound_context.is_some())
            .finish()
    }
}

/// Registry of do/undo functions, keyed by name.
///
/// Registration normally happens once during setup; lookups are reads.
#[derive(Default)]
pub struct ActionFunctionRegistry {
    functions: DashMap<String, RegisteredFunction>,
}

impl ActionFunctionRegistry {
    pub fn new() -> Self {
        Self {
            functions: DashMap::new(),
        }
    }

    /// Register a function under `name`. Fails if the name is taken.
    pub fn register<F>(
        &self,
        name: impl Into<String>,
        func: F,
        bound_context: Option<BoundContext>,
    ) -> Result<()>
    where
        F: ActionFunction + 'static,
    {
        let name = name.into();
        match self.functions.entry(name.clone()) {
            Entry::Occupied(_) => Err(ProvenanceError::DuplicateFunction(name)),
            Entry::Vacant(slot) => {
                slot.insert(RegisteredFunction {
                    func: Arc::new(func),
                    bound_context,
                });
                tracing::debug!(function = %name, "Action function registered");
                Ok(())
            }
        }
    }

    /// Register a plain async closure without a bound context.
    pub fn register_fn<F, Fut>(&self, name: impl Into<String>, func: F) -> Result<()>
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Value, ActionError>> + Send + 'static,
    {
        self.register(name, action_fn(func), None)
    }

    /// Register an async closure bound to `context`.
    pub fn register_bound<T, F, Fut>(
        &self,
        name: impl Into<String>,
        context: Arc<T>,
        func: F,
    ) -> Result<()>
    where
        T: Send + Sync + 'static,
        F: Fn(Arc<T>, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Value, ActionError>> + Send + 'static,
    {
        let context: BoundContext = context;
        self.register(name, context_fn(func), Some(context))
    }

    pub fn get_function_by_name(&self, name: &str) -> Result<RegisteredFunction> {
        self.functions
            .get(name)
            .map(|f| f.value().clone())
            .ok_or_else(|| ProvenanceError::FunctionNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.iter().map(|f| f.key().clone()).collect();
        names.sort();
        names
    }
}
