//! Shared fixtures for the provenance scenario and property tests.
//!
//! The fixture application is a calculator holding a single integer. Its
//! functions log every call so tests can assert exactly which do/undo
//! functions a traversal replayed, and in what order.

use parking_lot::Mutex;
use provenance_core::{
    ActionFunctionRegistry, ProvenanceGraph, ProvenanceGraphTraverser, ProvenanceTracker, Result,
    TrackerConfig, TraverserConfig,
};
use provenance_types::{Action, Application};
use serde_json::{json, Value};
use std::sync::Arc;

/// Starting value of every fixture calculator.
pub const START: i64 = 42;

/// External state mutated by the registered functions.
pub struct Calculator {
    offset: Mutex<i64>,
    calls: Mutex<Vec<String>>,
}

impl Calculator {
    pub fn new(start: i64) -> Self {
        Self {
            offset: Mutex::new(start),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn offset(&self) -> i64 {
        *self.offset.lock()
    }

    /// Drain the call log, e.g. `["subtract(13)", "add(2)"]`.
    pub fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock())
    }

    fn apply(&self, name: &str, y: i64, update: impl FnOnce(i64) -> i64) -> Value {
        self.calls.lock().push(format!("{}({})", name, y));
        let mut offset = self.offset.lock();
        *offset = update(*offset);
        let value = *offset;
        json!(value)
    }
}

fn first_int(args: &[Value]) -> i64 {
    args.first().and_then(Value::as_i64).unwrap_or_default()
}

/// Register `add`, `subtract` and the irreversible `reset` bound to `calc`.
pub fn register_calculator(registry: &ActionFunctionRegistry, calc: Arc<Calculator>) -> Result<()> {
    registry.register_bound("add", calc.clone(), |c: Arc<Calculator>, args| async move {
        let y = first_int(&args);
        Ok(c.apply("add", y, |x| x + y))
    })?;
    registry.register_bound("subtract", calc.clone(), |c: Arc<Calculator>, args| async move {
        let y = first_int(&args);
        Ok(c.apply("subtract", y, |x| x - y))
    })?;
    registry.register_bound("reset", calc, |c: Arc<Calculator>, args| async move {
        let y = first_int(&args);
        Ok(c.apply("reset", y, |_| y))
    })?;
    Ok(())
}

pub fn add(n: i64) -> Action {
    Action::reversible("add", vec![json!(n)], "subtract", vec![json!(n)]).with_label(format!("add {}", n))
}

pub fn subtract(n: i64) -> Action {
    Action::reversible("subtract", vec![json!(n)], "add", vec![json!(n)])
        .with_label(format!("subtract {}", n))
}

pub fn reset(n: i64) -> Action {
    Action::irreversible("reset", vec![json!(n)])
}

/// A calculator wired to a graph, tracker and traverser.
pub struct Harness {
    pub calc: Arc<Calculator>,
    pub registry: Arc<ActionFunctionRegistry>,
    pub graph: ProvenanceGraph,
    pub tracker: Arc<ProvenanceTracker>,
    pub traverser: ProvenanceGraphTraverser,
}

impl Harness {
    pub fn new() -> Result<Self> {
        Self::with_traverser_config(TraverserConfig::default())
    }

    pub fn with_traverser_config(config: TraverserConfig) -> Result<Self> {
        let calc = Arc::new(Calculator::new(START));
        let registry = Arc::new(ActionFunctionRegistry::new());
        register_calculator(&registry, calc.clone())?;

        let graph = ProvenanceGraph::with_user(Application::new("calculator", "1.0.0"), "tester");
        let tracker = Arc::new(ProvenanceTracker::new(
            registry.clone(),
            graph.clone(),
            TrackerConfig::default().with_username("tester"),
        ));
        let traverser = ProvenanceGraphTraverser::new(registry.clone(), graph.clone(), config)
            .with_tracker(tracker.clone());

        Ok(Self {
            calc,
            registry,
            graph,
            tracker,
            traverser,
        })
    }

    pub fn offset(&self) -> i64 {
        self.calc.offset()
    }

    pub fn take_calls(&self) -> Vec<String> {
        self.calc.take_calls()
    }
}
