//! Log and introspection sink.
//!
//! The manager receives the realm's debug and error events and hosts named
//! introspection callables. [`TracingManager`] is the default: it forwards
//! log events to `tracing` and keeps callables in memory.

use std::{collections::BTreeMap, fmt, sync::Arc};

use parking_lot::RwLock;
use realmgate_proto::Value;

/// Introspection callable. Produces a fresh value each time it is invoked.
pub type Callable = Arc<dyn Fn() -> Value + Send + Sync>;

/// Log and introspection sink shared by a realm and its roles.
pub trait Manager: Send + Sync {
    /// Record a debug event.
    fn log_debug(&self, message: &str);

    /// Record an error event.
    fn log_error(&self, message: &str);

    /// Register (or replace) the callable at `path`.
    fn add_callable(&self, path: &str, callable: Callable);
}

/// Manager that logs through `tracing` and stores callables in memory.
#[derive(Default)]
pub struct TracingManager {
    callables: RwLock<BTreeMap<String, Callable>>,
}

impl TracingManager {
    /// Create a manager with no callables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke the callable registered at `path`.
    pub fn call(&self, path: &str) -> Option<Value> {
        let callable = self.callables.read().get(path).cloned()?;
        Some(callable())
    }

    /// Registered callable paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.callables.read().keys().cloned().collect()
    }
}

impl Manager for TracingManager {
    fn log_debug(&self, message: &str) {
        tracing::debug!(target: "realmgate::manager", "{message}");
    }

    fn log_error(&self, message: &str) {
        tracing::error!(target: "realmgate::manager", "{message}");
    }

    fn add_callable(&self, path: &str, callable: Callable) {
        tracing::trace!(target: "realmgate::manager", path, "callable registered");
        self.callables.write().insert(path.to_string(), callable);
    }
}

impl fmt::Debug for TracingManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingManager").field("paths", &self.paths()).finish()
    }
}
