//! Manager that records everything it receives.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use realmgate_core::{Callable, Manager};
use realmgate_proto::Value;

/// Manager sink for assertions on logging and introspection wiring.
#[derive(Default)]
pub struct RecordingManager {
    debug: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    /// Every `add_callable` path, in call order (duplicates kept)
    registrations: Mutex<Vec<String>>,
    callables: Mutex<BTreeMap<String, Callable>>,
}

impl RecordingManager {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Debug lines logged so far.
    pub fn debug_lines(&self) -> Vec<String> {
        self.debug.lock().clone()
    }

    /// Error lines logged so far.
    pub fn error_lines(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    /// Paths passed to `add_callable`, in call order.
    pub fn callable_registrations(&self) -> Vec<String> {
        self.registrations.lock().clone()
    }

    /// Invoke the callable currently registered at `path`.
    pub fn call(&self, path: &str) -> Option<Value> {
        let callable = self.callables.lock().get(path).cloned()?;
        Some(callable())
    }
}

impl Manager for RecordingManager {
    fn log_debug(&self, message: &str) {
        self.debug.lock().push(message.to_string());
    }

    fn log_error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }

    fn add_callable(&self, path: &str, callable: Callable) {
        self.registrations.lock().push(path.to_string());
        self.callables.lock().insert(path.to_string(), callable);
    }
}
