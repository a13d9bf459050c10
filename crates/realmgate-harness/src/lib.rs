//! Deterministic test harness for realmgate realms.
//!
//! In-memory implementations of the collaborators a realm consumes (sessions,
//! authentication providers, the manager sink) plus a probe role and a
//! reference model for model-based testing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod manager;
pub mod model;
pub mod probe;
pub mod session;

pub use auth::StaticAuthProvider;
pub use manager::RecordingManager;
pub use model::{ModelRealm, Operation, OperationResult};
pub use probe::{ProbeEvent, ProbeJournal, ProbeRole};
pub use session::MemorySession;

use realmgate_proto::{Details, Value};

/// Install a `tracing` subscriber for tests.
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}

/// Render a details dictionary as sorted `key: value` lines.
///
/// Nested maps render their keys in brackets, so the capability set reads as
/// `roles: [broker, dealer]`.
pub fn render_details(details: &Details) -> String {
    details
        .iter()
        .map(|(key, value)| format!("{key}: {}", render_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Integer(int) => i128::from(*int).to_string(),
        Value::Map(entries) => {
            let keys: Vec<String> = entries.iter().map(|(key, _)| render_value(key)).collect();
            format!("[{}]", keys.join(", "))
        },
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(render_value).collect();
            format!("({})", items.join(", "))
        },
        Value::Null => "null".to_string(),
        other => format!("{other:?}"),
    }
}
