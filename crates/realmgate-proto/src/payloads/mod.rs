//! Typed message payloads.
//!
//! Payloads are grouped by the part of the protocol they serve:
//! - [`session`]: handshake and session close
//! - [`pubsub`]: publish/subscribe (handled by the broker role)
//! - [`rpc`]: remote procedure calls (handled by the dealer role)

use std::collections::BTreeMap;

use crate::Value;

pub mod pubsub;
pub mod rpc;
pub mod session;

pub use pubsub::{Event, Publish, Published, Subscribe, Subscribed, Unsubscribe, Unsubscribed};
pub use rpc::{
    Call, CallResult, Invocation, Register, Registered, Unregister, Unregistered, Yield,
};
pub use session::{Abort, Authenticate, Challenge, ErrorMessage, Goodbye, Hello, Welcome};

/// Dictionary of options or details attached to a message.
///
/// Ordered so that snapshots and comparisons are deterministic.
pub type Details = BTreeMap<String, Value>;

/// Read a boolean flag out of a details dictionary.
///
/// Missing keys and non-boolean values read as `false`.
pub fn flag(details: &Details, key: &str) -> bool {
    matches!(details.get(key), Some(Value::Bool(true)))
}

/// Convert a details dictionary into a CBOR map value.
pub fn to_value(details: Details) -> Value {
    Value::Map(details.into_iter().map(|(k, v)| (Value::Text(k), v)).collect())
}
