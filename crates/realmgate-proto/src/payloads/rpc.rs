//! Remote procedure call payloads.
//!
//! Handled by the dealer role.
//!
//! # Protocol Flow
//!
//! ```text
//! caller            dealer              callee
//!   │                 │   Register        │
//!   │                 │<──────────────────│
//!   │                 │   Registered      │
//!   │                 │──────────────────>│
//!   │  Call           │                   │
//!   │────────────────>│   Invocation      │
//!   │                 │──────────────────>│
//!   │                 │   Yield           │
//!   │  Result         │<──────────────────│
//!   │<────────────────│                   │
//! ```

use serde::{Deserialize, Serialize};

use crate::{Details, Id, Value};

/// Register a procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Register {
    /// Request id chosen by the callee
    pub request_id: Id,
    /// Register options
    #[serde(default)]
    pub options: Details,
    /// Procedure URI
    pub procedure: String,
}

impl Register {
    /// Register with no options.
    pub fn new(request_id: Id, procedure: impl Into<String>) -> Self {
        Self { request_id, options: Details::new(), procedure: procedure.into() }
    }
}

/// Register acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registered {
    /// Request id of the register
    pub request_id: Id,
    /// Registration id assigned by the dealer
    pub registration_id: Id,
}

/// Unregister a procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unregister {
    /// Request id chosen by the callee
    pub request_id: Id,
    /// Registration to drop
    pub registration_id: Id,
}

/// Unregister acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unregistered {
    /// Request id of the unregister
    pub request_id: Id,
}

/// Call a procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Request id chosen by the caller
    pub request_id: Id,
    /// Call options
    #[serde(default)]
    pub options: Details,
    /// Procedure URI
    pub procedure: String,
    /// Positional arguments
    #[serde(default)]
    pub arguments: Vec<Value>,
    /// Keyword arguments
    #[serde(default)]
    pub arguments_kw: Details,
}

impl Call {
    /// Call with no options or arguments.
    pub fn new(request_id: Id, procedure: impl Into<String>) -> Self {
        Self {
            request_id,
            options: Details::new(),
            procedure: procedure.into(),
            arguments: Vec::new(),
            arguments_kw: Details::new(),
        }
    }
}

/// Result of a call, sent to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    /// Request id of the call
    pub request_id: Id,
    /// Result details
    #[serde(default)]
    pub details: Details,
    /// Positional results
    #[serde(default)]
    pub arguments: Vec<Value>,
    /// Keyword results
    #[serde(default)]
    pub arguments_kw: Details,
}

/// Call forwarded to the callee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    /// Request id assigned by the dealer
    pub request_id: Id,
    /// Registration the call matched
    pub registration_id: Id,
    /// Invocation details
    #[serde(default)]
    pub details: Details,
    /// Positional arguments
    #[serde(default)]
    pub arguments: Vec<Value>,
    /// Keyword arguments
    #[serde(default)]
    pub arguments_kw: Details,
}

/// Callee's result for an invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Yield {
    /// Request id of the invocation
    pub request_id: Id,
    /// Yield options
    #[serde(default)]
    pub options: Details,
    /// Positional results
    #[serde(default)]
    pub arguments: Vec<Value>,
    /// Keyword results
    #[serde(default)]
    pub arguments_kw: Details,
}

impl Yield {
    /// Yield with no options or results.
    pub fn new(request_id: Id) -> Self {
        Self {
            request_id,
            options: Details::new(),
            arguments: Vec::new(),
            arguments_kw: Details::new(),
        }
    }
}
