//! Handshake and session-level payloads.

use serde::{Deserialize, Serialize};

use crate::{Details, Id, MessageCode, Value};

/// Session open request
///
/// # Protocol Flow
///
/// First message a peer sends after the transport is up. Names the realm to
/// join and lists the authentication methods the peer is willing to use, in
/// order of preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hello {
    /// Realm the peer wants to join
    pub realm: String,
    /// Authentication methods offered by the peer, most preferred first
    #[serde(default)]
    pub auth_methods: Vec<String>,
    /// Remaining hello details (client roles, agent string, ...)
    #[serde(default)]
    pub details: Details,
}

impl Hello {
    /// Hello with no authentication methods.
    pub fn new(realm: impl Into<String>) -> Self {
        Self { realm: realm.into(), auth_methods: Vec::new(), details: Details::new() }
    }

    /// Hello advertising the given authentication methods.
    pub fn with_auth_methods<I, S>(realm: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            realm: realm.into(),
            auth_methods: methods.into_iter().map(Into::into).collect(),
            details: Details::new(),
        }
    }
}

/// Session admitted
///
/// Carries the session identifier and a details dictionary. The details
/// always contain a `roles` entry listing the roles the realm offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Welcome {
    /// Session identifier issued by the router
    pub session_id: Id,
    /// Welcome details (`roles`, and `authid`/`authmethod`/`authrole` when
    /// authenticated)
    pub details: Details,
}

/// Session rejected during the handshake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Abort {
    /// Additional details
    #[serde(default)]
    pub details: Details,
    /// Reason URI
    pub reason: String,
}

impl Abort {
    /// Abort with the given reason and no details.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { details: Details::new(), reason: reason.into() }
    }
}

/// Authentication challenge sent by the router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    /// Method chosen from the peer's advertised list
    pub auth_method: String,
    /// Method-specific challenge data
    #[serde(default)]
    pub extra: Details,
}

impl Challenge {
    /// Challenge for the given method with no extra data.
    pub fn new(auth_method: impl Into<String>) -> Self {
        Self { auth_method: auth_method.into(), extra: Details::new() }
    }
}

/// Peer's response to a challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authenticate {
    /// Signature or ticket proving the peer's identity
    pub signature: String,
    /// Method-specific extra data
    #[serde(default)]
    pub extra: Details,
}

impl Authenticate {
    /// Authenticate with the given signature.
    pub fn new(signature: impl Into<String>) -> Self {
        Self { signature: signature.into(), extra: Details::new() }
    }
}

/// Session close, in either direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goodbye {
    /// Additional details
    #[serde(default)]
    pub details: Details,
    /// Reason URI
    pub reason: String,
}

impl Goodbye {
    /// Goodbye with the given reason and no details.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { details: Details::new(), reason: reason.into() }
    }
}

/// Error reply correlated to a request
///
/// `request_type` and `request_id` identify the message this error answers.
/// Messages that carry no request id (such as Hello) correlate with id 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Code of the message being answered
    pub request_type: MessageCode,
    /// Request id of the message being answered
    pub request_id: Id,
    /// Additional details
    #[serde(default)]
    pub details: Details,
    /// Error URI
    pub error: String,
    /// Positional arguments
    #[serde(default)]
    pub arguments: Vec<Value>,
    /// Keyword arguments
    #[serde(default)]
    pub arguments_kw: Details,
}

impl ErrorMessage {
    /// Error answering the given request.
    pub fn new(request_type: MessageCode, request_id: Id, error: impl Into<String>) -> Self {
        Self {
            request_type,
            request_id,
            details: Details::new(),
            error: error.into(),
            arguments: Vec::new(),
            arguments_kw: Details::new(),
        }
    }
}
