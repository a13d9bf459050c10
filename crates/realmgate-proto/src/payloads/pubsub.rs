//! Publish/subscribe payloads.
//!
//! Handled by the broker role. Topics are plain URIs; matching is exact.

use serde::{Deserialize, Serialize};

use crate::{Details, Id, Value};

/// Publish an event to a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publish {
    /// Request id chosen by the publisher
    pub request_id: Id,
    /// Publish options (`acknowledge`, ...)
    #[serde(default)]
    pub options: Details,
    /// Topic URI
    pub topic: String,
    /// Positional arguments
    #[serde(default)]
    pub arguments: Vec<Value>,
    /// Keyword arguments
    #[serde(default)]
    pub arguments_kw: Details,
}

impl Publish {
    /// Publish with no options or arguments.
    pub fn new(request_id: Id, topic: impl Into<String>) -> Self {
        Self {
            request_id,
            options: Details::new(),
            topic: topic.into(),
            arguments: Vec::new(),
            arguments_kw: Details::new(),
        }
    }

    /// Whether the publisher asked for a Published acknowledgement.
    pub fn acknowledge(&self) -> bool {
        super::flag(&self.options, "acknowledge")
    }
}

/// Acknowledgement of an acknowledged publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Published {
    /// Request id of the publish
    pub request_id: Id,
    /// Publication id assigned by the broker
    pub publication_id: Id,
}

/// Subscribe to a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscribe {
    /// Request id chosen by the subscriber
    pub request_id: Id,
    /// Subscribe options
    #[serde(default)]
    pub options: Details,
    /// Topic URI
    pub topic: String,
}

impl Subscribe {
    /// Subscribe with no options.
    pub fn new(request_id: Id, topic: impl Into<String>) -> Self {
        Self { request_id, options: Details::new(), topic: topic.into() }
    }
}

/// Subscribe acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscribed {
    /// Request id of the subscribe
    pub request_id: Id,
    /// Subscription id assigned by the broker
    pub subscription_id: Id,
}

/// Unsubscribe from a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unsubscribe {
    /// Request id chosen by the subscriber
    pub request_id: Id,
    /// Subscription to drop
    pub subscription_id: Id,
}

/// Unsubscribe acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unsubscribed {
    /// Request id of the unsubscribe
    pub request_id: Id,
}

/// Event delivered to a subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Subscription the event matched
    pub subscription_id: Id,
    /// Publication id assigned by the broker
    pub publication_id: Id,
    /// Event details
    #[serde(default)]
    pub details: Details,
    /// Positional arguments
    #[serde(default)]
    pub arguments: Vec<Value>,
    /// Keyword arguments
    #[serde(default)]
    pub arguments_kw: Details,
}
