//! Numeric message codes.
//!
//! Codes follow the WAMP v2 numbering so that a transport can map them
//! directly onto the first element of a message array.

use std::fmt;

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::ProtocolError;

/// Message type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize_repr, Deserialize_repr)]
#[repr(u16)]
pub enum MessageCode {
    /// Session open request
    Hello = 1,
    /// Session admitted
    Welcome = 2,
    /// Session rejected before admission
    Abort = 3,
    /// Authentication challenge
    Challenge = 4,
    /// Challenge response
    Authenticate = 5,
    /// Session close
    Goodbye = 6,
    /// Error reply to a request
    Error = 8,
    /// Publish an event
    Publish = 16,
    /// Publish acknowledgement
    Published = 17,
    /// Subscribe to a topic
    Subscribe = 32,
    /// Subscribe acknowledgement
    Subscribed = 33,
    /// Unsubscribe from a topic
    Unsubscribe = 34,
    /// Unsubscribe acknowledgement
    Unsubscribed = 35,
    /// Event delivered to a subscriber
    Event = 36,
    /// Call a procedure
    Call = 48,
    /// Result of a call
    Result = 50,
    /// Register a procedure
    Register = 64,
    /// Register acknowledgement
    Registered = 65,
    /// Unregister a procedure
    Unregister = 66,
    /// Unregister acknowledgement
    Unregistered = 67,
    /// Call forwarded to a callee
    Invocation = 68,
    /// Callee's result for an invocation
    Yield = 70,
}

impl MessageCode {
    /// Raw numeric value.
    pub fn to_u16(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for MessageCode {
    type Error = ProtocolError;

    fn try_from(value: u16) -> Result<Self, ProtocolError> {
        let code = match value {
            1 => Self::Hello,
            2 => Self::Welcome,
            3 => Self::Abort,
            4 => Self::Challenge,
            5 => Self::Authenticate,
            6 => Self::Goodbye,
            8 => Self::Error,
            16 => Self::Publish,
            17 => Self::Published,
            32 => Self::Subscribe,
            33 => Self::Subscribed,
            34 => Self::Unsubscribe,
            35 => Self::Unsubscribed,
            36 => Self::Event,
            48 => Self::Call,
            50 => Self::Result,
            64 => Self::Register,
            65 => Self::Registered,
            66 => Self::Unregister,
            67 => Self::Unregistered,
            68 => Self::Invocation,
            70 => Self::Yield,
            other => return Err(ProtocolError::UnknownMessageCode(other)),
        };
        Ok(code)
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}({})", self.to_u16())
    }
}
