//! The [`Message`] sum type.

use serde::{Deserialize, Serialize};

use crate::{
    Id, MessageCode,
    payloads::{
        Abort, Authenticate, Call, CallResult, Challenge, ErrorMessage, Event, Goodbye, Hello,
        Invocation, Publish, Published, Register, Registered, Subscribe, Subscribed, Unregister,
        Unregistered, Unsubscribe, Unsubscribed, Welcome, Yield,
    },
};

/// A protocol message exchanged between a peer and its realm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Session open request
    Hello(Hello),
    /// Session admitted
    Welcome(Welcome),
    /// Session rejected
    Abort(Abort),
    /// Authentication challenge
    Challenge(Challenge),
    /// Challenge response
    Authenticate(Authenticate),
    /// Session close
    Goodbye(Goodbye),
    /// Error reply
    Error(ErrorMessage),
    /// Publish an event
    Publish(Publish),
    /// Publish acknowledgement
    Published(Published),
    /// Subscribe to a topic
    Subscribe(Subscribe),
    /// Subscribe acknowledgement
    Subscribed(Subscribed),
    /// Unsubscribe from a topic
    Unsubscribe(Unsubscribe),
    /// Unsubscribe acknowledgement
    Unsubscribed(Unsubscribed),
    /// Event delivery
    Event(Event),
    /// Call a procedure
    Call(Call),
    /// Result of a call
    Result(CallResult),
    /// Register a procedure
    Register(Register),
    /// Register acknowledgement
    Registered(Registered),
    /// Unregister a procedure
    Unregister(Unregister),
    /// Unregister acknowledgement
    Unregistered(Unregistered),
    /// Call forwarded to a callee
    Invocation(Invocation),
    /// Callee's result
    Yield(Yield),
}

impl Message {
    /// Message type code.
    pub fn code(&self) -> MessageCode {
        match self {
            Self::Hello(_) => MessageCode::Hello,
            Self::Welcome(_) => MessageCode::Welcome,
            Self::Abort(_) => MessageCode::Abort,
            Self::Challenge(_) => MessageCode::Challenge,
            Self::Authenticate(_) => MessageCode::Authenticate,
            Self::Goodbye(_) => MessageCode::Goodbye,
            Self::Error(_) => MessageCode::Error,
            Self::Publish(_) => MessageCode::Publish,
            Self::Published(_) => MessageCode::Published,
            Self::Subscribe(_) => MessageCode::Subscribe,
            Self::Subscribed(_) => MessageCode::Subscribed,
            Self::Unsubscribe(_) => MessageCode::Unsubscribe,
            Self::Unsubscribed(_) => MessageCode::Unsubscribed,
            Self::Event(_) => MessageCode::Event,
            Self::Call(_) => MessageCode::Call,
            Self::Result(_) => MessageCode::Result,
            Self::Register(_) => MessageCode::Register,
            Self::Registered(_) => MessageCode::Registered,
            Self::Unregister(_) => MessageCode::Unregister,
            Self::Unregistered(_) => MessageCode::Unregistered,
            Self::Invocation(_) => MessageCode::Invocation,
            Self::Yield(_) => MessageCode::Yield,
        }
    }

    /// Request id carried by the message, if its type has one.
    pub fn request_id(&self) -> Option<Id> {
        match self {
            Self::Error(m) => Some(m.request_id),
            Self::Publish(m) => Some(m.request_id),
            Self::Published(m) => Some(m.request_id),
            Self::Subscribe(m) => Some(m.request_id),
            Self::Subscribed(m) => Some(m.request_id),
            Self::Unsubscribe(m) => Some(m.request_id),
            Self::Unsubscribed(m) => Some(m.request_id),
            Self::Call(m) => Some(m.request_id),
            Self::Result(m) => Some(m.request_id),
            Self::Register(m) => Some(m.request_id),
            Self::Registered(m) => Some(m.request_id),
            Self::Unregister(m) => Some(m.request_id),
            Self::Unregistered(m) => Some(m.request_id),
            Self::Invocation(m) => Some(m.request_id),
            Self::Yield(m) => Some(m.request_id),
            Self::Hello(_)
            | Self::Welcome(_)
            | Self::Abort(_)
            | Self::Challenge(_)
            | Self::Authenticate(_)
            | Self::Goodbye(_)
            | Self::Event(_) => None,
        }
    }

    /// Build an Error reply correlated to this message.
    ///
    /// Messages without a request id correlate with id 0.
    pub fn error_reply(&self, error: impl Into<String>) -> Self {
        Self::Error(ErrorMessage::new(self.code(), self.request_id().unwrap_or(0), error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uri;

    #[test]
    fn error_reply_correlates_to_request() {
        let call = Message::Call(Call::new(77, "com.example.add"));
        let Message::Error(err) = call.error_reply(uri::NO_SUCH_PROCEDURE) else {
            unreachable!("error_reply always builds an Error");
        };

        assert_eq!(err.request_type, MessageCode::Call);
        assert_eq!(err.request_id, 77);
        assert_eq!(err.error, uri::NO_SUCH_PROCEDURE);
    }

    #[test]
    fn error_reply_for_hello_uses_zero_id() {
        let hello = Message::Hello(Hello::new("realm1"));
        let Message::Error(err) = hello.error_reply(uri::PROTOCOL_VIOLATION) else {
            unreachable!("error_reply always builds an Error");
        };

        assert_eq!(err.request_type, MessageCode::Hello);
        assert_eq!(err.request_id, 0);
    }

    #[test]
    fn codes_match_variants() {
        assert_eq!(Message::Yield(Yield::new(1)).code(), MessageCode::Yield);
        assert_eq!(Message::Subscribe(Subscribe::new(1, "t")).code(), MessageCode::Subscribe);
        assert_eq!(Message::Authenticate(Authenticate::new("s")).code(), MessageCode::Authenticate);
    }

    #[test]
    fn handshake_messages_have_no_request_id() {
        assert_eq!(Message::Hello(Hello::new("r")).request_id(), None);
        assert_eq!(Message::Challenge(Challenge::new("ticket")).request_id(), None);
        assert_eq!(Message::Publish(Publish::new(9, "t")).request_id(), Some(9));
    }
}
