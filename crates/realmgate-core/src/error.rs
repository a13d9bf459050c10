//! Realm error types.
//!
//! None of these are fatal. The realm logs every error through its manager
//! before returning it, so callers are free to ignore them or use them to
//! decide whether to drop the transport.

use realmgate_proto::{Id, MessageCode};
use thiserror::Error;

/// Errors produced while handling a session's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RealmError {
    /// Hello from a session that is already a member
    #[error("session {session_id} is already joined to realm '{realm}'")]
    AlreadyJoined {
        /// Offending session
        session_id: Id,
        /// Realm it is joined to
        realm: String,
    },

    /// None of the advertised authentication methods is supported
    #[error("session {session_id} offered no supported authentication method: {offered:?}")]
    NoMatchingAuthMethod {
        /// Session left waiting for a challenge
        session_id: Id,
        /// Methods the peer advertised
        offered: Vec<String>,
    },

    /// Provider rejected the signature
    #[error("authentication failed for session {session_id}")]
    AuthenticationFailed {
        /// Session whose signature was rejected
        session_id: Id,
    },

    /// Authenticate from a session without an authentication provider
    #[error("session {session_id} has no authentication provider")]
    MissingAuthProvider {
        /// Session that sent Authenticate
        session_id: Id,
    },

    /// Non-handshake message before the session authenticated
    #[error("session {session_id} sent {code} before authenticating")]
    NotAuthenticated {
        /// Offending session
        session_id: Id,
        /// Code of the rejected message
        code: MessageCode,
    },

    /// Realm does not exist and the registry does not create realms on demand
    #[error("no such realm: {0}")]
    NoSuchRealm(String),

    /// Session has not joined any realm
    #[error("session {0} has not joined a realm")]
    NotJoined(Id),
}
