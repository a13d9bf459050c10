//! Session and authentication provider contracts.
//!
//! A session is owned by the transport that accepted the peer. The realm only
//! holds shared handles to it ([`SessionRef`]), so every method takes `&self`
//! and implementations use interior mutability.

use std::sync::Arc;

use realmgate_proto::{Id, Message};

/// Shared handle to a session.
pub type SessionRef = Arc<dyn Session>;

/// Lifecycle state of a session as seen by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Transport is up, not joined to any realm
    #[default]
    Down,
    /// Joined to a realm (authenticated or not)
    Up,
}

/// One connected peer.
///
/// `session_id` identifies the session: two handles with the same id refer to
/// the same peer.
pub trait Session: Send + Sync {
    /// Stable session identifier.
    fn session_id(&self) -> Id;

    /// Whether the handshake has completed.
    fn is_authenticated(&self) -> bool;

    /// Record handshake completion (or reset it on departure).
    fn set_authenticated(&self, authenticated: bool);

    /// Current lifecycle state.
    fn state(&self) -> SessionState;

    /// Update the lifecycle state.
    fn set_state(&self, state: SessionState);

    /// Name of the realm the session joined, if any.
    fn realm(&self) -> Option<String>;

    /// Record the realm the session joined.
    fn set_realm(&self, realm: &str);

    /// Authentication provider configured for this session's transport.
    ///
    /// Sessions without a provider are admitted on Hello without a challenge.
    fn auth_provider(&self) -> Option<Arc<dyn AuthProvider>>;

    /// Deliver a message to the peer.
    ///
    /// Called while the realm is locked, so implementations must queue the
    /// message rather than call back into the realm.
    fn send_message(&self, message: Message);
}

/// Verifies a peer's identity during the handshake.
pub trait AuthProvider: Send + Sync {
    /// Whether this provider can run the given authentication method.
    fn supports(&self, method: &str) -> bool;

    /// Check the signature from the peer's Authenticate message.
    fn authenticate(&self, signature: &str) -> bool;

    /// Authenticated identity, reported as `authid` in Welcome.
    fn authentication_id(&self) -> String;

    /// Method that was used, reported as `authmethod` in Welcome.
    fn authentication_method(&self) -> String;

    /// Role granted to the peer, reported as `authrole` in Welcome.
    fn authentication_role(&self) -> String;
}
