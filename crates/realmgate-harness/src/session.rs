//! In-memory session.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use realmgate_core::{AuthProvider, Session, SessionRef, SessionState};
use realmgate_proto::{Id, Message};

/// Session that records every message sent to it.
pub struct MemorySession {
    id: Id,
    authenticated: AtomicBool,
    state: Mutex<SessionState>,
    realm: Mutex<Option<String>>,
    provider: Option<Arc<dyn AuthProvider>>,
    outbox: Mutex<Vec<Message>>,
}

impl MemorySession {
    /// Session without an authentication provider.
    pub fn new(id: Id) -> Arc<Self> {
        Self::build(id, None)
    }

    /// Session whose transport requires authentication through `provider`.
    pub fn with_provider(id: Id, provider: Arc<dyn AuthProvider>) -> Arc<Self> {
        Self::build(id, Some(provider))
    }

    fn build(id: Id, provider: Option<Arc<dyn AuthProvider>>) -> Arc<Self> {
        Arc::new(Self {
            id,
            authenticated: AtomicBool::new(false),
            state: Mutex::new(SessionState::Down),
            realm: Mutex::new(None),
            provider,
            outbox: Mutex::new(Vec::new()),
        })
    }

    /// Shared handle for passing to a realm.
    pub fn handle(self: &Arc<Self>) -> SessionRef {
        Arc::clone(self) as SessionRef
    }

    /// Drain the messages sent so far.
    pub fn take_messages(&self) -> Vec<Message> {
        std::mem::take(&mut *self.outbox.lock())
    }

    /// Number of messages waiting in the outbox.
    pub fn pending(&self) -> usize {
        self.outbox.lock().len()
    }
}

impl Session for MemorySession {
    fn session_id(&self) -> Id {
        self.id
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }

    fn state(&self) -> SessionState {
        *self.state.lock()
    }

    fn set_state(&self, state: SessionState) {
        *self.state.lock() = state;
    }

    fn realm(&self) -> Option<String> {
        self.realm.lock().clone()
    }

    fn set_realm(&self, realm: &str) {
        *self.realm.lock() = Some(realm.to_string());
    }

    fn auth_provider(&self) -> Option<Arc<dyn AuthProvider>> {
        self.provider.clone()
    }

    fn send_message(&self, message: Message) {
        self.outbox.lock().push(message);
    }
}
