//! In-crate session double for unit tests.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use realmgate_proto::{Id, Message};

use crate::session::{AuthProvider, Session, SessionRef, SessionState};

pub(crate) struct TestSession {
    id: Id,
    authenticated: AtomicBool,
    state: Mutex<SessionState>,
    realm: Mutex<Option<String>>,
    outbox: Mutex<Vec<Message>>,
}

impl TestSession {
    pub(crate) fn new(id: Id) -> Arc<Self> {
        Arc::new(Self {
            id,
            authenticated: AtomicBool::new(false),
            state: Mutex::new(SessionState::Down),
            realm: Mutex::new(None),
            outbox: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn handle(self: &Arc<Self>) -> SessionRef {
        Arc::clone(self) as SessionRef
    }

    pub(crate) fn take(&self) -> Vec<Message> {
        std::mem::take(&mut *self.outbox.lock())
    }
}

impl Session for TestSession {
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
        None
    }

    fn send_message(&self, message: Message) {
        self.outbox.lock().push(message);
    }
}
