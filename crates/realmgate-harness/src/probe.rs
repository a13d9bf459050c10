//! Probe role that records how the realm drives it.
//!
//! Several probes can share one [`ProbeJournal`], so tests can assert on the
//! relative order in which the realm consulted them.

use std::sync::Arc;

use parking_lot::Mutex;
use realmgate_core::{Manager, Role, SessionRef};
use realmgate_proto::{Id, Message, MessageCode};

/// One interaction between the realm and a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    /// `handles_message` was asked about a message
    Offered {
        /// Probe name
        role: String,
        /// Code of the offered message
        code: MessageCode,
    },
    /// `on_message` received a message
    Handled {
        /// Probe name
        role: String,
        /// Code of the handled message
        code: MessageCode,
    },
    /// `leave` was called for a session
    Left {
        /// Probe name
        role: String,
        /// Departing session
        session_id: Id,
    },
    /// `set_manager` was called
    ManagerSet {
        /// Probe name
        role: String,
    },
}

/// Shared, ordered record of probe events.
#[derive(Debug, Clone, Default)]
pub struct ProbeJournal {
    events: Arc<Mutex<Vec<ProbeEvent>>>,
}

impl ProbeJournal {
    /// Empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far.
    pub fn events(&self) -> Vec<ProbeEvent> {
        self.events.lock().clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn record(&self, event: ProbeEvent) {
        self.events.lock().push(event);
    }
}

/// Role that claims a fixed set of message codes and journals every call.
pub struct ProbeRole {
    name: String,
    claims: Vec<MessageCode>,
    journal: ProbeJournal,
}

impl ProbeRole {
    /// Probe named `name` claiming messages whose code is in `claims`.
    pub fn new(name: impl Into<String>, claims: &[MessageCode], journal: &ProbeJournal) -> Self {
        Self { name: name.into(), claims: claims.to_vec(), journal: journal.clone() }
    }

    /// Boxed, ready for `Realm::with_roles`.
    pub fn boxed(
        name: impl Into<String>,
        claims: &[MessageCode],
        journal: &ProbeJournal,
    ) -> Box<dyn Role> {
        Box::new(Self::new(name, claims, journal))
    }
}

impl Role for ProbeRole {
    fn name(&self) -> &str {
        &self.name
    }

    fn handles_message(&self, message: &Message) -> bool {
        let code = message.code();
        self.journal.record(ProbeEvent::Offered { role: self.name.clone(), code });
        self.claims.contains(&code)
    }

    fn on_message(&mut self, _session: &SessionRef, message: Message) {
        self.journal.record(ProbeEvent::Handled { role: self.name.clone(), code: message.code() });
    }

    fn leave(&mut self, session: &SessionRef) {
        self.journal.record(ProbeEvent::Left {
            role: self.name.clone(),
            session_id: session.session_id(),
        });
    }

    fn set_manager(&mut self, _manager: Arc<dyn Manager>) {
        self.journal.record(ProbeEvent::ManagerSet { role: self.name.clone() });
    }
}
