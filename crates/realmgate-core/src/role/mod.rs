//! Roles: the protocol slices a realm routes messages to.
//!
//! A realm owns an ordered list of roles. For every message from an
//! authenticated session it asks each role in turn whether it handles the
//! message; the first one that does receives it and the scan stops.
//!
//! - [`Broker`]: publish/subscribe
//! - [`Dealer`]: remote procedure calls

use std::{collections::BTreeMap, sync::Arc};

use parking_lot::RwLock;
use realmgate_proto::{Id, Message, Value};

use crate::{manager::Manager, session::SessionRef};

mod broker;
mod dealer;

pub use broker::Broker;
pub use dealer::Dealer;

/// A handler capability attached to a realm.
pub trait Role: Send {
    /// Role name advertised to peers in Welcome (`broker`, `dealer`, ...).
    fn name(&self) -> &str;

    /// Whether this role processes the message.
    fn handles_message(&self, message: &Message) -> bool;

    /// Process a message this role claimed.
    fn on_message(&mut self, session: &SessionRef, message: Message);

    /// Release everything attached to a departing session.
    fn leave(&mut self, session: &SessionRef);

    /// Replace the log sink.
    fn set_manager(&mut self, manager: Arc<dyn Manager>);

    /// Procedure registrations held by this role, for introspection.
    fn registrations(&self) -> Option<Registrations> {
        None
    }
}

/// Monotonic id source, starting at 1.
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    last: Id,
}

impl IdGenerator {
    pub(crate) fn next_id(&mut self) -> Id {
        self.last += 1;
        self.last
    }
}

/// Read-only view of one registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationInfo {
    /// Registration id assigned by the dealer
    pub registration_id: Id,
    /// Procedure URI
    pub procedure: String,
    /// Session that will execute the procedure
    pub session_id: Id,
}

impl RegistrationInfo {
    fn to_value(&self) -> Value {
        Value::Map(vec![
            (Value::Text("id".into()), Value::Integer(self.registration_id.into())),
            (Value::Text("procedure".into()), Value::Text(self.procedure.clone())),
            (Value::Text("session".into()), Value::Integer(self.session_id.into())),
        ])
    }
}

pub(crate) struct RegisteredProcedure {
    pub(crate) procedure: String,
    pub(crate) callee: SessionRef,
}

/// Shared handle to a dealer's registration table.
///
/// The dealer mutates the table while handling messages; introspection reads
/// snapshots of it from outside the realm.
#[derive(Clone, Default)]
pub struct Registrations {
    table: Arc<RwLock<BTreeMap<Id, RegisteredProcedure>>>,
}

impl Registrations {
    /// Current registrations ordered by registration id.
    pub fn snapshot(&self) -> Vec<RegistrationInfo> {
        self.table
            .read()
            .iter()
            .map(|(id, entry)| RegistrationInfo {
                registration_id: *id,
                procedure: entry.procedure.clone(),
                session_id: entry.callee.session_id(),
            })
            .collect()
    }

    /// Snapshot as an introspection value: an array of
    /// `{id, procedure, session}` maps.
    pub fn to_value(&self) -> Value {
        Value::Array(self.snapshot().iter().map(RegistrationInfo::to_value).collect())
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    pub(crate) fn insert(&self, id: Id, procedure: String, callee: SessionRef) {
        self.table.write().insert(id, RegisteredProcedure { procedure, callee });
    }

    pub(crate) fn remove(&self, id: Id) -> Option<RegisteredProcedure> {
        self.table.write().remove(&id)
    }

    pub(crate) fn find(&self, procedure: &str) -> Option<(Id, SessionRef)> {
        self.table
            .read()
            .iter()
            .find(|(_, entry)| entry.procedure == procedure)
            .map(|(id, entry)| (*id, Arc::clone(&entry.callee)))
    }

    pub(crate) fn owner(&self, id: Id) -> Option<Id> {
        self.table.read().get(&id).map(|entry| entry.callee.session_id())
    }

    /// Drop every registration owned by `session_id`, returning how many went.
    pub(crate) fn remove_session(&self, session_id: Id) -> usize {
        let mut table = self.table.write();
        let before = table.len();
        table.retain(|_, entry| entry.callee.session_id() != session_id);
        before - table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_generator_starts_at_one() {
        let mut ids = IdGenerator::default();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
    }

    #[test]
    fn empty_registrations_snapshot_is_empty_array() {
        let registrations = Registrations::default();
        assert!(registrations.is_empty());
        assert_eq!(registrations.to_value(), Value::Array(vec![]));
    }
}
