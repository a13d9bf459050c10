//! Role dispatch, departure and manager wiring tests.
//!
//! Uses probe roles sharing one journal so the order in which the realm
//! consults its roles is observable.

use std::sync::Arc;

use realmgate_core::{ErrorPolicy, Handled, Realm, RealmConfig, Role};
use realmgate_harness::{MemorySession, ProbeEvent, ProbeJournal, ProbeRole, RecordingManager};
use realmgate_proto::{
    Message, MessageCode, Value,
    payloads::{Call, Hello, Publish, Subscribe, Unsubscribe},
    uri,
};

fn probe_realm(journal: &ProbeJournal, config: RealmConfig) -> Realm {
    let roles: Vec<Box<dyn Role>> = vec![
        ProbeRole::boxed("alpha", &[MessageCode::Publish, MessageCode::Subscribe], journal),
        ProbeRole::boxed("beta", &[MessageCode::Publish, MessageCode::Call], journal),
    ];
    Realm::with_roles("probes", roles, config)
}

fn joined(realm: &mut Realm, id: u64) -> Arc<MemorySession> {
    let session = MemorySession::new(id);
    let hello = Hello::new(realm.name());
    realm.on_message(&session.handle(), Message::Hello(hello)).unwrap();
    session.take_messages();
    session
}

fn offered(role: &str, code: MessageCode) -> ProbeEvent {
    ProbeEvent::Offered { role: role.to_string(), code }
}

fn handled(role: &str, code: MessageCode) -> ProbeEvent {
    ProbeEvent::Handled { role: role.to_string(), code }
}

#[test]
fn first_claiming_role_wins() {
    let journal = ProbeJournal::new();
    let mut realm = probe_realm(&journal, RealmConfig::default());
    let session = joined(&mut realm, 1);
    journal.clear();

    // Both probes claim Publish; only alpha may see it.
    let result = realm.on_message(&session.handle(), Message::Publish(Publish::new(1, "t")));
    assert_eq!(result, Ok(Handled::Dispatched { role: "alpha".into() }));
    assert_eq!(journal.events(), vec![
        offered("alpha", MessageCode::Publish),
        handled("alpha", MessageCode::Publish),
    ]);
}

#[test]
fn later_role_gets_what_earlier_roles_decline() {
    let journal = ProbeJournal::new();
    let mut realm = probe_realm(&journal, RealmConfig::default());
    let session = joined(&mut realm, 1);
    journal.clear();

    let result = realm.on_message(&session.handle(), Message::Call(Call::new(3, "proc")));
    assert_eq!(result, Ok(Handled::Dispatched { role: "beta".into() }));
    assert_eq!(journal.events(), vec![
        offered("alpha", MessageCode::Call),
        offered("beta", MessageCode::Call),
        handled("beta", MessageCode::Call),
    ]);
}

#[test]
fn unclaimed_message_is_dropped_silently() {
    let journal = ProbeJournal::new();
    let manager = Arc::new(RecordingManager::new());
    let mut realm = probe_realm(&journal, RealmConfig::default());
    realm.set_manager(manager.clone());
    let session = joined(&mut realm, 1);
    journal.clear();

    let result = realm.on_message(&session.handle(), Message::Unsubscribe(Unsubscribe {
        request_id: 4,
        subscription_id: 1,
    }));
    assert_eq!(result, Ok(Handled::Dropped));
    assert!(session.take_messages().is_empty());
    assert!(manager.error_lines().is_empty());
    assert!(!journal.events().iter().any(|e| matches!(e, ProbeEvent::Handled { .. })));
}

#[test]
fn explicit_policy_answers_unclaimed_message() {
    let journal = ProbeJournal::new();
    let config = RealmConfig { error_policy: ErrorPolicy::Explicit, ..RealmConfig::default() };
    let mut realm = probe_realm(&journal, config);
    let session = joined(&mut realm, 1);

    let result = realm.on_message(&session.handle(), Message::Unsubscribe(Unsubscribe {
        request_id: 4,
        subscription_id: 1,
    }));
    assert_eq!(result, Ok(Handled::Dropped));

    let sent = session.take_messages();
    assert_eq!(sent.len(), 1);
    let Message::Error(err) = &sent[0] else {
        panic!("expected Error, got {:?}", sent[0]);
    };
    assert_eq!(err.request_type, MessageCode::Unsubscribe);
    assert_eq!(err.request_id, 4);
    assert_eq!(err.error, uri::NOT_SUPPORTED);
}

#[test]
fn leave_reaches_every_role_once_in_order() {
    let journal = ProbeJournal::new();
    let mut realm = probe_realm(&journal, RealmConfig::default());
    let session = joined(&mut realm, 21);
    joined(&mut realm, 22);
    journal.clear();

    realm.leave(&session.handle());

    assert_eq!(journal.events(), vec![
        ProbeEvent::Left { role: "alpha".into(), session_id: 21 },
        ProbeEvent::Left { role: "beta".into(), session_id: 21 },
    ]);
    assert_eq!(realm.session_ids(), vec![22]);
}

#[test]
fn leave_for_session_without_role_state_still_notifies_roles() {
    let journal = ProbeJournal::new();
    let mut realm = probe_realm(&journal, RealmConfig::default());
    let stranger = MemorySession::new(99);
    journal.clear();

    realm.leave(&stranger.handle());

    let lefts =
        journal.events().into_iter().filter(|e| matches!(e, ProbeEvent::Left { .. })).count();
    assert_eq!(lefts, 2);
}

#[test]
fn replacing_manager_rewires_roles_and_callable() {
    let journal = ProbeJournal::new();
    let mut realm = probe_realm(&journal, RealmConfig::default());
    journal.clear();

    let first = Arc::new(RecordingManager::new());
    realm.set_manager(first.clone());
    assert_eq!(first.callable_registrations(), vec!["realm.probes.registrations".to_string()]);
    assert_eq!(journal.events(), vec![
        ProbeEvent::ManagerSet { role: "alpha".into() },
        ProbeEvent::ManagerSet { role: "beta".into() },
    ]);

    // Probes expose no registrations, so the snapshot is empty.
    assert_eq!(first.call("realm.probes.registrations"), Some(Value::Array(vec![])));

    realm.set_name("renamed");
    let second = Arc::new(RecordingManager::new());
    realm.set_manager(second.clone());
    assert_eq!(second.callable_registrations(), vec!["realm.renamed.registrations".to_string()]);
    assert_eq!(first.callable_registrations().len(), 1);
}

#[test]
fn departing_session_is_logged_through_manager() {
    let manager = Arc::new(RecordingManager::new());
    let mut realm = Realm::new("realm1");
    realm.set_manager(manager.clone());
    let session = joined(&mut realm, 5);

    realm.on_message(&session.handle(), Message::Subscribe(Subscribe::new(1, "t"))).unwrap();
    realm.leave(&session.handle());

    let debug = manager.debug_lines();
    assert!(debug.iter().any(|line| line.contains("leaving realm 'realm1'")));
    assert!(debug.iter().any(|line| line.contains("broker dropped 1 subscriptions")));
}
