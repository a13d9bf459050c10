//! Serialized access to realms.
//!
//! Sessions are served from many connection tasks at once, but a realm's
//! membership and handshake state must change one message at a time.
//! [`SharedRealm`] is that serialization point: it holds the realm's lock for
//! the whole of each `on_message`, `leave` or `set_manager` call.
//!
//! [`RealmRegistry`] maps realm names to shared realms and routes a session's
//! messages to the realm it joined.

use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::{Mutex, RwLock};
use realmgate_proto::{Message, uri};
use tracing::{info, warn};

use crate::{
    config::RegistryConfig,
    error::RealmError,
    manager::{Manager, TracingManager},
    realm::{Handled, Realm},
    session::SessionRef,
};

/// Cloneable handle to a realm behind a mutex.
#[derive(Clone)]
pub struct SharedRealm {
    inner: Arc<Mutex<Realm>>,
}

impl SharedRealm {
    /// Wrap a realm.
    pub fn new(realm: Realm) -> Self {
        Self { inner: Arc::new(Mutex::new(realm)) }
    }

    /// Handle one message under the realm lock.
    pub fn on_message(
        &self,
        session: &SessionRef,
        message: Message,
    ) -> Result<Handled, RealmError> {
        self.inner.lock().on_message(session, message)
    }

    /// Remove a session under the realm lock.
    pub fn leave(&self, session: &SessionRef) {
        self.inner.lock().leave(session);
    }

    /// Replace the manager under the realm lock.
    pub fn set_manager(&self, manager: Arc<dyn Manager>) {
        self.inner.lock().set_manager(manager);
    }

    /// Realm name.
    pub fn name(&self) -> String {
        self.inner.lock().name().to_string()
    }

    /// Run `f` with shared access to the realm.
    pub fn with<R>(&self, f: impl FnOnce(&Realm) -> R) -> R {
        let realm = self.inner.lock();
        f(&realm)
    }

    /// Whether both handles refer to the same realm.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SharedRealm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|realm| f.debug_tuple("SharedRealm").field(realm).finish())
    }
}

/// Realms known to a router, keyed by name.
pub struct RealmRegistry {
    realms: RwLock<HashMap<String, SharedRealm>>,
    manager: RwLock<Arc<dyn Manager>>,
    config: RegistryConfig,
}

impl RealmRegistry {
    /// Empty registry with the given configuration.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            realms: RwLock::new(HashMap::new()),
            manager: RwLock::new(Arc::new(TracingManager::new())),
            config,
        }
    }

    /// Registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Add a realm built by the caller, replacing any realm with the same name.
    ///
    /// The realm is wired to the registry's manager.
    pub fn insert(&self, realm: Realm) -> SharedRealm {
        let shared = SharedRealm::new(realm);
        shared.set_manager(Arc::clone(&self.manager.read()));
        self.realms.write().insert(shared.name(), shared.clone());
        shared
    }

    /// Look up a realm by name.
    pub fn get(&self, name: &str) -> Option<SharedRealm> {
        self.realms.read().get(name).cloned()
    }

    /// Whether a realm with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.realms.read().contains_key(name)
    }

    /// Look up a realm, creating it if the registry is allowed to.
    pub fn get_or_create(&self, name: &str) -> Result<SharedRealm, RealmError> {
        if let Some(realm) = self.get(name) {
            return Ok(realm);
        }
        if !self.config.auto_create {
            return Err(RealmError::NoSuchRealm(name.to_string()));
        }

        let mut realms = self.realms.write();
        // Another caller may have created it between the read and the write.
        let shared = realms
            .entry(name.to_string())
            .or_insert_with(|| {
                info!(realm = name, "creating realm");
                let shared = SharedRealm::new(Realm::with_config(name, self.config.realm.clone()));
                shared.set_manager(Arc::clone(&self.manager.read()));
                shared
            })
            .clone();
        Ok(shared)
    }

    /// Remove a realm, returning it if it existed.
    pub fn remove(&self, name: &str) -> Option<SharedRealm> {
        self.realms.write().remove(name)
    }

    /// Realm names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.realms.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Replace the manager of the registry and of every realm in it.
    pub fn set_manager(&self, manager: Arc<dyn Manager>) {
        *self.manager.write() = Arc::clone(&manager);
        for realm in self.realms.read().values() {
            realm.set_manager(Arc::clone(&manager));
        }
    }

    /// Route a message to the right realm.
    ///
    /// Hello selects (and possibly creates) the realm it names. Any other
    /// message goes to the realm the session already joined. A session belongs
    /// to at most one realm: Hello for a different realm while it is still a
    /// member of another is answered with a protocol violation.
    pub fn on_message(
        &self,
        session: &SessionRef,
        message: Message,
    ) -> Result<Handled, RealmError> {
        let realm = match &message {
            Message::Hello(hello) => {
                let elsewhere = self.current_realm(session).filter(|current| *current != hello.realm);
                if let Some(current) = elsewhere {
                    let session_id = session.session_id();
                    warn!(session_id, current = %current, requested = %hello.realm, "hello while joined elsewhere");
                    self.manager.read().log_error(&format!(
                        "session {session_id} sent hello for realm '{}' while joined to realm '{current}'",
                        hello.realm
                    ));
                    session.send_message(message.error_reply(uri::PROTOCOL_VIOLATION));
                    return Err(RealmError::AlreadyJoined { session_id, realm: current });
                }
                self.get_or_create(&hello.realm)?
            },
            _ => self.joined_realm(session)?,
        };
        realm.on_message(session, message)
    }

    /// Remove a session from the realm it joined.
    pub fn leave(&self, session: &SessionRef) -> Result<(), RealmError> {
        self.joined_realm(session)?.leave(session);
        Ok(())
    }

    /// Realm the session is currently a member of, if any.
    fn current_realm(&self, session: &SessionRef) -> Option<String> {
        let name = session.realm()?;
        let realm = self.get(&name)?;
        realm.with(|realm| realm.is_member(session.session_id())).then_some(name)
    }

    fn joined_realm(&self, session: &SessionRef) -> Result<SharedRealm, RealmError> {
        let session_id = session.session_id();
        let Some(name) = session.realm() else {
            warn!(session_id, "message from session outside any realm");
            return Err(RealmError::NotJoined(session_id));
        };
        self.get(&name).ok_or(RealmError::NoSuchRealm(name))
    }
}

impl Default for RealmRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl fmt::Debug for RealmRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealmRegistry")
            .field("realms", &self.names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
