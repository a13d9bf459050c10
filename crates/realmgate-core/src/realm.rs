//! Realm: admission handshake and ordered role dispatch.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────┐  Hello   ┌────────────────────────┐  Authenticate ok  ┌───────────────┐
//! │ Unjoined │─────────>│ Joined, unauthenticated │─────────────────>│ Authenticated │
//! └──────────┘          └────────────────────────┘                   └───────────────┘
//!      │  Hello (no auth provider)                                         ▲
//!      └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sessions that are members of this realm and authenticated have every
//! message offered to the realm's roles in order; the first role whose
//! `handles_message` returns true processes it. Anything else from a session
//! that is not a member is rejected, whatever its authentication flag says.
//! A Hello from a session that is already a member is always a protocol
//! violation, whatever its authentication state.
//!
//! # Failures
//!
//! Bad peer input never panics and never affects other sessions. Each failure
//! is logged through the manager and returned as a [`RealmError`]; whether the
//! peer hears about it depends on the realm's [`ErrorPolicy`].

use std::{collections::HashMap, fmt, sync::Arc};

use realmgate_proto::{
    Id, Message, Value,
    payloads::{self, Abort, Authenticate, Challenge, Details, Hello, Welcome},
    uri,
};
use tracing::{debug, warn};

use crate::{
    config::{ErrorPolicy, RealmConfig},
    error::RealmError,
    manager::{Manager, TracingManager},
    role::{Broker, Dealer, Registrations, Role},
    session::{SessionRef, SessionState},
};

/// What the realm did with a message it accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    /// Session joined and was sent a challenge for `method`
    Challenged {
        /// Authentication method chosen from the peer's list
        method: String,
    },
    /// Session completed the handshake and was sent Welcome
    Welcomed,
    /// Message was processed by the named role
    Dispatched {
        /// Name of the role that claimed the message
        role: String,
    },
    /// No role claimed the message
    Dropped,
}

/// A named realm: admitted sessions plus the roles that serve them.
pub struct Realm {
    name: String,
    sessions: HashMap<Id, SessionRef>,
    roles: Vec<Box<dyn Role>>,
    manager: Arc<dyn Manager>,
    config: RealmConfig,
}

impl Realm {
    /// Create a realm with the default roles (broker, then dealer) and the
    /// default configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, RealmConfig::default())
    }

    /// Create a realm with the default roles and the given configuration.
    pub fn with_config(name: impl Into<String>, config: RealmConfig) -> Self {
        Self::with_roles(name, vec![Box::new(Broker::new()), Box::new(Dealer::new())], config)
    }

    /// Create a realm with a custom, ordered set of roles.
    ///
    /// Role order is dispatch priority and is fixed for the realm's lifetime.
    pub fn with_roles(
        name: impl Into<String>,
        roles: Vec<Box<dyn Role>>,
        config: RealmConfig,
    ) -> Self {
        let manager: Arc<dyn Manager> = Arc::new(TracingManager::new());
        let mut realm = Self {
            name: name.into(),
            sessions: HashMap::new(),
            roles,
            manager: Arc::clone(&manager),
            config,
        };
        realm.set_manager(manager);
        realm
    }

    /// Realm name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the realm.
    ///
    /// The introspection callable keeps its old path until the next
    /// [`Realm::set_manager`].
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Current manager.
    pub fn manager(&self) -> &Arc<dyn Manager> {
        &self.manager
    }

    /// Realm configuration.
    pub fn config(&self) -> &RealmConfig {
        &self.config
    }

    /// Whether `session_id` is a member of this realm.
    pub fn is_member(&self, session_id: Id) -> bool {
        self.sessions.contains_key(&session_id)
    }

    /// Number of member sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Member session ids, sorted.
    pub fn session_ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.sessions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Role names in dispatch order.
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|role| role.name().to_string()).collect()
    }

    /// Path of this realm's introspection callable.
    pub fn registrations_path(&self) -> String {
        format!("realm.{}.registrations", self.name)
    }

    /// Replace the manager.
    ///
    /// Propagates the manager to every role and registers this realm's
    /// introspection callable with it. The wiring is redone from scratch on
    /// every call.
    pub fn set_manager(&mut self, manager: Arc<dyn Manager>) {
        for role in &mut self.roles {
            role.set_manager(Arc::clone(&manager));
        }

        let source: Option<Registrations> = self.roles.iter().find_map(|role| role.registrations());
        manager.add_callable(
            &self.registrations_path(),
            Arc::new(move || match &source {
                Some(registrations) => registrations.to_value(),
                None => Value::Array(Vec::new()),
            }),
        );

        self.manager = manager;
    }

    /// Handle one message from `session`.
    ///
    /// Returns what the realm did with it, or the (already logged) reason it
    /// was rejected.
    pub fn on_message(
        &mut self,
        session: &SessionRef,
        message: Message,
    ) -> Result<Handled, RealmError> {
        if let Message::Hello(hello) = &message {
            return self.handle_hello(session, &message, hello);
        }

        let member = self.is_member(session.session_id());
        if member && session.is_authenticated() {
            return Ok(self.dispatch(session, message));
        }

        match message {
            Message::Authenticate(auth) if member => self.handle_authenticate(session, &auth),
            other => {
                let session_id = session.session_id();
                let code = other.code();
                self.manager.log_error(&format!(
                    "session {session_id} sent {code} to realm '{}' before authenticating",
                    self.name
                ));
                self.abort_if_explicit(session, uri::PROTOCOL_VIOLATION);
                Err(RealmError::NotAuthenticated { session_id, code })
            },
        }
    }

    /// Remove `session` from the realm.
    ///
    /// Every role is told about the departure exactly once, in role order,
    /// whether or not it holds anything for the session. The session is then
    /// evicted from membership (unless configured otherwise) so it can join
    /// again with a fresh handshake.
    pub fn leave(&mut self, session: &SessionRef) {
        let session_id = session.session_id();
        self.manager.log_debug(&format!("session {session_id} leaving realm '{}'", self.name));

        for role in &mut self.roles {
            role.leave(session);
        }

        if self.config.evict_on_leave && self.sessions.remove(&session_id).is_some() {
            session.set_authenticated(false);
            session.set_state(SessionState::Down);
        }
    }

    fn handle_hello(
        &mut self,
        session: &SessionRef,
        message: &Message,
        hello: &Hello,
    ) -> Result<Handled, RealmError> {
        let session_id = session.session_id();
        self.manager.log_debug(&format!("hello from session {session_id} for realm '{}'", self.name));

        if self.is_member(session_id) {
            self.manager.log_error(&format!(
                "session {session_id} sent hello to realm '{}' which it has already joined",
                self.name
            ));
            session.send_message(message.error_reply(uri::PROTOCOL_VIOLATION));
            return Err(RealmError::AlreadyJoined { session_id, realm: self.name.clone() });
        }

        self.sessions.insert(session_id, Arc::clone(session));
        session.set_realm(&self.name);
        session.set_state(SessionState::Up);
        // Admission is per realm; nothing earned elsewhere carries over.
        session.set_authenticated(false);

        let Some(provider) = session.auth_provider() else {
            session.set_authenticated(true);
            session.send_message(Message::Welcome(Welcome {
                session_id,
                details: self.welcome_details(Details::new()),
            }));
            debug!(realm = %self.name, session_id, "welcomed without authentication");
            return Ok(Handled::Welcomed);
        };

        // Peer's order wins: the first advertised method the provider supports.
        if let Some(method) = hello.auth_methods.iter().find(|method| provider.supports(method)) {
            session.send_message(Message::Challenge(Challenge::new(method.clone())));
            debug!(realm = %self.name, session_id, method = %method, "challenge sent");
            return Ok(Handled::Challenged { method: method.clone() });
        }

        self.manager.log_error(&format!(
            "session {session_id} offered no supported authentication method: {:?}",
            hello.auth_methods
        ));
        self.abort_if_explicit(session, uri::NO_AUTH_METHOD);
        Err(RealmError::NoMatchingAuthMethod { session_id, offered: hello.auth_methods.clone() })
    }

    fn handle_authenticate(
        &mut self,
        session: &SessionRef,
        auth: &Authenticate,
    ) -> Result<Handled, RealmError> {
        let session_id = session.session_id();

        let Some(provider) = session.auth_provider() else {
            self.manager.log_error(&format!(
                "session {session_id} sent authenticate but has no authentication provider"
            ));
            self.abort_if_explicit(session, uri::AUTHENTICATION_FAILED);
            return Err(RealmError::MissingAuthProvider { session_id });
        };

        if !provider.authenticate(&auth.signature) {
            self.manager.log_error(&format!("authentication failed for session {session_id}"));
            self.abort_if_explicit(session, uri::AUTHENTICATION_FAILED);
            return Err(RealmError::AuthenticationFailed { session_id });
        }

        session.set_authenticated(true);

        let mut auth_details = Details::new();
        auth_details.insert("authid".into(), Value::Text(provider.authentication_id()));
        auth_details.insert("authmethod".into(), Value::Text(provider.authentication_method()));
        auth_details.insert("authrole".into(), Value::Text(provider.authentication_role()));

        session.send_message(Message::Welcome(Welcome {
            session_id,
            details: self.welcome_details(auth_details),
        }));
        debug!(realm = %self.name, session_id, "welcomed after authentication");
        Ok(Handled::Welcomed)
    }

    fn dispatch(&mut self, session: &SessionRef, message: Message) -> Handled {
        let Some(role) = self.roles.iter_mut().find(|role| role.handles_message(&message)) else {
            let code = message.code();
            debug!(realm = %self.name, session_id = session.session_id(), %code, "no role handles message");
            if self.config.error_policy == ErrorPolicy::Explicit {
                session.send_message(message.error_reply(uri::NOT_SUPPORTED));
            }
            return Handled::Dropped;
        };

        let name = role.name().to_string();
        role.on_message(session, message);
        Handled::Dispatched { role: name }
    }

    /// Welcome details: `extra` plus the `roles` capability set, where each
    /// role name maps to an empty marker.
    fn welcome_details(&self, mut extra: Details) -> Details {
        let roles: Details =
            self.roles.iter().map(|role| (role.name().to_string(), Value::Map(Vec::new()))).collect();
        extra.insert("roles".into(), payloads::to_value(roles));
        extra
    }

    /// Under [`ErrorPolicy::Explicit`], tell the peer its handshake failed and
    /// drop its membership.
    fn abort_if_explicit(&mut self, session: &SessionRef, reason: &str) {
        if self.config.error_policy != ErrorPolicy::Explicit {
            return;
        }

        let session_id = session.session_id();
        warn!(realm = %self.name, session_id, reason, "aborting handshake");
        session.send_message(Message::Abort(Abort::new(reason)));
        if self.sessions.remove(&session_id).is_some() {
            session.set_state(SessionState::Down);
        }
    }
}

impl fmt::Debug for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Realm")
            .field("name", &self.name)
            .field("sessions", &self.session_ids())
            .field("roles", &self.role_names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
