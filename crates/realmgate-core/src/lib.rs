//! Realm core for the realmgate router.
//!
//! A realm admits sessions through an authentication handshake and then routes
//! every message from an admitted session to the first role that claims it.
//! All logic here is synchronous and free of I/O: sessions, authentication
//! providers and the manager sink are collaborators supplied by the host.
//!
//! # Architecture
//!
//! ```text
//! transport ──(session, message)──> SharedRealm ──lock──> Realm
//!                                                           ├─ handshake (Hello / Authenticate)
//!                                                           └─ roles: [Broker, Dealer, ...]
//!                                                                first match wins
//! ```
//!
//! # Components
//!
//! - [`realm`]: Admission state machine and ordered role dispatch
//! - [`role`]: Role trait plus the default [`Broker`] and [`Dealer`]
//! - [`session`]: Session and authentication provider contracts
//! - [`manager`]: Log and introspection sink
//! - [`shared`]: Serialized realm handle and the realm registry
//! - [`config`]: Realm and registry configuration
//! - [`error`]: Realm error types

pub mod config;
pub mod error;
pub mod manager;
pub mod realm;
pub mod role;
pub mod session;
pub mod shared;

#[cfg(test)]
mod test_support;

pub use config::{ErrorPolicy, RealmConfig, RegistryConfig};
pub use error::RealmError;
pub use manager::{Callable, Manager, TracingManager};
pub use realm::{Handled, Realm};
pub use role::{Broker, Dealer, RegistrationInfo, Registrations, Role};
pub use session::{AuthProvider, Session, SessionRef, SessionState};
pub use shared::{RealmRegistry, SharedRealm};
