//! Realm and registry configuration.

use serde::{Deserialize, Serialize};

/// How the realm reports handshake and routing failures to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Log only. Failed authentication and unroutable messages get no reply,
    /// so the peer is left waiting.
    #[default]
    Silent,
    /// Answer failures on the wire: Abort for handshake failures, an Error
    /// reply for messages no role claims.
    Explicit,
}

/// Realm configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealmConfig {
    /// Peer-facing failure reporting
    pub error_policy: ErrorPolicy,
    /// Remove the session from the realm's membership on leave
    pub evict_on_leave: bool,
}

impl Default for RealmConfig {
    fn default() -> Self {
        Self { error_policy: ErrorPolicy::Silent, evict_on_leave: true }
    }
}

/// Realm registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Create a realm the first time a Hello names it
    pub auto_create: bool,
    /// Configuration applied to realms the registry creates
    pub realm: RealmConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { auto_create: true, realm: RealmConfig::default() }
    }
}
