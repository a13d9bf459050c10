//! Fixed-secret authentication provider.

use std::sync::atomic::{AtomicUsize, Ordering};

use realmgate_core::AuthProvider;

/// Provider that accepts one shared secret.
#[derive(Debug)]
pub struct StaticAuthProvider {
    methods: Vec<String>,
    secret: String,
    auth_id: String,
    auth_role: String,
    attempts: AtomicUsize,
}

impl StaticAuthProvider {
    /// Provider supporting `methods` and accepting `secret` as the signature.
    ///
    /// The first method is reported as `authmethod` after success.
    pub fn new<I, S>(methods: I, secret: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: methods.into_iter().map(Into::into).collect(),
            secret: secret.into(),
            auth_id: "anonymous".to_string(),
            auth_role: "user".to_string(),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Set the identity reported after success.
    #[must_use]
    pub fn with_identity(mut self, auth_id: impl Into<String>, auth_role: impl Into<String>) -> Self {
        self.auth_id = auth_id.into();
        self.auth_role = auth_role.into();
        self
    }

    /// Number of `authenticate` calls so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl AuthProvider for StaticAuthProvider {
    fn supports(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    fn authenticate(&self, signature: &str) -> bool {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        signature == self.secret
    }

    fn authentication_id(&self) -> String {
        self.auth_id.clone()
    }

    fn authentication_method(&self) -> String {
        self.methods.first().cloned().unwrap_or_default()
    }

    fn authentication_role(&self) -> String {
        self.auth_role.clone()
    }
}
