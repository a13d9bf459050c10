//! Well-known error and close reason URIs.

/// Peer violated the handshake or message sequencing rules.
pub const PROTOCOL_VIOLATION: &str = "wamp.error.protocol_violation";

/// Authentication was attempted and rejected.
pub const AUTHENTICATION_FAILED: &str = "wamp.error.authentication_failed";

/// None of the advertised authentication methods is available.
pub const NO_AUTH_METHOD: &str = "wamp.error.no_auth_method";

/// No role in the realm handles the request.
pub const NOT_SUPPORTED: &str = "wamp.error.not_supported";

/// Unsubscribe for an unknown subscription.
pub const NO_SUCH_SUBSCRIPTION: &str = "wamp.error.no_such_subscription";

/// Unregister for an unknown registration.
pub const NO_SUCH_REGISTRATION: &str = "wamp.error.no_such_registration";

/// Call to a procedure nobody registered.
pub const NO_SUCH_PROCEDURE: &str = "wamp.error.no_such_procedure";

/// Register for a procedure that is already registered.
pub const PROCEDURE_ALREADY_EXISTS: &str = "wamp.error.procedure_already_exists";

/// Call aborted because the callee went away.
pub const CANCELED: &str = "wamp.error.canceled";

