//! Reference model of realm membership and authentication.
//!
//! The model tracks, per client, whether it is a member and whether it is
//! authenticated, and predicts how many messages the realm sends back for
//! each operation. Model-based tests drive the model and a real realm with
//! the same operations and compare the two.
//!
//! Clients with an even index connect without an authentication provider;
//! odd clients use a provider supporting only `wampcra`.

/// Index of a client in the model.
pub type ClientId = u8;

/// Authentication method the model's providers support.
pub const SUPPORTED_METHOD: &str = "wampcra";

/// Secret the model's providers accept.
pub const SECRET: &str = "s3cret";

/// Operation applied to both the model and the real realm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Client sends Hello; `offer_supported` controls whether `wampcra` is
    /// among the advertised methods
    Hello {
        /// Sending client
        client: ClientId,
        /// Whether the supported method is advertised
        offer_supported: bool,
    },
    /// Client sends Authenticate with the right or wrong secret
    Authenticate {
        /// Sending client
        client: ClientId,
        /// Whether the signature is the accepted secret
        correct: bool,
    },
    /// Client subscribes to a topic
    Subscribe {
        /// Sending client
        client: ClientId,
    },
    /// Client leaves the realm
    Leave {
        /// Departing client
        client: ClientId,
    },
}

impl Operation {
    /// Client the operation acts for.
    pub fn client(&self) -> ClientId {
        match self {
            Self::Hello { client, .. }
            | Self::Authenticate { client, .. }
            | Self::Subscribe { client }
            | Self::Leave { client } => *client,
        }
    }
}

/// Observable outcome of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationResult {
    /// Messages sent back to the acting client
    pub replies: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct ClientModel {
    member: bool,
    authenticated: bool,
}

/// Reference model of a realm with default roles and silent error policy.
#[derive(Debug, Clone)]
pub struct ModelRealm {
    clients: Vec<ClientModel>,
}

impl ModelRealm {
    /// Model with `num_clients` connected, unjoined clients.
    pub fn new(num_clients: usize) -> Self {
        Self { clients: vec![ClientModel::default(); num_clients] }
    }

    /// Whether client `client` uses an authentication provider.
    pub fn has_provider(client: ClientId) -> bool {
        client % 2 == 1
    }

    /// Whether the client is a member.
    pub fn is_member(&self, client: ClientId) -> bool {
        self.clients.get(usize::from(client)).is_some_and(|c| c.member)
    }

    /// Whether the client is authenticated.
    pub fn is_authenticated(&self, client: ClientId) -> bool {
        self.clients.get(usize::from(client)).is_some_and(|c| c.authenticated)
    }

    /// Number of member clients.
    pub fn member_count(&self) -> usize {
        self.clients.iter().filter(|c| c.member).count()
    }

    /// Apply an operation and predict its outcome.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        let provider = Self::has_provider(op.client());
        let Some(client) = self.clients.get_mut(usize::from(op.client())) else {
            return OperationResult { replies: 0 };
        };

        let replies = match *op {
            Operation::Hello { offer_supported, .. } => {
                if client.member {
                    // Error reply, nothing else changes
                    1
                } else {
                    client.member = true;
                    if !provider {
                        client.authenticated = true;
                        1
                    } else if offer_supported {
                        1
                    } else {
                        0
                    }
                }
            },
            Operation::Authenticate { correct, .. } => {
                if !client.authenticated && client.member && provider && correct {
                    client.authenticated = true;
                    1
                } else {
                    0
                }
            },
            Operation::Subscribe { .. } => usize::from(client.authenticated),
            Operation::Leave { .. } => {
                *client = ClientModel::default();
                0
            },
        };

        OperationResult { replies }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_client_needs_authenticate() {
        let mut model = ModelRealm::new(2);
        let hello = model.apply(&Operation::Hello { client: 1, offer_supported: true });
        assert_eq!(hello.replies, 1);
        assert!(model.is_member(1));
        assert!(!model.is_authenticated(1));

        let auth = model.apply(&Operation::Authenticate { client: 1, correct: true });
        assert_eq!(auth.replies, 1);
        assert!(model.is_authenticated(1));
    }

    #[test]
    fn leave_resets_client() {
        let mut model = ModelRealm::new(1);
        model.apply(&Operation::Hello { client: 0, offer_supported: false });
        model.apply(&Operation::Leave { client: 0 });
        assert_eq!(model.member_count(), 0);
        assert!(!model.is_authenticated(0));
    }
}
