//! Model-based property tests.
//!
//! Random operation sequences are applied to the reference model and to a
//! real realm populated with in-memory sessions. After every step the number
//! of replies, the membership set and the authentication flags must agree.
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!      ModelRealm      RealRealm       Compare
//!      (reference)   (MemorySession)   Results
//! ```

use std::sync::Arc;

use proptest::prelude::*;
use realmgate_core::{Realm, Session};
use realmgate_harness::{
    MemorySession, ModelRealm, Operation, OperationResult, StaticAuthProvider,
    model::{ClientId, SECRET, SUPPORTED_METHOD},
};
use realmgate_proto::{
    Message,
    payloads::{Authenticate, Hello, Subscribe},
};

const REALM: &str = "model";

/// Real realm wrapper that mirrors `ModelRealm`'s interface.
struct RealRealm {
    realm: Realm,
    sessions: Vec<Arc<MemorySession>>,
    next_request: u64,
}

impl RealRealm {
    fn new(num_clients: usize) -> Self {
        let sessions = (0..num_clients)
            .map(|i| {
                let id = i as u64 + 1;
                let client = ClientId::try_from(i).unwrap_or(ClientId::MAX);
                if ModelRealm::has_provider(client) {
                    let provider = StaticAuthProvider::new([SUPPORTED_METHOD], SECRET);
                    MemorySession::with_provider(id, Arc::new(provider))
                } else {
                    MemorySession::new(id)
                }
            })
            .collect();

        Self { realm: Realm::new(REALM), sessions, next_request: 1 }
    }

    fn apply(&mut self, op: &Operation) -> OperationResult {
        let Some(session) = self.sessions.get(usize::from(op.client())).cloned() else {
            return OperationResult { replies: 0 };
        };
        let handle = session.handle();

        match op {
            Operation::Hello { offer_supported, .. } => {
                let method = if *offer_supported { SUPPORTED_METHOD } else { "ticket" };
                let hello = Hello::with_auth_methods(REALM, [method]);
                let _ = self.realm.on_message(&handle, Message::Hello(hello));
            },
            Operation::Authenticate { correct, .. } => {
                let signature = if *correct { SECRET } else { "wrong" };
                let auth = Authenticate::new(signature);
                let _ = self.realm.on_message(&handle, Message::Authenticate(auth));
            },
            Operation::Subscribe { .. } => {
                let request_id = self.next_request;
                self.next_request += 1;
                let subscribe = Subscribe::new(request_id, "com.model.topic");
                let _ = self.realm.on_message(&handle, Message::Subscribe(subscribe));
            },
            Operation::Leave { .. } => self.realm.leave(&handle),
        }

        OperationResult { replies: session.take_messages().len() }
    }

    fn is_member(&self, client: ClientId) -> bool {
        self.realm.is_member(u64::from(client) + 1)
    }

    fn is_authenticated(&self, client: ClientId) -> bool {
        self.sessions.get(usize::from(client)).is_some_and(|s| s.is_authenticated())
    }
}

fn operation_strategy(num_clients: u8) -> impl Strategy<Value = Operation> {
    let client = 0..num_clients;

    prop_oneof![
        4 => (client.clone(), any::<bool>())
            .prop_map(|(client, offer_supported)| Operation::Hello { client, offer_supported }),
        3 => (client.clone(), any::<bool>())
            .prop_map(|(client, correct)| Operation::Authenticate { client, correct }),
        3 => client.clone().prop_map(|client| Operation::Subscribe { client }),
        1 => client.prop_map(|client| Operation::Leave { client }),
    ]
}

proptest! {
    /// Replies, membership and authentication agree after every operation.
    #[test]
    fn prop_model_matches_real(
        (num_clients, ops) in (2..5u8).prop_flat_map(|n| {
            (Just(n), prop::collection::vec(operation_strategy(n), 0..60))
        })
    ) {
        let mut model = ModelRealm::new(usize::from(num_clients));
        let mut real = RealRealm::new(usize::from(num_clients));

        for (i, op) in ops.iter().enumerate() {
            let model_result = model.apply(op);
            let real_result = real.apply(op);

            prop_assert_eq!(
                model_result,
                real_result,
                "Divergence at operation {}: {:?}",
                i, op
            );

            for client in 0..num_clients {
                prop_assert_eq!(model.is_member(client), real.is_member(client));
                prop_assert_eq!(model.is_authenticated(client), real.is_authenticated(client));
            }
        }

        prop_assert_eq!(model.member_count(), real.realm.session_count());
    }

    /// An authenticated session is always a member.
    #[test]
    fn prop_authenticated_implies_member(
        ops in prop::collection::vec(operation_strategy(4), 0..100)
    ) {
        let mut real = RealRealm::new(4);

        for op in &ops {
            real.apply(op);
            for client in 0..4 {
                if real.is_authenticated(client) {
                    prop_assert!(real.is_member(client), "client {} authenticated outside realm", client);
                }
            }
        }
    }

    /// A second Hello from a member gets exactly one reply and changes nothing.
    #[test]
    fn prop_duplicate_hello_is_rejected_once(
        client in 0..4u8,
        offer_supported in any::<bool>()
    ) {
        let mut real = RealRealm::new(4);
        let hello = Operation::Hello { client, offer_supported };
        real.apply(&hello);
        let authenticated = real.is_authenticated(client);

        let again = real.apply(&hello);
        prop_assert_eq!(again.replies, 1);
        prop_assert!(real.is_member(client));
        prop_assert_eq!(real.is_authenticated(client), authenticated);
    }
}
