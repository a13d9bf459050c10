//! Publish/subscribe role.
//!
//! Topics match exactly. A session subscribing twice to the same topic gets
//! its existing subscription back. Publishers never receive their own events.

use std::{collections::BTreeMap, fmt, sync::Arc};

use realmgate_proto::{
    Id, Message, MessageCode,
    payloads::{
        ErrorMessage, Event, Publish, Published, Subscribe, Subscribed, Unsubscribe, Unsubscribed,
    },
    uri,
};
use tracing::debug;

use super::{IdGenerator, Role};
use crate::{
    manager::{Manager, TracingManager},
    session::SessionRef,
};

struct Subscription {
    topic: String,
    subscriber: SessionRef,
}

/// Broker role: routes published events to topic subscribers.
pub struct Broker {
    manager: Arc<dyn Manager>,
    subscriptions: BTreeMap<Id, Subscription>,
    ids: IdGenerator,
}

impl Broker {
    /// Create a broker with no subscriptions.
    pub fn new() -> Self {
        Self {
            manager: Arc::new(TracingManager::new()),
            subscriptions: BTreeMap::new(),
            ids: IdGenerator::default(),
        }
    }

    /// Number of live subscriptions across all sessions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Topics `session_id` is subscribed to, ordered by subscription id.
    pub fn topics_for(&self, session_id: Id) -> Vec<String> {
        self.subscriptions
            .values()
            .filter(|sub| sub.subscriber.session_id() == session_id)
            .map(|sub| sub.topic.clone())
            .collect()
    }

    fn subscribe(&mut self, session: &SessionRef, msg: Subscribe) {
        let session_id = session.session_id();
        let existing = self
            .subscriptions
            .iter()
            .find(|(_, sub)| sub.topic == msg.topic && sub.subscriber.session_id() == session_id)
            .map(|(id, _)| *id);

        let subscription_id = match existing {
            Some(id) => id,
            None => {
                let id = self.ids.next_id();
                self.subscriptions
                    .insert(id, Subscription { topic: msg.topic, subscriber: Arc::clone(session) });
                id
            },
        };

        debug!(session_id, subscription_id, "subscribed");
        session.send_message(Message::Subscribed(Subscribed {
            request_id: msg.request_id,
            subscription_id,
        }));
    }

    fn unsubscribe(&mut self, session: &SessionRef, msg: &Unsubscribe) {
        let owned = self
            .subscriptions
            .get(&msg.subscription_id)
            .is_some_and(|sub| sub.subscriber.session_id() == session.session_id());

        if !owned {
            self.manager.log_error(&format!(
                "session {} tried to drop unknown subscription {}",
                session.session_id(),
                msg.subscription_id
            ));
            session.send_message(Message::Error(ErrorMessage::new(
                MessageCode::Unsubscribe,
                msg.request_id,
                uri::NO_SUCH_SUBSCRIPTION,
            )));
            return;
        }

        self.subscriptions.remove(&msg.subscription_id);
        session.send_message(Message::Unsubscribed(Unsubscribed { request_id: msg.request_id }));
    }

    fn publish(&mut self, session: &SessionRef, msg: Publish) {
        let publisher = session.session_id();
        let publication_id = self.ids.next_id();

        let mut delivered = 0usize;
        for (subscription_id, sub) in &self.subscriptions {
            if sub.topic != msg.topic || sub.subscriber.session_id() == publisher {
                continue;
            }
            sub.subscriber.send_message(Message::Event(Event {
                subscription_id: *subscription_id,
                publication_id,
                details: Default::default(),
                arguments: msg.arguments.clone(),
                arguments_kw: msg.arguments_kw.clone(),
            }));
            delivered += 1;
        }

        debug!(publisher, publication_id, delivered, topic = %msg.topic, "published");

        if msg.acknowledge() {
            session.send_message(Message::Published(Published {
                request_id: msg.request_id,
                publication_id,
            }));
        }
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broker").field("subscriptions", &self.subscriptions.len()).finish()
    }
}

impl Role for Broker {
    fn name(&self) -> &str {
        "broker"
    }

    fn handles_message(&self, message: &Message) -> bool {
        matches!(message, Message::Subscribe(_) | Message::Unsubscribe(_) | Message::Publish(_))
    }

    fn on_message(&mut self, session: &SessionRef, message: Message) {
        match message {
            Message::Subscribe(msg) => self.subscribe(session, msg),
            Message::Unsubscribe(msg) => self.unsubscribe(session, &msg),
            Message::Publish(msg) => self.publish(session, msg),
            other => {
                self.manager.log_error(&format!("broker received unclaimed {}", other.code()));
            },
        }
    }

    fn leave(&mut self, session: &SessionRef) {
        let session_id = session.session_id();
        let before = self.subscriptions.len();
        self.subscriptions.retain(|_, sub| sub.subscriber.session_id() != session_id);

        self.manager.log_debug(&format!(
            "broker dropped {} subscriptions for session {session_id}",
            before - self.subscriptions.len()
        ));
    }

    fn set_manager(&mut self, manager: Arc<dyn Manager>) {
        self.manager = manager;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::test_support::TestSession;

    #[test]
    fn resubscribe_reuses_subscription() {
        let mut broker = Broker::new();
        let session = TestSession::new(1).handle();

        broker.on_message(&session, Message::Subscribe(Subscribe::new(1, "com.a")));
        broker.on_message(&session, Message::Subscribe(Subscribe::new(2, "com.a")));
        broker.on_message(&session, Message::Subscribe(Subscribe::new(3, "com.b")));

        assert_eq!(broker.subscription_count(), 2);
        assert_eq!(broker.topics_for(1), vec!["com.a".to_string(), "com.b".to_string()]);
    }

    #[test]
    fn leave_keeps_other_sessions_subscriptions() {
        let mut broker = Broker::new();
        let alice = TestSession::new(1);
        let bob = TestSession::new(2);

        broker.on_message(&alice.handle(), Message::Subscribe(Subscribe::new(1, "com.a")));
        broker.on_message(&bob.handle(), Message::Subscribe(Subscribe::new(1, "com.a")));
        broker.leave(&alice.handle());

        assert!(broker.topics_for(1).is_empty());
        assert_eq!(broker.topics_for(2), vec!["com.a".to_string()]);

        bob.take();
        broker.on_message(&bob.handle(), Message::Publish(Publish::new(5, "com.a")));
        assert!(alice.take().iter().all(|m| !matches!(m, Message::Event(_))));
        assert!(bob.take().is_empty());
    }

    proptest! {
        /// Leaving drops exactly the leaver's subscriptions.
        #[test]
        fn leave_drops_only_the_leavers_subscriptions(
            subs in prop::collection::vec((1..5u64, 0..4u8), 0..40),
            leaver in 1..5u64,
        ) {
            let mut broker = Broker::new();
            let sessions: Vec<_> = (1..5u64).map(TestSession::new).collect();

            for (request_id, (session_id, topic)) in (1u64..).zip(&subs) {
                let session = sessions[(*session_id - 1) as usize].handle();
                let subscribe = Subscribe::new(request_id, format!("com.topic.{topic}"));
                broker.on_message(&session, Message::Subscribe(subscribe));
            }

            let kept: Vec<Vec<String>> =
                (1..5u64).map(|id| if id == leaver { Vec::new() } else { broker.topics_for(id) }).collect();
            broker.leave(&sessions[(leaver - 1) as usize].handle());

            for id in 1..5u64 {
                prop_assert_eq!(&broker.topics_for(id), &kept[(id - 1) as usize]);
            }
            prop_assert_eq!(broker.subscription_count(), kept.iter().map(Vec::len).sum::<usize>());
        }
    }
}
