//! Remote procedure call role.
//!
//! Procedures are registered under exact URIs, one callee per procedure.
//! A call becomes an invocation on the callee; the callee's yield (or error)
//! is routed back to the caller under the caller's original request id.

use std::{collections::HashMap, fmt, sync::Arc};

use realmgate_proto::{
    Id, Message, MessageCode,
    payloads::{
        Call, CallResult, Details, ErrorMessage, Invocation, Register, Registered, Unregister,
        Unregistered, Yield,
    },
    uri,
};
use tracing::debug;

use super::{IdGenerator, Registrations, Role};
use crate::{
    manager::{Manager, TracingManager},
    session::SessionRef,
};

/// A call waiting for its callee to answer.
struct PendingCall {
    caller: SessionRef,
    call_request_id: Id,
    callee_id: Id,
}

/// Dealer role: routes calls to the sessions that registered procedures.
pub struct Dealer {
    manager: Arc<dyn Manager>,
    registrations: Registrations,
    /// Keyed by invocation request id
    pending: HashMap<Id, PendingCall>,
    ids: IdGenerator,
}

impl Dealer {
    /// Create a dealer with no registrations.
    pub fn new() -> Self {
        Self {
            manager: Arc::new(TracingManager::new()),
            registrations: Registrations::default(),
            pending: HashMap::new(),
            ids: IdGenerator::default(),
        }
    }

    /// Number of calls waiting for a yield.
    pub fn pending_calls(&self) -> usize {
        self.pending.len()
    }

    fn register(&mut self, session: &SessionRef, msg: Register) {
        if self.registrations.find(&msg.procedure).is_some() {
            self.manager.log_error(&format!(
                "session {} tried to register '{}' which is already registered",
                session.session_id(),
                msg.procedure
            ));
            session.send_message(Message::Error(ErrorMessage::new(
                MessageCode::Register,
                msg.request_id,
                uri::PROCEDURE_ALREADY_EXISTS,
            )));
            return;
        }

        let registration_id = self.ids.next_id();
        debug!(session_id = session.session_id(), registration_id, procedure = %msg.procedure, "registered");
        self.registrations.insert(registration_id, msg.procedure, Arc::clone(session));
        session.send_message(Message::Registered(Registered {
            request_id: msg.request_id,
            registration_id,
        }));
    }

    fn unregister(&mut self, session: &SessionRef, msg: &Unregister) {
        if self.registrations.owner(msg.registration_id) != Some(session.session_id()) {
            session.send_message(Message::Error(ErrorMessage::new(
                MessageCode::Unregister,
                msg.request_id,
                uri::NO_SUCH_REGISTRATION,
            )));
            return;
        }

        self.registrations.remove(msg.registration_id);
        session.send_message(Message::Unregistered(Unregistered { request_id: msg.request_id }));
    }

    fn call(&mut self, session: &SessionRef, msg: Call) {
        let Some((registration_id, callee)) = self.registrations.find(&msg.procedure) else {
            session.send_message(Message::Error(ErrorMessage::new(
                MessageCode::Call,
                msg.request_id,
                uri::NO_SUCH_PROCEDURE,
            )));
            return;
        };

        let invocation_id = self.ids.next_id();
        self.pending.insert(invocation_id, PendingCall {
            caller: Arc::clone(session),
            call_request_id: msg.request_id,
            callee_id: callee.session_id(),
        });

        callee.send_message(Message::Invocation(Invocation {
            request_id: invocation_id,
            registration_id,
            details: Details::new(),
            arguments: msg.arguments,
            arguments_kw: msg.arguments_kw,
        }));
    }

    /// Take the pending call for an invocation answered by `session`.
    fn take_pending(&mut self, session: &SessionRef, invocation_id: Id) -> Option<PendingCall> {
        let answered_by_callee = self
            .pending
            .get(&invocation_id)
            .is_some_and(|pending| pending.callee_id == session.session_id());

        if !answered_by_callee {
            self.manager.log_error(&format!(
                "session {} answered unknown invocation {invocation_id}",
                session.session_id()
            ));
            return None;
        }
        self.pending.remove(&invocation_id)
    }

    fn yield_result(&mut self, session: &SessionRef, msg: Yield) {
        let Some(pending) = self.take_pending(session, msg.request_id) else {
            return;
        };

        pending.caller.send_message(Message::Result(CallResult {
            request_id: pending.call_request_id,
            details: Details::new(),
            arguments: msg.arguments,
            arguments_kw: msg.arguments_kw,
        }));
    }

    fn invocation_error(&mut self, session: &SessionRef, msg: ErrorMessage) {
        let Some(pending) = self.take_pending(session, msg.request_id) else {
            return;
        };

        pending.caller.send_message(Message::Error(ErrorMessage {
            request_type: MessageCode::Call,
            request_id: pending.call_request_id,
            ..msg
        }));
    }
}

impl Default for Dealer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dealer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dealer")
            .field("registrations", &self.registrations.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl Role for Dealer {
    fn name(&self) -> &str {
        "dealer"
    }

    fn handles_message(&self, message: &Message) -> bool {
        match message {
            Message::Register(_)
            | Message::Unregister(_)
            | Message::Call(_)
            | Message::Yield(_) => true,
            Message::Error(err) => err.request_type == MessageCode::Invocation,
            _ => false,
        }
    }

    fn on_message(&mut self, session: &SessionRef, message: Message) {
        match message {
            Message::Register(msg) => self.register(session, msg),
            Message::Unregister(msg) => self.unregister(session, &msg),
            Message::Call(msg) => self.call(session, msg),
            Message::Yield(msg) => self.yield_result(session, msg),
            Message::Error(msg) => self.invocation_error(session, msg),
            other => {
                self.manager.log_error(&format!("dealer received unclaimed {}", other.code()));
            },
        }
    }

    fn leave(&mut self, session: &SessionRef) {
        let session_id = session.session_id();
        let dropped = self.registrations.remove_session(session_id);

        // Calls the departing session was serving fail back to their callers;
        // calls it was waiting on are forgotten.
        let mut canceled = 0usize;
        self.pending.retain(|_, pending| {
            if pending.callee_id == session_id {
                pending.caller.send_message(Message::Error(ErrorMessage::new(
                    MessageCode::Call,
                    pending.call_request_id,
                    uri::CANCELED,
                )));
                canceled += 1;
                return false;
            }
            pending.caller.session_id() != session_id
        });

        self.manager.log_debug(&format!(
            "dealer dropped {dropped} registrations and canceled {canceled} calls for session {session_id}"
        ));
    }

    fn set_manager(&mut self, manager: Arc<dyn Manager>) {
        self.manager = manager;
    }

    fn registrations(&self) -> Option<Registrations> {
        Some(self.registrations.clone())
    }
}
