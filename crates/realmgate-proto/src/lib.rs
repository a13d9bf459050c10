//! Message model for the realmgate router.
//!
//! Every message a peer can exchange with a realm is a variant of [`Message`].
//! Each variant carries a typed payload struct from [`payloads`]; the numeric
//! [`MessageCode`] identifies the variant independently of any wire encoding.
//!
//! Open-ended fields (details dictionaries, positional and keyword arguments)
//! are carried as [`Value`] so the router never needs to understand
//! application payloads. Encoding and framing belong to the transport layer.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codes;
pub mod errors;
pub mod message;
pub mod payloads;
pub mod uri;

pub use ciborium::Value;
pub use codes::MessageCode;
pub use errors::ProtocolError;
pub use message::Message;
pub use payloads::Details;

/// Identifier assigned to a session, subscription, publication, registration
/// or request.
pub type Id = u64;
