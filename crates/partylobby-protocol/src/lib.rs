//! Wire protocol for the party lobby service.
//!
//! This crate defines the "language" that clients and the lobby server
//! speak:
//!
//! - **Types** ([`Envelope`], [`Request`], [`Response`], [`LobbySnapshot`]):
//!   the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the lobby
//! registry. It doesn't know about connections or games; it only knows
//! how to serialize and deserialize messages.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Gateway → Registry
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Envelope, GameId, LobbyPlayer, LobbySnapshot, Payload, PlayerId, Request,
    Response, PROTOCOL_VERSION,
};
