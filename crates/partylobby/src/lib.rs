//! # partylobby
//!
//! Lobby server for party games. One player creates a game and gets a
//! short code, friends join with that code and a nickname, everybody polls
//! the lobby, and the creator starts the game.
//!
//! The crate ties the layers together:
//!
//! ```text
//! transport (WebSocket) → protocol (Envelope) → handler → registry
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use partylobby::prelude::*;
//!
//! # async fn run() -> Result<(), LobbyError> {
//! let catalog = RuleCatalog::load("rules.json")?;
//! let server = LobbyServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build::<DeferredRoles>(catalog)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod catalog;
mod config;
mod error;
mod handler;
mod server;

pub use catalog::RuleCatalog;
pub use config::ServerConfig;
pub use error::{CatalogError, LobbyError};
pub use server::{LobbyServer, LobbyServerBuilder};

pub mod prelude {
    //! Everything a binary or an integration test needs in one import.

    pub use crate::{
        CatalogError, LobbyError, LobbyServer, LobbyServerBuilder, RuleCatalog, ServerConfig,
    };
    pub use partylobby_protocol::{
        Codec, Envelope, GameId, JsonCodec, LobbyPlayer, LobbySnapshot, Payload, PlayerId,
        Request, Response, PROTOCOL_VERSION,
    };
    pub use partylobby_registry::{
        DeferredRoles, GamePhase, LobbyRegistry, Player, RegistryConfig, RegistryError,
        RoleAssignment,
    };
}
