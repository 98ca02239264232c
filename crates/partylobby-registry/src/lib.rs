//! Game registry for the party lobby service.
//!
//! Holds every game in memory, keyed by its shareable code, and enforces
//! the lobby rules: unique nicknames per game, exactly one creator, and a
//! one-way `Lobby → Started` transition.
//!
//! # Key types
//!
//! - [`LobbyRegistry`]: create / join / inspect / start games
//! - [`Game`], [`Player`]: the records the registry owns
//! - [`GamePhase`]: lifecycle state machine
//! - [`RoleAssignment`]: hook run when a game starts
//! - [`RegistryConfig`]: registry settings

mod config;
mod error;
mod game;
mod ids;
mod registry;
mod roles;

pub use config::{GamePhase, RegistryConfig};
pub use error::RegistryError;
pub use game::{Game, Player};
pub use registry::LobbyRegistry;
pub use roles::{DeferredRoles, RoleAssignment};
