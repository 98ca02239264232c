//! Error types for the registry layer.

use partylobby_protocol::GameId;

/// Errors that can occur during registry operations.
///
/// Every variant is a final answer to the request that caused it: none of
/// them are transient, so callers should report them, not retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A required field was missing or empty.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No game is registered under this code.
    #[error("game {0} not found")]
    NotFound(GameId),

    /// Another player in the game already uses this nickname.
    #[error("nickname {nickname:?} is already taken in game {game_id}")]
    DuplicateNickname { game_id: GameId, nickname: String },

    /// The game has already been started.
    #[error("game {0} has already started")]
    AlreadyStarted(GameId),
}
