//! Registry configuration and the game state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Default display name for a creator who didn't pick one.
pub const DEFAULT_CREATOR_NICKNAME: &str = "Founder";

/// Configuration for a [`LobbyRegistry`](crate::LobbyRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Nickname given to a creator whose request had no (or an empty)
    /// nickname.
    pub default_nickname: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_nickname: DEFAULT_CREATOR_NICKNAME.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// The lifecycle state of a game.
///
/// ```text
/// Lobby → Started
/// ```
///
/// - **Lobby**: Game exists, players join by code and poll the snapshot.
/// - **Started**: The creator started the game. Terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Lobby,
    Started,
}

impl GamePhase {
    /// Returns `true` once the game has been started.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }

    /// Returns the next phase, or `None` from the terminal phase.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Lobby => Some(Self::Started),
            Self::Started => None,
        }
    }

    /// Returns `true` if transitioning to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Started => write!(f, "Started"),
        }
    }
}
