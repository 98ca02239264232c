//! Game and player records.
//!
//! A [`Game`] enforces its own invariants (one creator, unique nicknames,
//! one-way start). The registry wraps each game in a mutex; everything in
//! here assumes the caller already holds it.

use partylobby_protocol::{GameId, LobbyPlayer, LobbySnapshot, PlayerId};

use crate::{GamePhase, RegistryError, RoleAssignment};

/// A player seated in a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    nickname: String,
    role: Option<String>,
    is_creator: bool,
}

impl Player {
    pub(crate) fn new(id: PlayerId, nickname: String, is_creator: bool) -> Self {
        Self {
            id,
            nickname,
            role: None,
            is_creator,
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// The role dealt at start, if any.
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn is_creator(&self) -> bool {
        self.is_creator
    }

    /// Deals a role to this player. Called by a
    /// [`RoleAssignment`] strategy during start.
    pub fn set_role(&mut self, role: impl Into<String>) {
        self.role = Some(role.into());
    }
}

/// One party-game session: its players and its lifecycle flags.
#[derive(Debug, Clone)]
pub struct Game {
    id: GameId,
    /// Join order. Index 0 is the creator.
    players: Vec<Player>,
    phase: GamePhase,
    roles_assigned: bool,
    creator_id: PlayerId,
}

impl Game {
    /// Creates a game in the `Lobby` phase with `creator` as its only
    /// player.
    pub(crate) fn new(id: GameId, creator: Player) -> Self {
        debug_assert!(creator.is_creator);
        Self {
            id,
            creator_id: creator.id.clone(),
            players: vec![creator],
            phase: GamePhase::Lobby,
            roles_assigned: false,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn started(&self) -> bool {
        self.phase.is_started()
    }

    pub fn roles_assigned(&self) -> bool {
        self.roles_assigned
    }

    pub fn creator_id(&self) -> &PlayerId {
        &self.creator_id
    }

    /// Exact, case-sensitive match against every seated player.
    pub fn has_nickname(&self, nickname: &str) -> bool {
        self.players.iter().any(|p| p.nickname == nickname)
    }

    /// Appends a non-creator player.
    ///
    /// The nickname check and the append happen in one call so that the
    /// registry can run both under a single lock acquisition.
    pub(crate) fn seat(
        &mut self,
        player_id: PlayerId,
        nickname: &str,
    ) -> Result<(), RegistryError> {
        if self.has_nickname(nickname) {
            return Err(RegistryError::DuplicateNickname {
                game_id: self.id.clone(),
                nickname: nickname.to_string(),
            });
        }
        // Joining after start is still accepted; only the nickname rule
        // applies to late joiners.
        self.players
            .push(Player::new(player_id, nickname.to_string(), false));
        Ok(())
    }

    /// Moves the game from `Lobby` to `Started`, dealing roles with `R`.
    pub(crate) fn start<R: RoleAssignment>(&mut self) -> Result<(), RegistryError> {
        if !self.phase.can_transition_to(GamePhase::Started) {
            return Err(RegistryError::AlreadyStarted(self.id.clone()));
        }
        R::assign_roles(&mut self.players);
        self.phase = GamePhase::Started;
        self.roles_assigned = true;
        Ok(())
    }

    /// The privacy-filtered view: nicknames and creator flags only.
    pub fn snapshot(&self) -> LobbySnapshot {
        LobbySnapshot {
            players: self
                .players
                .iter()
                .map(|p| LobbyPlayer {
                    nickname: p.nickname.clone(),
                    is_creator: p.is_creator,
                })
                .collect(),
            started: self.started(),
            roles_assigned: self.roles_assigned,
            creator_id: self.creator_id.clone(),
        }
    }
}
