//! The lobby registry: owns every game and serializes access per game.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use partylobby_protocol::{GameId, LobbySnapshot, PlayerId};

use crate::ids::{generate_game_id, generate_player_id};
use crate::{DeferredRoles, Game, Player, RegistryConfig, RegistryError, RoleAssignment};

/// Manages all games, keyed by their shareable code.
///
/// ## Locking
///
/// The map is behind an `RwLock` that is only held long enough to look a
/// game up or insert one. Each game sits behind its own `Mutex`, and every
/// read-modify-write on a game (nickname check + append, started check +
/// flip) runs under that mutex. Requests for different games never wait
/// on each other.
///
/// Nothing here awaits, so the locks are plain synchronous ones and the
/// registry can be called from async handlers without holding a lock
/// across an `.await`.
///
/// Games are never removed. The registry grows for the lifetime of the
/// process.
pub struct LobbyRegistry<R: RoleAssignment = DeferredRoles> {
    games: RwLock<HashMap<GameId, Arc<Mutex<Game>>>>,
    config: RegistryConfig,
    _roles: PhantomData<fn() -> R>,
}

impl<R: RoleAssignment> LobbyRegistry<R> {
    /// Creates an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            config,
            _roles: PhantomData,
        }
    }

    /// Creates a game with a single creator player.
    ///
    /// An absent or empty nickname falls back to
    /// [`RegistryConfig::default_nickname`]. Never fails.
    pub fn create_game(&self, nickname: Option<&str>) -> (GameId, PlayerId) {
        let nickname = match nickname {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => self.config.default_nickname.clone(),
        };
        let player_id = generate_player_id();
        let creator = Player::new(player_id.clone(), nickname, true);

        let mut games = self.games.write();
        let game_id = loop {
            let candidate = generate_game_id();
            if !games.contains_key(&candidate) {
                break candidate;
            }
            tracing::debug!(game_id = %candidate, "game code collision, re-rolling");
        };
        games.insert(
            game_id.clone(),
            Arc::new(Mutex::new(Game::new(game_id.clone(), creator))),
        );
        let total = games.len();
        drop(games);

        tracing::info!(%game_id, %player_id, games = total, "game created");
        (game_id, player_id)
    }

    /// Adds a player to an existing game and returns their new id.
    ///
    /// # Errors
    /// Checked in this order:
    /// - [`RegistryError::InvalidInput`] if `nickname` is absent or empty
    /// - [`RegistryError::NotFound`] if no game has this code
    /// - [`RegistryError::DuplicateNickname`] if the name is taken in
    ///   this game (exact, case-sensitive match)
    pub fn join_game(
        &self,
        game_id: &GameId,
        nickname: Option<&str>,
    ) -> Result<PlayerId, RegistryError> {
        let nickname = match nickname {
            Some(n) if !n.is_empty() => n,
            _ => {
                return Err(RegistryError::InvalidInput(
                    "nickname is required".into(),
                ));
            }
        };

        let game = self.game(game_id)?;
        let player_id = generate_player_id();

        let mut game = game.lock();
        if let Err(e) = game.seat(player_id.clone(), nickname) {
            tracing::debug!(%game_id, nickname, "join rejected: nickname taken");
            return Err(e);
        }
        tracing::info!(
            %game_id,
            %player_id,
            players = game.players().len(),
            started = game.started(),
            "player joined"
        );
        Ok(player_id)
    }

    /// Returns the privacy-filtered snapshot of a game.
    ///
    /// # Errors
    /// [`RegistryError::NotFound`] if no game has this code.
    pub fn lobby(&self, game_id: &GameId) -> Result<LobbySnapshot, RegistryError> {
        let game = self.game(game_id)?;
        let snapshot = game.lock().snapshot();
        Ok(snapshot)
    }

    /// Starts a game: deals roles with `R`, then marks it started.
    ///
    /// # Errors
    /// - [`RegistryError::NotFound`] if no game has this code
    /// - [`RegistryError::AlreadyStarted`] if it was started before; the
    ///   game is left untouched
    pub fn start_game(&self, game_id: &GameId) -> Result<(), RegistryError> {
        let game = self.game(game_id)?;
        let mut game = game.lock();
        if let Err(e) = game.start::<R>() {
            tracing::debug!(%game_id, "start rejected: already started");
            return Err(e);
        }
        tracing::info!(%game_id, players = game.players().len(), "game started");
        Ok(())
    }

    /// Returns `true` if a game is registered under this code.
    pub fn contains(&self, game_id: &GameId) -> bool {
        self.games.read().contains_key(game_id)
    }

    /// Returns the number of registered games.
    pub fn game_count(&self) -> usize {
        self.games.read().len()
    }

    /// Looks a game up and releases the map lock before returning.
    fn game(&self, game_id: &GameId) -> Result<Arc<Mutex<Game>>, RegistryError> {
        self.games
            .read()
            .get(game_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(game_id.clone()))
    }
}

impl<R: RoleAssignment> Default for LobbyRegistry<R> {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
