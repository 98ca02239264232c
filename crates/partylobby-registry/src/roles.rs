//! The `RoleAssignment` trait, run when a game starts.
//!
//! Starting a game is supposed to deal every player a secret role. How
//! roles are dealt depends on the party game being played, so the
//! registry doesn't decide it: it calls [`RoleAssignment::assign_roles`]
//! under the game's lock, right before flipping the game to `Started`.

use crate::Player;

/// Deals roles to the players of a game that is being started.
///
/// Implementations set roles through [`Player::set_role`]. The slice is in
/// join order, creator first. Nothing else about the game is reachable
/// from here, so a strategy can't break the registry's invariants.
pub trait RoleAssignment: Send + Sync + 'static {
    /// Called once per game, when it moves from `Lobby` to `Started`.
    fn assign_roles(players: &mut [Player]);
}

/// The shipped strategy: no distribution rule exists yet, so every role
/// stays unset. The game still reports `roles_assigned` after start.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferredRoles;

impl RoleAssignment for DeferredRoles {
    fn assign_roles(_players: &mut [Player]) {}
}
