//! Random identifier generation.

use partylobby_protocol::{GameId, PlayerId};
use rand::Rng;

/// Length of a game code in hex characters.
pub(crate) const GAME_CODE_LEN: usize = 8;

/// Generates a short game code: 4 random bytes as 8 lowercase hex chars.
///
/// Short enough to read out loud. Collisions are possible in principle,
/// so the registry re-rolls a code that is already taken.
pub(crate) fn generate_game_id() -> GameId {
    GameId::new(random_hex(GAME_CODE_LEN / 2))
}

/// Generates a player id: 16 random bytes (128 bits) as 32 hex chars.
pub(crate) fn generate_player_id() -> PlayerId {
    PlayerId::new(random_hex(16))
}

fn random_hex(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    rand::rng().fill(&mut bytes[..]);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
