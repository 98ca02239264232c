//! Core protocol types for the lobby wire format.
//!
//! Everything in this module travels "on the wire": it is serialized by
//! the server, sent over a WebSocket, and parsed by a browser client (or
//! the other way round).

use serde::{Deserialize, Serialize};

use std::fmt;

/// The current protocol version. Clients must send this in their
/// handshake or be rejected.
pub const PROTOCOL_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The short, shareable code that identifies a game.
///
/// Players type or paste this to join a friend's lobby, so it is kept to
/// eight lowercase hex characters. The newtype keeps it from being mixed
/// up with a [`PlayerId`], which is also a string underneath.
///
/// `#[serde(transparent)]` serializes it as a bare string: `"1a2b3c4d"`,
/// not `{ "0": "1a2b3c4d" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Wraps an existing code. No format check is done: unknown codes are
    /// simply not found by the registry.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque, server-generated player identifier.
///
/// Only the player it was issued to ever sees it; the lobby snapshot
/// deliberately leaves it out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Lobby snapshot
// ---------------------------------------------------------------------------

/// One row of the lobby's player list.
///
/// Only the display name and the creator flag are public. Player ids and
/// roles never leave the server through this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyPlayer {
    pub nickname: String,
    pub is_creator: bool,
}

/// The externally visible view of a game, polled by clients waiting in
/// the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbySnapshot {
    /// Players in join order. The creator is always first.
    pub players: Vec<LobbyPlayer>,
    pub started: bool,
    pub roles_assigned: bool,
    pub creator_id: PlayerId,
}

// ---------------------------------------------------------------------------
// Request: client → server
// ---------------------------------------------------------------------------

/// Messages a client sends to the server.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
///   `{ "type": "JoinGame", "game_id": "1a2b3c4d", "nickname": "Bob" }`
///
/// The nickname fields are `Option` because clients are allowed to leave
/// them out. Whether that is an error depends on the operation, so the
/// decision is made by the registry, not by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    // -- Connection lifecycle --

    /// "Hello, I speak protocol `version`." Must be the first message.
    Handshake { version: u32 },

    /// "I'm still here." `client_time` is echoed back for RTT.
    Heartbeat { client_time: u64 },

    /// "I'm leaving." The server closes the connection.
    Disconnect { reason: String },

    // -- Lobby operations --

    /// Liveness check. Answered with [`Response::Status`].
    Status,

    /// Fetch the static rule catalog.
    ListRules,

    /// Create a new game with the sender as its creator.
    CreateGame {
        #[serde(default)]
        nickname: Option<String>,
    },

    /// Join an existing game by its code.
    JoinGame {
        game_id: GameId,
        #[serde(default)]
        nickname: Option<String>,
    },

    /// Poll the lobby snapshot of a game.
    GetLobby { game_id: GameId },

    /// Start a game. Only succeeds once per game.
    StartGame { game_id: GameId },
}

// ---------------------------------------------------------------------------
// Response: server → client
// ---------------------------------------------------------------------------

/// Messages the server sends back. Every request gets exactly one
/// response, except `Disconnect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Handshake accepted. `server_time` is ms since the connection opened.
    HandshakeAck { server_time: u64 },

    /// Reply to a heartbeat.
    HeartbeatAck { client_time: u64, server_time: u64 },

    /// The service is up. `games` counts every game created so far.
    Status { message: String, games: usize },

    /// The rule catalog, passed through untouched.
    Rules { catalog: serde_json::Value },

    /// A game was created; the sender is its creator.
    GameCreated { game_id: GameId, player_id: PlayerId },

    /// The sender joined a game.
    GameJoined { player_id: PlayerId },

    /// The current lobby snapshot.
    Lobby(LobbySnapshot),

    /// The game was started.
    GameStarted { success: bool },

    /// Something went wrong. `code` follows HTTP conventions
    /// (400 = bad request, 404 = not found).
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Payload / Envelope
// ---------------------------------------------------------------------------

/// The content of an envelope: a request or a response.
///
/// Adjacently tagged:
///   `{ "type": "Request", "data": { "type": "ListRules" } }`
///
/// The outer tag lets the server reject a client that sends a response
/// shape without having to guess what it meant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    Request(Request),
    Response(Response),
}

/// The top-level wrapper. Every message on the wire is an `Envelope`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Per-side sequence number. Each side keeps its own counter.
    pub seq: u64,

    /// Milliseconds since the connection was opened (sender's clock).
    pub timestamp: u64,

    pub payload: Payload,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The JSON shapes here are what browser clients are written against,
    //! so each test pins one shape down.

    use super::*;

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_game_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&GameId::new("1a2b3c4d")).unwrap();
        assert_eq!(json, "\"1a2b3c4d\"");
    }

    #[test]
    fn test_player_id_display_is_raw_value() {
        assert_eq!(PlayerId::new("abc").to_string(), "abc");
        assert_eq!(PlayerId::new("abc").as_str(), "abc");
    }

    // =====================================================================
    // Request
    // =====================================================================

    #[test]
    fn test_request_status_is_bare_tag() {
        let req: Request = serde_json::from_str(r#"{"type":"Status"}"#).unwrap();
        assert_eq!(req, Request::Status);
    }

    #[test]
    fn test_request_join_game_json_format() {
        let req = Request::JoinGame {
            game_id: GameId::new("deadbeef"),
            nickname: Some("Bob".into()),
        };
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["type"], "JoinGame");
        assert_eq!(json["game_id"], "deadbeef");
        assert_eq!(json["nickname"], "Bob");
    }

    #[test]
    fn test_request_create_game_nickname_may_be_omitted() {
        let req: Request = serde_json::from_str(r#"{"type":"CreateGame"}"#).unwrap();
        assert_eq!(req, Request::CreateGame { nickname: None });
    }

    #[test]
    fn test_request_join_game_nickname_may_be_omitted() {
        let req: Request =
            serde_json::from_str(r#"{"type":"JoinGame","game_id":"deadbeef"}"#).unwrap();
        assert_eq!(
            req,
            Request::JoinGame {
                game_id: GameId::new("deadbeef"),
                nickname: None,
            }
        );
    }

    #[test]
    fn test_request_join_game_without_game_id_fails() {
        let result: Result<Request, _> =
            serde_json::from_str(r#"{"type":"JoinGame","nickname":"Bob"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_request_list_rules_json_format() {
        let json = serde_json::to_value(&Request::ListRules).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "ListRules" }));
    }

    #[test]
    fn test_request_unknown_type_fails() {
        let result: Result<Request, _> =
            serde_json::from_str(r#"{"type": "FlyToMoon", "speed": 9000}"#);
        assert!(result.is_err());
    }

    // =====================================================================
    // Response
    // =====================================================================

    #[test]
    fn test_response_game_created_json_format() {
        let resp = Response::GameCreated {
            game_id: GameId::new("1a2b3c4d"),
            player_id: PlayerId::new("p1"),
        };
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["type"], "GameCreated");
        assert_eq!(json["game_id"], "1a2b3c4d");
        assert_eq!(json["player_id"], "p1");
    }

    #[test]
    fn test_response_lobby_flattens_snapshot() {
        let resp = Response::Lobby(LobbySnapshot {
            players: vec![
                LobbyPlayer {
                    nickname: "Alice".into(),
                    is_creator: true,
                },
                LobbyPlayer {
                    nickname: "Bob".into(),
                    is_creator: false,
                },
            ],
            started: false,
            roles_assigned: false,
            creator_id: PlayerId::new("p1"),
        });
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["type"], "Lobby");
        assert_eq!(json["players"][0]["nickname"], "Alice");
        assert_eq!(json["players"][0]["is_creator"], true);
        assert_eq!(json["players"][1]["is_creator"], false);
        assert_eq!(json["started"], false);
        assert_eq!(json["roles_assigned"], false);
        assert_eq!(json["creator_id"], "p1");
    }

    #[test]
    fn test_lobby_player_has_only_public_fields() {
        let json = serde_json::to_value(LobbyPlayer {
            nickname: "Alice".into(),
            is_creator: true,
        })
        .unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert!(json.get("id").is_none());
        assert!(json.get("role").is_none());
    }

    #[test]
    fn test_response_error_json_format() {
        let resp = Response::Error {
            code: 404,
            message: "game 1a2b3c4d not found".into(),
        };
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["type"], "Error");
        assert_eq!(json["code"], 404);
        assert_eq!(json["message"], "game 1a2b3c4d not found");
    }

    #[test]
    fn test_response_rules_passes_catalog_through() {
        let catalog = serde_json::json!({ "title": "Party", "rules": ["a", "b"] });
        let resp = Response::Rules {
            catalog: catalog.clone(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["catalog"], catalog);
    }

    // =====================================================================
    // Payload / Envelope
    // =====================================================================

    #[test]
    fn test_payload_request_json_format() {
        let payload = Payload::Request(Request::StartGame {
            game_id: GameId::new("1a2b3c4d"),
        });
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["type"], "Request");
        assert_eq!(json["data"]["type"], "StartGame");
        assert_eq!(json["data"]["game_id"], "1a2b3c4d");
    }

    #[test]
    fn test_envelope_missing_payload_fails() {
        let result: Result<Envelope, _> = serde_json::from_str(r#"{"seq": 1, "timestamp": 0}"#);
        assert!(result.is_err());
    }
}
