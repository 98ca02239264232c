//! Per-connection handler: handshake and request routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive Handshake → validate version
//!   2. Send HandshakeAck
//!   3. Loop: receive envelopes → answer each request with one response

use std::sync::Arc;
use std::time::Instant;

use partylobby_protocol::{
    Codec, Envelope, Payload, ProtocolError, Request, Response, PROTOCOL_VERSION,
};
use partylobby_registry::{LobbyRegistry, RegistryError, RoleAssignment};
use partylobby_transport::{Connection, WebSocketConnection};

use crate::server::ServerState;
use crate::{LobbyError, RuleCatalog};

/// HTTP-style status for a rejected registry operation.
pub(crate) fn status_code(err: &RegistryError) -> u16 {
    match err {
        RegistryError::NotFound(_) => 404,
        RegistryError::InvalidInput(_)
        | RegistryError::DuplicateNickname { .. }
        | RegistryError::AlreadyStarted(_) => 400,
    }
}

/// Translates one lobby request into its response. No I/O.
///
/// Connection-level requests (`Heartbeat`, `Disconnect`) are answered by
/// the request loop before reaching here; if they do arrive they are
/// rejected like a second handshake.
pub(crate) fn dispatch<R: RoleAssignment>(
    registry: &LobbyRegistry<R>,
    catalog: &RuleCatalog,
    request: Request,
) -> Response {
    let result = match request {
        Request::Status => Ok(Response::Status {
            message: "partylobby is running".to_string(),
            games: registry.game_count(),
        }),
        Request::ListRules => Ok(Response::Rules {
            catalog: catalog.document().clone(),
        }),
        Request::CreateGame { nickname } => {
            let (game_id, player_id) = registry.create_game(nickname.as_deref());
            Ok(Response::GameCreated { game_id, player_id })
        }
        Request::JoinGame { game_id, nickname } => registry
            .join_game(&game_id, nickname.as_deref())
            .map(|player_id| Response::GameJoined { player_id }),
        Request::GetLobby { game_id } => registry.lobby(&game_id).map(Response::Lobby),
        Request::StartGame { game_id } => registry
            .start_game(&game_id)
            .map(|()| Response::GameStarted { success: true }),
        Request::Handshake { .. } => {
            return error_response(400, "handshake already completed");
        }
        Request::Heartbeat { .. } | Request::Disconnect { .. } => {
            return error_response(400, "unexpected connection request");
        }
    };

    result.unwrap_or_else(|e| error_response(status_code(&e), &e.to_string()))
}

fn error_response(code: u16, message: &str) -> Response {
    Response::Error {
        code,
        message: message.to_string(),
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<R, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<R, C>>,
) -> Result<(), LobbyError>
where
    R: RoleAssignment,
    C: Codec,
{
    let conn_id = conn.id();
    let peer = conn.peer_addr();
    tracing::info!(%conn_id, %peer, "client connected");

    let start = Instant::now();

    // --- Step 1: Handshake ---
    perform_handshake(&conn, &state, &start).await?;
    tracing::info!(%conn_id, "handshake complete");

    // --- Step 2: Request loop ---
    let mut seq: u64 = 1;

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%conn_id, "connection idle, closing");
                let _ = conn.close().await;
                break;
            }
        };

        let envelope: Envelope = match state.codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode envelope");
                send_error(
                    &conn,
                    &state.codec,
                    400,
                    &format!("malformed message: {e}"),
                    next_seq(&mut seq),
                    &start,
                )
                .await?;
                continue;
            }
        };

        let request = match envelope.payload {
            Payload::Request(request) => request,
            Payload::Response(_) => {
                send_error(
                    &conn,
                    &state.codec,
                    400,
                    "clients may only send requests",
                    next_seq(&mut seq),
                    &start,
                )
                .await?;
                continue;
            }
        };

        let response = match request {
            Request::Heartbeat { client_time } => Response::HeartbeatAck {
                client_time,
                server_time: elapsed_ms(&start),
            },
            Request::Disconnect { reason } => {
                tracing::info!(%conn_id, %reason, "client disconnected");
                let _ = conn.close().await;
                break;
            }
            other => dispatch(&state.registry, &state.catalog, other),
        };

        if let Response::Error { code, message } = &response {
            tracing::debug!(%conn_id, code, %message, "request rejected");
        }
        send_response(&conn, &state.codec, response, next_seq(&mut seq), &start).await?;
    }

    Ok(())
}

/// Receives the first message, checks it is a Handshake with our protocol
/// version and sends the ack (seq 0).
async fn perform_handshake<R, C>(
    conn: &WebSocketConnection,
    state: &ServerState<R, C>,
    start: &Instant,
) -> Result<(), LobbyError>
where
    R: RoleAssignment,
    C: Codec,
{
    let data = match tokio::time::timeout(state.handshake_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage(
                "connection closed before handshake".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(LobbyError::Transport(e)),
        Err(_) => {
            let _ = conn.close().await;
            return Err(ProtocolError::InvalidMessage("handshake timed out".into()).into());
        }
    };

    let version = match state.codec.decode::<Envelope>(&data) {
        Ok(Envelope {
            payload: Payload::Request(Request::Handshake { version }),
            ..
        }) => version,
        _ => {
            send_error(conn, &state.codec, 400, "expected Handshake", 0, start).await?;
            let _ = conn.close().await;
            return Err(ProtocolError::InvalidMessage(
                "first message must be Handshake".into(),
            )
            .into());
        }
    };

    if version != PROTOCOL_VERSION {
        send_error(
            conn,
            &state.codec,
            400,
            &format!("version mismatch: expected {PROTOCOL_VERSION}, got {version}"),
            0,
            start,
        )
        .await?;
        let _ = conn.close().await;
        return Err(ProtocolError::InvalidMessage("protocol version mismatch".into()).into());
    }

    let ack = Response::HandshakeAck {
        server_time: elapsed_ms(start),
    };
    send_response(conn, &state.codec, ack, 0, start).await
}

async fn send_response(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    response: Response,
    seq: u64,
    start: &Instant,
) -> Result<(), LobbyError> {
    let envelope = Envelope {
        seq,
        timestamp: elapsed_ms(start),
        payload: Payload::Response(response),
    };
    let bytes = codec.encode(&envelope)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Sends a `Response::Error` envelope to the client.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    code: u16,
    message: &str,
    seq: u64,
    start: &Instant,
) -> Result<(), LobbyError> {
    send_response(conn, codec, error_response(code, message), seq, start).await
}

fn elapsed_ms(start: &Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}

#[cfg(test)]
mod tests {
    use partylobby_protocol::GameId;
    use partylobby_registry::{DeferredRoles, RegistryConfig};
    use serde_json::json;

    use super::*;

    fn setup() -> (LobbyRegistry<DeferredRoles>, RuleCatalog) {
        (
            LobbyRegistry::new(RegistryConfig::default()),
            RuleCatalog::from_value(json!({"rules": ["no peeking"]})),
        )
    }

    fn create(registry: &LobbyRegistry<DeferredRoles>, catalog: &RuleCatalog) -> GameId {
        match dispatch(
            registry,
            catalog,
            Request::CreateGame {
                nickname: Some("Alice".into()),
            },
        ) {
            Response::GameCreated { game_id, .. } => game_id,
            other => panic!("expected GameCreated, got {other:?}"),
        }
    }

    fn error_code(response: Response) -> u16 {
        match response {
            Response::Error { code, .. } => code,
            other => panic!("expected Error, got {other:?}"),
        }
    }

    // =========================================================================
    // status_code
    // =========================================================================

    #[test]
    fn test_status_code_mapping() {
        let id = GameId::new("00000000");
        assert_eq!(status_code(&RegistryError::NotFound(id.clone())), 404);
        assert_eq!(status_code(&RegistryError::InvalidInput("x".into())), 400);
        assert_eq!(
            status_code(&RegistryError::DuplicateNickname {
                game_id: id.clone(),
                nickname: "Bob".into(),
            }),
            400
        );
        assert_eq!(status_code(&RegistryError::AlreadyStarted(id)), 400);
    }

    // =========================================================================
    // dispatch
    // =========================================================================

    #[test]
    fn test_status_reports_game_count() {
        let (registry, catalog) = setup();
        create(&registry, &catalog);
        create(&registry, &catalog);

        match dispatch(&registry, &catalog, Request::Status) {
            Response::Status { message, games } => {
                assert!(message.contains("running"));
                assert_eq!(games, 2);
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn test_list_rules_returns_catalog_verbatim() {
        let (registry, catalog) = setup();
        let response = dispatch(&registry, &catalog, Request::ListRules);
        assert_eq!(
            response,
            Response::Rules {
                catalog: json!({"rules": ["no peeking"]})
            }
        );
    }

    #[test]
    fn test_create_then_lobby() {
        let (registry, catalog) = setup();
        let game_id = create(&registry, &catalog);

        match dispatch(&registry, &catalog, Request::GetLobby { game_id }) {
            Response::Lobby(snapshot) => {
                assert_eq!(snapshot.players.len(), 1);
                assert_eq!(snapshot.players[0].nickname, "Alice");
                assert!(snapshot.players[0].is_creator);
                assert!(!snapshot.started);
            }
            other => panic!("expected Lobby, got {other:?}"),
        }
    }

    #[test]
    fn test_create_without_nickname_uses_placeholder() {
        let (registry, catalog) = setup();
        let game_id = match dispatch(&registry, &catalog, Request::CreateGame { nickname: None }) {
            Response::GameCreated { game_id, .. } => game_id,
            other => panic!("expected GameCreated, got {other:?}"),
        };
        let snapshot = registry.lobby(&game_id).unwrap();
        assert_eq!(snapshot.players[0].nickname, "Founder");
    }

    #[test]
    fn test_join_errors_map_to_status_codes() {
        let (registry, catalog) = setup();
        let game_id = create(&registry, &catalog);

        let missing = dispatch(
            &registry,
            &catalog,
            Request::JoinGame {
                game_id: game_id.clone(),
                nickname: None,
            },
        );
        assert_eq!(error_code(missing), 400);

        let unknown = dispatch(
            &registry,
            &catalog,
            Request::JoinGame {
                game_id: GameId::new("ffffffff"),
                nickname: Some("Bob".into()),
            },
        );
        assert_eq!(error_code(unknown), 404);

        let duplicate = dispatch(
            &registry,
            &catalog,
            Request::JoinGame {
                game_id,
                nickname: Some("Alice".into()),
            },
        );
        assert_eq!(error_code(duplicate), 400);
    }

    #[test]
    fn test_join_returns_fresh_player_id() {
        let (registry, catalog) = setup();
        let game_id = create(&registry, &catalog);

        match dispatch(
            &registry,
            &catalog,
            Request::JoinGame {
                game_id,
                nickname: Some("Bob".into()),
            },
        ) {
            Response::GameJoined { player_id } => assert_eq!(player_id.as_str().len(), 32),
            other => panic!("expected GameJoined, got {other:?}"),
        }
    }

    #[test]
    fn test_start_once_then_rejected() {
        let (registry, catalog) = setup();
        let game_id = create(&registry, &catalog);

        let first = dispatch(
            &registry,
            &catalog,
            Request::StartGame {
                game_id: game_id.clone(),
            },
        );
        assert_eq!(first, Response::GameStarted { success: true });

        let second = dispatch(&registry, &catalog, Request::StartGame { game_id });
        match second {
            Response::Error { code, message } => {
                assert_eq!(code, 400);
                assert!(message.contains("already started"));
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_game_lobby_and_start_are_404() {
        let (registry, catalog) = setup();
        let id = GameId::new("12345678");
        assert_eq!(
            error_code(dispatch(
                &registry,
                &catalog,
                Request::GetLobby {
                    game_id: id.clone()
                }
            )),
            404
        );
        assert_eq!(
            error_code(dispatch(&registry, &catalog, Request::StartGame { game_id: id })),
            404
        );
    }

    #[test]
    fn test_second_handshake_is_rejected() {
        let (registry, catalog) = setup();
        let response = dispatch(&registry, &catalog, Request::Handshake { version: 1 });
        assert_eq!(error_code(response), 400);
    }

    #[test]
    fn test_next_seq_increments() {
        let mut seq = 1;
        assert_eq!(next_seq(&mut seq), 1);
        assert_eq!(next_seq(&mut seq), 2);
        assert_eq!(seq, 3);
    }
}
