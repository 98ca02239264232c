//! `LobbyServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → handler → registry.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use partylobby_protocol::{Codec, JsonCodec};
use partylobby_registry::{LobbyRegistry, RegistryConfig, RoleAssignment};
use partylobby_transport::{Incoming, Transport, TransportError, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{LobbyError, RuleCatalog, ServerConfig};

/// Shared server state passed to each connection task.
///
/// Built once in [`LobbyServerBuilder::build`] and shared through an `Arc`.
/// The registry does its own locking, so nothing here is wrapped.
pub(crate) struct ServerState<R: RoleAssignment, C: Codec> {
    pub(crate) registry: LobbyRegistry<R>,
    pub(crate) catalog: RuleCatalog,
    pub(crate) codec: C,
    pub(crate) handshake_timeout: Duration,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a lobby server.
///
/// # Example
///
/// ```rust,no_run
/// use partylobby::prelude::*;
///
/// # async fn run() -> Result<(), LobbyError> {
/// let config = ServerConfig::load();
/// let catalog = RuleCatalog::load(&config.rules_path)?;
/// let server = LobbyServer::<DeferredRoles, JsonCodec>::builder()
///     .bind("127.0.0.1:9000")
///     .build::<DeferredRoles>(catalog)
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct LobbyServerBuilder {
    bind_addr: String,
    registry_config: RegistryConfig,
    handshake_timeout: Duration,
    idle_timeout: Duration,
}

impl LobbyServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(&ServerConfig::default())
    }

    /// Takes the listen address, timeouts and registry settings from a
    /// loaded [`ServerConfig`].
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            bind_addr: config.listen_addr.clone(),
            registry_config: config.registry.clone(),
            handshake_timeout: config.handshake_timeout(),
            idle_timeout: config.idle_timeout(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// How long a new connection may take to send its handshake.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// How long a connection may stay silent before it is closed.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Binds the listener and builds the server around a fresh registry.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`. `R` picks the role
    /// strategy applied when a game starts.
    pub async fn build<R: RoleAssignment>(
        self,
        catalog: RuleCatalog,
    ) -> Result<LobbyServer<R, JsonCodec>, LobbyError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: LobbyRegistry::new(self.registry_config),
            catalog,
            codec: JsonCodec,
            handshake_timeout: self.handshake_timeout,
            idle_timeout: self.idle_timeout,
        });

        Ok(LobbyServer { transport, state })
    }
}

impl Default for LobbyServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound lobby server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct LobbyServer<R: RoleAssignment, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<R, C>>,
}

impl<R, C> LobbyServer<R, C>
where
    R: RoleAssignment,
    C: Codec,
{
    /// Creates a new builder.
    pub fn builder() -> LobbyServerBuilder {
        LobbyServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, LobbyError> {
        Ok(self.transport.local_addr()?)
    }

    /// The registry behind this server.
    pub fn registry(&self) -> &LobbyRegistry<R> {
        &self.state.registry
    }

    /// Runs the accept loop until the process exits.
    pub async fn run(self) -> Result<(), LobbyError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `signal` resolves, then shuts the
    /// transport down.
    ///
    /// Each accepted socket gets its own task, which performs the WebSocket
    /// upgrade under the handshake timeout and then serves the connection.
    /// A peer that never finishes the upgrade only ties up its own task.
    /// Connections already open when the signal fires keep running until
    /// their clients leave or go idle.
    pub async fn run_until(
        mut self,
        signal: impl Future<Output = ()>,
    ) -> Result<(), LobbyError> {
        tracing::info!("lobby server running");
        tokio::pin!(signal);

        loop {
            tokio::select! {
                () = &mut signal => {
                    tracing::info!("shutdown requested, no longer accepting connections");
                    self.transport.shutdown().await?;
                    return Ok(());
                }
                accepted = self.transport.accept() => match accepted {
                    Ok(incoming) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            let peer = incoming.peer_addr();
                            let upgrade =
                                tokio::time::timeout(state.handshake_timeout, incoming.upgrade());
                            let conn = match upgrade.await {
                                Ok(Ok(conn)) => conn,
                                Ok(Err(e)) => {
                                    tracing::debug!(%peer, error = %e, "websocket upgrade failed");
                                    return;
                                }
                                Err(_) => {
                                    tracing::debug!(%peer, "websocket upgrade timed out");
                                    return;
                                }
                            };
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(TransportError::Shutdown) => return Ok(()),
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }
    }
}
