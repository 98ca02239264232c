//! Server configuration, loaded from `partylobby.toml` plus environment
//! overrides.

use std::time::Duration;

use partylobby_registry::RegistryConfig;
use serde::Deserialize;

use crate::LobbyError;

/// File read by [`ServerConfig::load`] from the working directory.
pub const CONFIG_FILE: &str = "partylobby.toml";

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub listen_addr: String,
    /// JSON file served by `ListRules`. Must exist at start-up.
    pub rules_path: String,
    /// Connections that send nothing for this long are closed.
    pub idle_timeout_secs: u64,
    /// How long a new connection has to send its handshake.
    pub handshake_timeout_secs: u64,
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            rules_path: "rules.json".to_string(),
            idle_timeout_secs: 60,
            handshake_timeout_secs: 5,
            registry: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads `partylobby.toml` if it exists, then applies environment
    /// variable overrides. A file that fails to parse is reported and
    /// ignored.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(cfg) => {
                    tracing::info!("loaded configuration from {CONFIG_FILE}");
                    cfg
                }
                Err(e) => {
                    tracing::warn!("failed to parse {CONFIG_FILE}: {e}, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("no {CONFIG_FILE} found, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies `PARTYLOBBY_*` overrides. `lookup` is `std::env::var` in
    /// production and a map in tests. Empty or unparsable values are
    /// skipped.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(addr) = non_empty("PARTYLOBBY_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Some(path) = non_empty("PARTYLOBBY_RULES_PATH") {
            self.rules_path = path;
        }
        if let Some(secs) = non_empty("PARTYLOBBY_IDLE_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.idle_timeout_secs = secs;
        }
        if let Some(secs) = non_empty("PARTYLOBBY_HANDSHAKE_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.handshake_timeout_secs = secs;
        }
        if let Some(name) = non_empty("PARTYLOBBY_DEFAULT_NICKNAME") {
            self.registry.default_nickname = name;
        }
    }

    /// Rejects settings the server can't run with.
    pub fn validate(&self) -> Result<(), LobbyError> {
        if self.idle_timeout_secs == 0 {
            return Err(LobbyError::Config("idle_timeout_secs must be > 0".into()));
        }
        if self.handshake_timeout_secs == 0 {
            return Err(LobbyError::Config(
                "handshake_timeout_secs must be > 0".into(),
            ));
        }
        if self.registry.default_nickname.is_empty() {
            return Err(LobbyError::Config(
                "registry.default_nickname must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }
}
