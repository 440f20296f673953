//! Server configuration

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use ricochet_core::SessionSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the server
    pub bind_address: SocketAddr,
    /// Maximum simultaneous connections
    pub max_clients: usize,
    /// Network loop frequency
    pub tick_rate_hz: u32,
    /// Bidding countdown settings
    pub countdown: CountdownConfig,
    /// Rounds per game
    pub max_rounds: u32,
    /// Tile catalog to load instead of the embedded one
    pub catalog_path: Option<String>,
    /// Fixed RNG seed; random when unset
    pub seed: Option<u64>,
    /// Per-client inbound message limit
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 7878)),
            max_clients: 16,
            tick_rate_hz: 60,
            countdown: CountdownConfig::default(),
            max_rounds: 16,
            catalog_path: None,
            seed: None,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            countdown_start: self.countdown.start,
            max_rounds: self.max_rounds,
        }
    }

    /// Duration of one network tick; never zero.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.max(1)
    }
}

/// Bidding countdown configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// Units on the clock when the first bid lands
    pub start: u32,
    /// Length of one unit in milliseconds
    pub period_ms: u64,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            start: 60,
            period_ms: 1000,
        }
    }
}

impl CountdownConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms.max(1))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Messages allowed per window
    pub messages: u32,
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            messages: 30,
            window_ms: 1000,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}
