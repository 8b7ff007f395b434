use crate::feed::{FeedMode, FeedVariant};
use crate::gateway::{DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};
use crate::socket::{DEFAULT_SOCKET_NAME, MAX_SOCKET_NAME_LEN};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_SOCKET_PORT: u16 = 1;
pub const DEFAULT_TICK_MS: u64 = 250;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("socket name '{0}' must be 1..={max} characters", max = MAX_SOCKET_NAME_LEN)]
    InvalidName(String),
    #[error("low threshold {low} is above high threshold {high}")]
    InvalidThresholds { low: u16, high: u16 },
    #[error("feed tick period must be at least 1 ms")]
    InvalidTickPeriod,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoteflowConfig {
    pub socket: SocketConfig,
    pub feed: FeedConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketConfig {
    /// Prefix of every line the socket renders.
    pub name: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub variant: FeedVariant,
    pub mode: FeedMode,
    pub tick_ms: u64,
    /// Number of ticks the simulator runs before stopping; unbounded when
    /// absent.
    pub max_ticks: Option<u64>,
    /// Fixed seed for random samples; entropy-seeded when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub low_threshold: u16,
    pub high_threshold: u16,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SOCKET_NAME.into(),
            port: DEFAULT_SOCKET_PORT,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            variant: FeedVariant::One,
            mode: FeedMode::Alternating,
            tick_ms: DEFAULT_TICK_MS,
            max_ticks: None,
            seed: None,
        }
    }
}

impl FeedConfig {
    pub fn tick_budget_spent(&self, ticks: u64) -> bool {
        self.max_ticks.is_some_and(|max| ticks >= max)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            low_threshold: DEFAULT_LOW_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
        }
    }
}

impl MoteflowConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let name_len = self.socket.name.len();
        if name_len == 0 || name_len > MAX_SOCKET_NAME_LEN {
            return Err(ConfigError::InvalidName(self.socket.name.clone()));
        }
        if self.feed.tick_ms == 0 {
            return Err(ConfigError::InvalidTickPeriod);
        }
        if self.gateway.low_threshold > self.gateway.high_threshold {
            return Err(ConfigError::InvalidThresholds {
                low: self.gateway.low_threshold,
                high: self.gateway.high_threshold,
            });
        }
        Ok(())
    }
}
