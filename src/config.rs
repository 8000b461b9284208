//! Server configuration
//!
//! Defaults can be overridden with `PAIRCHAT_*` environment variables.
//! The bind address can also be given as the first command line argument.

use std::time::Duration;

use crate::error::AppError;

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:3001";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to
    pub bind_addr: String,
    /// How long a search waits for a partner
    pub search_timeout: Duration,
    /// How often stale rooms are swept
    pub reap_interval: Duration,
    /// Rooms older than this are terminated by the sweep
    pub room_max_age: Duration,
    /// Channel buffer size for server commands
    pub command_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR.to_string(),
            search_timeout: Duration::from_secs(30),
            reap_interval: Duration::from_secs(5 * 60),
            room_max_age: Duration::from_secs(60 * 60),
            command_buffer: 256,
        }
    }
}

impl ServerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(addr) = lookup("PAIRCHAT_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(secs) = parse(&lookup, "PAIRCHAT_SEARCH_TIMEOUT_SECS")? {
            config.search_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse(&lookup, "PAIRCHAT_REAP_INTERVAL_SECS")? {
            config.reap_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse(&lookup, "PAIRCHAT_ROOM_MAX_AGE_SECS")? {
            config.room_max_age = Duration::from_secs(secs);
        }
        if let Some(size) = parse(&lookup, "PAIRCHAT_COMMAND_BUFFER")? {
            config.command_buffer = size as usize;
        }

        Ok(config)
    }
}

/// Parse a positive integer variable; unset means `None`
fn parse(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<u64>, AppError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(AppError::InvalidConfig { key, value: raw }),
    }
}
