//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::actor::LeaderboardConfig;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8787;

/// Where the ranking table is persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Volatile, lost on restart
    Memory,
    /// One JSON file per key in this directory
    File(PathBuf),
}

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Leaderboard settings
    pub leaderboard: LeaderboardConfig,

    /// Persistence backend
    pub storage: StorageConfig,

    /// Maximum accepted HTTP request body
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            leaderboard: LeaderboardConfig::default(),
            storage: StorageConfig::Memory,
            max_body_bytes: 16 * 1024, // 16KB
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set leaderboard settings
    pub fn leaderboard(mut self, config: LeaderboardConfig) -> Self {
        self.leaderboard = config;
        self
    }

    /// Persist to files under `dir`
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage = StorageConfig::File(dir.into());
        self
    }

    /// Keep the table in memory only
    pub fn in_memory(mut self) -> Self {
        self.storage = StorageConfig::Memory;
        self
    }

    /// Set the maximum request body size
    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }
}
