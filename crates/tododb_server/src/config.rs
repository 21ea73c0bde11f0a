//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use tododb_kv::Config;

/// Where the database lives unless told otherwise.
pub const DEFAULT_DATA_DIR: &str = "data/todos.db";

/// The browser origin allowed unless told otherwise.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Database directory.
    pub data_dir: PathBuf,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Whether each commit is synced to disk before it is acknowledged.
    pub sync_on_commit: bool,
}

impl ServerConfig {
    /// Creates a configuration bound to `bind_addr` with every other field
    /// at its default.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            sync_on_commit: true,
        }
    }

    /// Sets the database directory.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Replaces the allowed CORS origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Sets whether commits are synced to disk.
    pub fn with_sync_on_commit(mut self, sync: bool) -> Self {
        self.sync_on_commit = sync;
        self
    }

    /// The engine configuration this server opens its database with.
    ///
    /// The directory is created on first start.
    pub fn engine_config(&self) -> Config {
        Config::default()
            .create_if_missing(true)
            .sync_on_commit(self.sync_on_commit)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 8080)))
    }
}
