//! Engine configuration.

/// Options for opening a [`crate::Database`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Create the database directory if it does not exist.
    pub create_if_missing: bool,

    /// Refuse to open a directory that already holds a non-empty log.
    pub error_if_exists: bool,

    /// `sync()` the log on every commit, not only flush it.
    pub sync_on_commit: bool,

    /// Largest accepted key, in bytes.
    pub max_key_size: usize,
}

impl Config {
    /// Default for [`Config::max_key_size`].
    pub const DEFAULT_MAX_KEY_SIZE: usize = 65_000;

    /// Largest accepted value, in bytes.
    pub const MAX_VALUE_SIZE: usize = 1 << 30;

    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the database if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to fail when the database already exists.
    #[must_use]
    pub const fn error_if_exists(mut self, value: bool) -> Self {
        self.error_if_exists = value;
        self
    }

    /// Sets whether each commit is synced to durable media.
    #[must_use]
    pub const fn sync_on_commit(mut self, value: bool) -> Self {
        self.sync_on_commit = value;
        self
    }

    /// Sets the largest accepted key size.
    #[must_use]
    pub const fn max_key_size(mut self, size: usize) -> Self {
        self.max_key_size = size;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            error_if_exists: false,
            sync_on_commit: true,
            max_key_size: Self::DEFAULT_MAX_KEY_SIZE,
        }
    }
}
