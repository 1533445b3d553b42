//! Server configuration.

/// Configuration for the sync server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum number of entries accepted in a posted client index.
    pub max_index_entries: usize,
    /// Revision-listing limit used when a request does not name one.
    pub default_revision_limit: usize,
}

impl ServerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            max_index_entries: 100_000,
            default_revision_limit: 50,
        }
    }

    /// Sets the maximum accepted client index size.
    pub fn with_max_index_entries(mut self, max: usize) -> Self {
        self.max_index_entries = max;
        self
    }

    /// Sets the default revision-listing limit.
    pub fn with_default_revision_limit(mut self, limit: usize) -> Self {
        self.default_revision_limit = limit;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}
