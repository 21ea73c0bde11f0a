//! Shared handler state.

use std::sync::Arc;
use tododb_core::TodoRepository;

/// State cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// The repository behind every route.
    pub repo: Arc<dyn TodoRepository>,
}

impl AppState {
    /// Wraps a repository.
    pub fn new(repo: Arc<dyn TodoRepository>) -> Self {
        Self { repo }
    }
}
