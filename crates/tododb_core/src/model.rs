//! The todo entity.

use crate::error::{RepoError, RepoResult};
use serde::{Deserialize, Serialize};

/// A todo item.
///
/// `id` is the storage key and never changes after creation. A stored todo
/// always has a non-blank `id` and `title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier, used verbatim as the storage key.
    pub id: String,
    /// What needs doing.
    pub title: String,
    /// Whether it is done.
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    /// Creates an open todo.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
        }
    }

    /// Returns the todo with `completed` set.
    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Checks the rules every stored todo must satisfy.
    ///
    /// The id is checked before the title.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::InvalidInput`] if the id or the title is empty
    /// after trimming whitespace.
    pub fn validate(&self) -> RepoResult<()> {
        validate_id(&self.id)?;
        if self.title.trim().is_empty() {
            return Err(RepoError::invalid_input("title cannot be empty"));
        }
        Ok(())
    }

    pub(crate) fn key(&self) -> &[u8] {
        self.id.as_bytes()
    }
}

/// Checks that `id` is not blank.
///
/// # Errors
///
/// Returns [`RepoError::InvalidInput`] if `id` is empty after trimming.
pub fn validate_id(id: &str) -> RepoResult<()> {
    if id.trim().is_empty() {
        return Err(RepoError::invalid_input("id cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_todo_passes() {
        assert!(Todo::new("1", "Buy milk").validate().is_ok());
        assert!(Todo::new(" 1 ", " Buy milk ").validate().is_ok());
    }

    #[test]
    fn blank_id_is_rejected_first() {
        let err = Todo::new("  ", "").validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid input: id cannot be empty");
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = Todo::new("1", "\t \n").validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid input: title cannot be empty");
    }

    #[test]
    fn validate_id_trims() {
        assert!(validate_id("").is_err());
        assert!(validate_id(" ").is_err());
        assert!(validate_id("a").is_ok());
    }

    #[test]
    fn key_is_raw_id_bytes() {
        let todo = Todo::new(" 7 ", "x");
        assert_eq!(todo.key(), b" 7 ");
    }

    #[test]
    fn builder_sets_completed() {
        let todo = Todo::new("1", "Buy milk").with_completed(true);
        assert!(todo.completed);
    }
}
