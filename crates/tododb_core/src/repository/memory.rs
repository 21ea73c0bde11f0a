//! Map-backed repository.

use crate::error::{RepoError, RepoResult};
use crate::model::{validate_id, Todo};
use crate::repository::TodoRepository;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Keeps todos in a `BTreeMap` behind one lock.
///
/// Validation, messages and ordering match [`crate::KvTodoRepository`];
/// nothing is persisted and no `Database` error is ever returned.
#[derive(Debug, Default)]
pub struct InMemoryTodoRepository {
    todos: RwLock<BTreeMap<String, Todo>>,
}

impl InMemoryTodoRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TodoRepository for InMemoryTodoRepository {
    fn get_all(&self) -> RepoResult<Vec<Todo>> {
        Ok(self.todos.read().values().cloned().collect())
    }

    fn get_by_id(&self, id: &str) -> RepoResult<Todo> {
        validate_id(id)?;
        self.todos
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RepoError::not_found(id))
    }

    fn create(&self, todo: &Todo) -> RepoResult<()> {
        todo.validate()?;
        let mut todos = self.todos.write();
        if todos.contains_key(&todo.id) {
            return Err(RepoError::invalid_input("todo with this ID already exists"));
        }
        todos.insert(todo.id.clone(), todo.clone());
        Ok(())
    }

    fn update(&self, todo: &Todo) -> RepoResult<()> {
        todo.validate()?;
        match self.todos.write().get_mut(&todo.id) {
            Some(slot) => {
                *slot = todo.clone();
                Ok(())
            }
            None => Err(RepoError::not_found(&todo.id)),
        }
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        validate_id(id)?;
        self.todos
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found(id))
    }
}
