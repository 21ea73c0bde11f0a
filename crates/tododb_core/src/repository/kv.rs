//! Engine-backed repository.

use crate::codec::{decode_todo, encode_todo};
use crate::error::{DatabaseCause, RepoError, RepoResult};
use crate::model::{validate_id, Todo};
use crate::repository::TodoRepository;
use std::sync::Arc;
use tododb_kv::Database;

/// Stores each todo as one key (the id bytes) in a [`Database`].
///
/// Reads run in snapshot read transactions. Each mutation runs its
/// existence check and its write in one write transaction; any early
/// return drops the transaction, which aborts it.
#[derive(Debug, Clone)]
pub struct KvTodoRepository {
    db: Arc<Database>,
}

impl KvTodoRepository {
    /// Wraps an open database. Closing it stays with the caller.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The underlying database.
    #[must_use]
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }
}

fn db_error(op: &'static str, cause: impl Into<DatabaseCause>) -> RepoError {
    let err = RepoError::database(op, cause);
    tracing::warn!(error = %err, "repository operation failed");
    err
}

impl TodoRepository for KvTodoRepository {
    fn get_all(&self) -> RepoResult<Vec<Todo>> {
        let pairs = self
            .db
            .begin_read()
            .and_then(|txn| txn.scan())
            .map_err(|e| db_error("GetAll", e))?;

        pairs
            .iter()
            .map(|(_, value)| {
                decode_todo(value)
                    .map_err(|e| db_error("GetAll.Unmarshal", DatabaseCause::Codec(e)))
            })
            .collect()
    }

    fn get_by_id(&self, id: &str) -> RepoResult<Todo> {
        validate_id(id)?;

        let value = self
            .db
            .begin_read()
            .and_then(|txn| txn.get(id.as_bytes()))
            .map_err(|e| db_error("GetByID", e))?;

        match value {
            Some(bytes) => {
                decode_todo(&bytes).map_err(|e| db_error("GetByID", DatabaseCause::Codec(e)))
            }
            None => Err(RepoError::not_found(id)),
        }
    }

    fn create(&self, todo: &Todo) -> RepoResult<()> {
        todo.validate()?;
        let bytes = encode_todo(todo)
            .map_err(|e| db_error("Create.Marshal", DatabaseCause::Codec(e)))?;

        let mut txn = self.db.begin_write().map_err(|e| db_error("Create", e))?;
        if txn.contains(todo.key()).map_err(|e| db_error("Create.Check", e))? {
            return Err(RepoError::invalid_input("todo with this ID already exists"));
        }
        txn.put(todo.key(), bytes).map_err(|e| db_error("Create", e))?;
        let seq = txn.commit().map_err(|e| db_error("Create", e))?;

        tracing::debug!(id = %todo.id, %seq, "created todo");
        Ok(())
    }

    fn update(&self, todo: &Todo) -> RepoResult<()> {
        todo.validate()?;
        let bytes = encode_todo(todo)
            .map_err(|e| db_error("Update.Marshal", DatabaseCause::Codec(e)))?;

        let mut txn = self.db.begin_write().map_err(|e| db_error("Update", e))?;
        if !txn.contains(todo.key()).map_err(|e| db_error("Update.Check", e))? {
            return Err(RepoError::not_found(&todo.id));
        }
        txn.put(todo.key(), bytes).map_err(|e| db_error("Update", e))?;
        let seq = txn.commit().map_err(|e| db_error("Update", e))?;

        tracing::debug!(id = %todo.id, %seq, "updated todo");
        Ok(())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        validate_id(id)?;

        let mut txn = self.db.begin_write().map_err(|e| db_error("Delete", e))?;
        if !txn.contains(id.as_bytes()).map_err(|e| db_error("Delete.Check", e))? {
            return Err(RepoError::not_found(id));
        }
        txn.delete(id.as_bytes()).map_err(|e| db_error("Delete", e))?;
        let seq = txn.commit().map_err(|e| db_error("Delete", e))?;

        tracing::debug!(id, %seq, "deleted todo");
        Ok(())
    }
}
