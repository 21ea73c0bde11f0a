//! The repository capability and its implementations.

mod kv;
mod memory;

pub use kv::KvTodoRepository;
pub use memory::InMemoryTodoRepository;

use crate::error::RepoResult;
use crate::model::Todo;

/// CRUD over todos.
///
/// Implementations must report failures with exactly these kinds:
///
/// | Operation | `InvalidInput` | `NotFound` | `Database` |
/// |-----------|----------------|------------|------------|
/// | `get_all` | - | - | yes |
/// | `get_by_id` | blank id | absent | yes |
/// | `create` | blank field, id taken | - | yes |
/// | `update` | blank field | absent | yes |
/// | `delete` | blank id | absent | yes |
///
/// Mutations check existence and write atomically: two concurrent creates
/// of one id never both succeed. All methods block; async callers should
/// run them on a blocking thread.
pub trait TodoRepository: Send + Sync {
    /// Every todo, in ascending id byte order. Never partial.
    ///
    /// # Errors
    ///
    /// `Database("GetAll")` if the store cannot be read,
    /// `Database("GetAll.Unmarshal")` if any record fails to decode.
    fn get_all(&self) -> RepoResult<Vec<Todo>>;

    /// The todo stored under `id`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a blank id, `NotFound` if absent,
    /// `Database("GetByID")` otherwise.
    fn get_by_id(&self, id: &str) -> RepoResult<Todo>;

    /// Stores a new todo.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if validation fails or the id already exists;
    /// `Database("Create.Marshal" | "Create.Check" | "Create")` otherwise.
    fn create(&self, todo: &Todo) -> RepoResult<()>;

    /// Replaces the todo with `todo.id`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if validation fails, `NotFound` if absent;
    /// `Database("Update.Marshal" | "Update.Check" | "Update")` otherwise.
    fn update(&self, todo: &Todo) -> RepoResult<()>;

    /// Removes the todo with `id`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a blank id, `NotFound` if absent;
    /// `Database("Delete.Check" | "Delete")` otherwise.
    fn delete(&self, id: &str) -> RepoResult<()>;
}
