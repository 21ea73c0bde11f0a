//! # TodoDB Core
//!
//! The todo entity and the repositories that persist it.
//!
//! - [`Todo`] and its validation rules
//! - [`RepoError`], the three-way error taxonomy every repository reports
//! - [`TodoRepository`], the CRUD capability
//! - [`KvTodoRepository`], backed by the transactional engine in
//!   `tododb_kv`
//! - [`InMemoryTodoRepository`], a map behind a lock with the same
//!   observable behavior
//!
//! ```
//! use std::sync::Arc;
//! use tododb_core::{KvTodoRepository, Todo, TodoRepository};
//! use tododb_kv::Database;
//!
//! let db = Arc::new(Database::open_in_memory().unwrap());
//! let repo = KvTodoRepository::new(db);
//!
//! repo.create(&Todo::new("1", "Buy milk")).unwrap();
//! assert_eq!(repo.get_by_id("1").unwrap().title, "Buy milk");
//! assert!(repo.delete("2").unwrap_err().is_not_found());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod error;
mod model;
mod repository;

pub use codec::{decode_todo, encode_todo};
pub use error::{DatabaseCause, RepoError, RepoResult};
pub use model::{validate_id, Todo};
pub use repository::{InMemoryTodoRepository, KvTodoRepository, TodoRepository};
