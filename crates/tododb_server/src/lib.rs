//! # TodoDB Server
//!
//! HTTP front end for a [`TodoRepository`](tododb_core::TodoRepository).
//!
//! | Verb & path | Repository call | Success |
//! |-------------|-----------------|---------|
//! | `GET /api/todos` | `get_all` | 200, array |
//! | `POST /api/todos` | `create` | 201, the todo |
//! | `GET /api/todos/:id` | `get_by_id` | 200, the todo |
//! | `PUT /api/todos/:id` | `update` | 200, the todo with the path id |
//! | `DELETE /api/todos/:id` | `delete` | 200, a message |
//! | `GET /health` | none | 200 |
//!
//! Repository errors map onto status codes in one place
//! ([`ApiError`]): not found is 404, invalid input is 400, and anything
//! else is a 500 whose cause is logged but never sent to the client.
//!
//! Repository calls block on file I/O, so handlers run them on Tokio's
//! blocking pool.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tododb_core::InMemoryTodoRepository;
//! use tododb_server::{build_router, AppState, ServerConfig};
//!
//! # async fn serve() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::default();
//! let app = build_router(AppState::new(Arc::new(InMemoryTodoRepository::new())), &config);
//! let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod app;
mod config;
mod error;
mod handlers;
mod shutdown;
mod state;

pub use app::build_router;
pub use config::{ServerConfig, DEFAULT_CORS_ORIGIN, DEFAULT_DATA_DIR};
pub use error::{ApiError, ApiResult};
pub use handlers::TodoBody;
pub use shutdown::shutdown_signal;
pub use state::AppState;
