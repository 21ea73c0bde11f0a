//! Transactions.
//!
//! - [`ReadTransaction`]: a snapshot of the last commit at the time it
//!   began. Any number may be open at once, and they never wait for writers.
//! - [`WriteTransaction`]: holds the single writer lock from begin until it
//!   commits, aborts or is dropped, so write transactions are serializable.
//!   Writes are buffered and reach the log only on commit.

mod manager;
mod read;
mod write;

pub(crate) use manager::TransactionManager;
pub use read::ReadTransaction;
pub use write::WriteTransaction;
