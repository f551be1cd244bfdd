//! SQLite backend for the Twig to-do store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every [`TodoStore`] call runs in a
//! single SQLite transaction.
//!
//! [`TodoStore`]: twig_core::store::TodoStore

mod accounts;
mod encode;
mod schema;
mod store;
mod tree;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
