//! Domain model for Twig: users, to-do lists, and the item forests inside
//! them.
//!
//! Nothing here talks to HTTP or SQL. Backends implement
//! [`store::TodoStore`]; the API crate is written against that trait.

pub mod error;
pub mod guard;
pub mod model;
pub mod store;
pub mod tree;
pub mod username;

pub use error::{DomainFailure, Error, Result};
