//! Error types for `twig-core`.

use thiserror::Error;

use crate::model::{ItemId, ListId, UserId};

/// Domain failures shared by every backend and surfaced to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("{0} is required")]
  Empty(&'static str),

  #[error("invalid {field}: {reason}")]
  Invalid {
    field:  &'static str,
    reason: String,
  },

  #[error("item {parent} belongs to list {parent_list}, not list {list}")]
  CrossList {
    parent:      ItemId,
    parent_list: ListId,
    list:        ListId,
  },

  #[error("item {item} cannot be placed under {parent}: that would create a cycle")]
  Cycle { item: ItemId, parent: ItemId },

  #[error("Unauthorized")]
  Forbidden,

  #[error("list not found: {0}")]
  ListNotFound(ListId),

  #[error("item not found: {0}")]
  ItemNotFound(ItemId),

  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("Email address already exists")]
  EmailTaken(String),
}

/// Coarse classification used when mapping errors onto a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  Unauthorized,
  NotFound,
  Conflict,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Empty(_)
      | Error::Invalid { .. }
      | Error::CrossList { .. }
      | Error::Cycle { .. } => ErrorKind::Validation,
      Error::Forbidden => ErrorKind::Unauthorized,
      Error::ListNotFound(_) | Error::ItemNotFound(_) | Error::UserNotFound(_) => {
        ErrorKind::NotFound
      }
      Error::EmailTaken(_) => ErrorKind::Conflict,
    }
  }
}

/// Recover the domain [`Error`] carried inside a backend error, if any.
///
/// Backends wrap domain failures next to their own I/O failures; callers that
/// need to tell a 404 from a disk error use this to look inside.
pub trait DomainFailure: Sized {
  fn into_domain(self) -> std::result::Result<Error, Self>;
}

impl DomainFailure for Error {
  fn into_domain(self) -> std::result::Result<Error, Self> { Ok(self) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
