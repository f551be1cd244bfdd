//! Ownership guard: ties a list or item back to the user who owns it.
//!
//! Backends resolve the owning list of a target (directly, or through an
//! item's `list_id`) and call [`authorize`] before any write. The check never
//! mutates anything.

use crate::{
  Error, Result,
  model::{ListId, TodoList, UserId},
};

/// Anything whose owner can be named.
pub trait Owned {
  fn owner_id(&self) -> UserId;
}

impl Owned for TodoList {
  fn owner_id(&self) -> UserId { self.owner_id }
}

/// The owning list of an item, as resolved by a backend join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
  pub list_id:  ListId,
  pub owner_id: UserId,
}

impl Owned for Ownership {
  fn owner_id(&self) -> UserId { self.owner_id }
}

/// `Ok(())` when `caller` owns `target`, otherwise [`Error::Forbidden`].
pub fn authorize<T: Owned + ?Sized>(caller: UserId, target: &T) -> Result<()> {
  if target.owner_id() == caller {
    Ok(())
  } else {
    Err(Error::Forbidden)
  }
}
