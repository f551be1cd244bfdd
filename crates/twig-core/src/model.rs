//! Users, lists, items and the inputs that create or change them.
//!
//! Rows refer to each other by id only. A list names its owner, an item names
//! its list and (optionally) its parent item; nothing holds a reference to
//! another row in memory.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Ids ─────────────────────────────────────────────────────────────────────

macro_rules! id_type {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
    }
  };
}

id_type!(
  /// Primary key of a row in `users`.
  UserId
);
id_type!(
  /// Primary key of a row in `todo_lists`.
  ListId
);
id_type!(
  /// Primary key of a row in `todo_items`.
  ItemId
);

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A registered account. The credential digest never leaves the server.
#[derive(Debug, Clone, Serialize)]
pub struct User {
  pub id:            UserId,
  pub email:         String,
  pub name:          String,
  pub username:      String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// A titled container of items owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
  pub id:         ListId,
  pub title:      String,
  pub owner_id:   UserId,
  pub created_at: DateTime<Utc>,
}

/// One node of a list's forest. `parent_id == None` marks a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
  pub id:         ItemId,
  pub list_id:    ListId,
  pub parent_id:  Option<ItemId>,
  pub content:    String,
  pub completed:  bool,
  pub created_at: DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Signup input. `password_hash` is already a PHC digest.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub name:          String,
  pub password_hash: String,
}

/// A server-side login session, keyed by the digest of the client's token.
#[derive(Debug, Clone)]
pub struct NewSession {
  pub token_digest: String,
  pub user_id:      UserId,
  pub expires_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewItem {
  pub content:   String,
  pub parent_id: Option<ItemId>,
}

/// Partial update of a list; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ListPatch {
  pub title: Option<String>,
}

/// Partial update of an item; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
  pub content:   Option<String>,
  pub completed: Option<bool>,
}

/// Where a moved item should end up. Its whole subtree moves with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
  /// Become a child of this item, joining its list.
  Under(ItemId),
  /// Become a root of this list.
  RootOf(ListId),
  /// Become a root of the list the item already belongs to.
  Root,
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Trim `value` and reject it when nothing is left.
pub fn required(field: &'static str, value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::Empty(field));
  }
  Ok(trimmed.to_owned())
}

/// Minimal shape check: `local@domain`, both parts non-empty.
pub fn validate_email(email: &str) -> Result<String> {
  let email = required("email", email)?;
  match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
    _ => Err(Error::Invalid {
      field:  "email",
      reason: "expected an address of the form name@domain".into(),
    }),
  }
}

impl ListPatch {
  pub fn validated(self) -> Result<Self> {
    Ok(Self { title: self.title.map(|t| required("title", &t)).transpose()? })
  }
}

impl ItemPatch {
  pub fn validated(self) -> Result<Self> {
    Ok(Self {
      content:   self.content.map(|c| required("content", &c)).transpose()?,
      completed: self.completed,
    })
  }
}
