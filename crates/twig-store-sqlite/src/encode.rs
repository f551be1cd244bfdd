//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; ids as integers.

use chrono::{DateTime, Utc};
use twig_core::model::{ItemId, ListId, TodoItem, TodoList, User, UserId};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "id, email, name, username, password_hash, created_at";
pub const LIST_COLUMNS: &str = "id, title, owner_id, created_at";
pub const ITEM_COLUMNS: &str = "id, list_id, parent_id, content, completed, created_at";

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Row read from `users` before timestamp decoding.
pub struct RawUser {
  pub id:            i64,
  pub email:         String,
  pub name:          String,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  /// Expects the columns in [`USER_COLUMNS`] order.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawUser {
      id:            row.get(0)?,
      email:         row.get(1)?,
      name:          row.get(2)?,
      username:      row.get(3)?,
      password_hash: row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            UserId(self.id),
      email:         self.email,
      name:          self.name,
      username:      self.username,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawList {
  pub id:         i64,
  pub title:      String,
  pub owner_id:   i64,
  pub created_at: String,
}

impl RawList {
  /// Expects the columns in [`LIST_COLUMNS`] order.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawList {
      id:         row.get(0)?,
      title:      row.get(1)?,
      owner_id:   row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_list(self) -> Result<TodoList> {
    Ok(TodoList {
      id:         ListId(self.id),
      title:      self.title,
      owner_id:   UserId(self.owner_id),
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawItem {
  pub id:         i64,
  pub list_id:    i64,
  pub parent_id:  Option<i64>,
  pub content:    String,
  pub completed:  bool,
  pub created_at: String,
}

impl RawItem {
  /// Expects the columns in [`ITEM_COLUMNS`] order.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawItem {
      id:         row.get(0)?,
      list_id:    row.get(1)?,
      parent_id:  row.get(2)?,
      content:    row.get(3)?,
      completed:  row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_item(self) -> Result<TodoItem> {
    Ok(TodoItem {
      id:         ItemId(self.id),
      list_id:    ListId(self.list_id),
      parent_id:  self.parent_id.map(ItemId),
      content:    self.content,
      completed:  self.completed,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn datetimes_roundtrip_through_rfc3339() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }

  #[test]
  fn garbage_dates_are_reported() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
