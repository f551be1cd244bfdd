//! Users and sessions over an open transaction.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, Transaction, params};
use twig_core::{
  Error as CoreError,
  model::{NewSession, NewUser, User, UserId, required, validate_email},
  username,
};

use crate::{
  Result,
  encode::{RawUser, USER_COLUMNS, decode_dt, encode_dt},
};

fn username_taken(tx: &Transaction<'_>, candidate: &str) -> Result<bool> {
  Ok(
    tx.query_row(
      "SELECT 1 FROM users WHERE username = ?1",
      params![candidate],
      |_| Ok(()),
    )
    .optional()?
    .is_some(),
  )
}

pub fn insert_user(tx: &Transaction<'_>, input: NewUser, now: DateTime<Utc>) -> Result<User> {
  let email = validate_email(&input.email)?;
  let name = required("name", &input.name)?;

  if find_user_by_email(tx, &email)?.is_some() {
    return Err(CoreError::EmailTaken(email).into());
  }

  let mut chosen = None;
  for candidate in username::candidates(&email, &name) {
    if !username_taken(tx, &candidate)? {
      chosen = Some(candidate);
      break;
    }
  }
  let username = chosen.unwrap_or_default();

  tx.execute(
    "INSERT INTO users (email, name, username, password_hash, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![email, name, username, input.password_hash, encode_dt(now)],
  )?;

  Ok(User {
    id: UserId(tx.last_insert_rowid()),
    email,
    name,
    username,
    password_hash: input.password_hash,
    created_at: now,
  })
}

pub fn find_user_by_email(tx: &Transaction<'_>, email: &str) -> Result<Option<User>> {
  let raw = tx
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
      params![email],
      RawUser::from_row,
    )
    .optional()?;
  raw.map(RawUser::into_user).transpose()
}

pub fn find_user(tx: &Transaction<'_>, id: UserId) -> Result<Option<User>> {
  let raw = tx
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
      params![id.0],
      RawUser::from_row,
    )
    .optional()?;
  raw.map(RawUser::into_user).transpose()
}

// ─── Sessions ────────────────────────────────────────────────────────────────

pub fn insert_session(tx: &Transaction<'_>, session: &NewSession, now: DateTime<Utc>) -> Result<()> {
  if find_user(tx, session.user_id)?.is_none() {
    return Err(CoreError::UserNotFound(session.user_id).into());
  }
  tx.execute(
    "INSERT INTO sessions (token_digest, user_id, created_at, expires_at)
     VALUES (?1, ?2, ?3, ?4)",
    params![
      session.token_digest,
      session.user_id.0,
      encode_dt(now),
      encode_dt(session.expires_at),
    ],
  )?;
  Ok(())
}

/// Resolve a live session; an expired one is removed and reported as absent.
pub fn session_user(tx: &Transaction<'_>, digest: &str, now: DateTime<Utc>) -> Result<Option<UserId>> {
  let row: Option<(i64, String)> = tx
    .query_row(
      "SELECT user_id, expires_at FROM sessions WHERE token_digest = ?1",
      params![digest],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .optional()?;

  let Some((user_id, expires_at)) = row else {
    return Ok(None);
  };
  if decode_dt(&expires_at)? <= now {
    delete_session(tx, digest)?;
    return Ok(None);
  }
  Ok(Some(UserId(user_id)))
}

pub fn delete_session(tx: &Transaction<'_>, digest: &str) -> Result<bool> {
  let removed = tx.execute("DELETE FROM sessions WHERE token_digest = ?1", params![digest])?;
  Ok(removed > 0)
}
