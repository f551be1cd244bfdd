//! SQL schema for the Twig SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE,
    name          TEXT NOT NULL,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,      -- argon2 PHC string
    created_at    TEXT NOT NULL       -- RFC 3339 UTC
);

-- Only the SHA-256 digest of a session token is kept.
CREATE TABLE IF NOT EXISTS sessions (
    token_digest TEXT PRIMARY KEY,
    user_id      INTEGER NOT NULL REFERENCES users(id),
    created_at   TEXT NOT NULL,
    expires_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS todo_lists (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    title      TEXT NOT NULL,
    owner_id   INTEGER NOT NULL REFERENCES users(id),
    created_at TEXT NOT NULL
);

-- parent_id is checked at commit so a subtree can be removed in any order
-- within one transaction.
CREATE TABLE IF NOT EXISTS todo_items (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    content    TEXT NOT NULL,
    completed  INTEGER NOT NULL DEFAULT 0,
    list_id    INTEGER NOT NULL REFERENCES todo_lists(id),
    parent_id  INTEGER REFERENCES todo_items(id) DEFERRABLE INITIALLY DEFERRED,
    created_at TEXT NOT NULL,
    CHECK (parent_id IS NULL OR parent_id != id)
);

CREATE INDEX IF NOT EXISTS sessions_user_idx ON sessions(user_id);
CREATE INDEX IF NOT EXISTS lists_owner_idx   ON todo_lists(owner_id);
CREATE INDEX IF NOT EXISTS items_list_idx    ON todo_items(list_id);
CREATE INDEX IF NOT EXISTS items_parent_idx  ON todo_items(parent_id);

PRAGMA user_version = 1;
";
