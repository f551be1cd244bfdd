//! [`SqliteStore`], the SQLite implementation of [`TodoStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{Transaction, TransactionBehavior};

use twig_core::{
  Error as CoreError,
  guard::authorize,
  model::{
    ItemId, ItemPatch, ListId, ListPatch, NewItem, NewSession, NewUser, Placement, TodoItem,
    TodoList, User, UserId,
  },
  store::TodoStore,
};

use crate::{Result, accounts, schema::SCHEMA, tree};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Twig store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` in one transaction. It commits only if `f` succeeds; any error,
  /// domain or database, rolls everything back.
  async fn transact<T, F>(&self, behavior: TransactionBehavior, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(behavior)?;
        let out = f(&tx);
        if out.is_ok() {
          tx.commit()?;
        }
        Ok(out)
      })
      .await?
  }

  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
  {
    self.transact(TransactionBehavior::Deferred, f).await
  }

  /// Writes take the database lock up front so the guard and the change see
  /// the same state.
  async fn write<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
  {
    self.transact(TransactionBehavior::Immediate, f).await
  }
}

/// Load a list and check the caller owns it.
fn owned_list(tx: &Transaction<'_>, caller: UserId, list: ListId) -> Result<TodoList> {
  let found = tree::require_list(tx, list)?;
  authorize(caller, &found)?;
  Ok(found)
}

/// Resolve an item's owning list and check the caller owns it.
fn guard_item(tx: &Transaction<'_>, caller: UserId, item: ItemId) -> Result<ListId> {
  let ownership = tree::ownership_of_item(tx, item)?;
  authorize(caller, &ownership)?;
  Ok(ownership.list_id)
}

// ─── TodoStore impl ──────────────────────────────────────────────────────────

impl TodoStore for SqliteStore {
  type Error = crate::Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn register_user(&self, input: NewUser) -> Result<User> {
    self.write(move |tx| accounts::insert_user(tx, input, Utc::now())).await
  }

  async fn user_by_email(&self, email: String) -> Result<Option<User>> {
    self
      .read(move |tx| accounts::find_user_by_email(tx, email.trim()))
      .await
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    self.read(move |tx| accounts::find_user(tx, id)).await
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn open_session(&self, session: NewSession) -> Result<()> {
    self
      .write(move |tx| accounts::insert_session(tx, &session, Utc::now()))
      .await
  }

  async fn session_user(&self, token_digest: String) -> Result<Option<UserId>> {
    self
      .write(move |tx| accounts::session_user(tx, &token_digest, Utc::now()))
      .await
  }

  async fn close_session(&self, token_digest: String) -> Result<bool> {
    self
      .write(move |tx| accounts::delete_session(tx, &token_digest))
      .await
  }

  // ── Lists ─────────────────────────────────────────────────────────────────

  async fn create_list(&self, owner: UserId, title: String) -> Result<TodoList> {
    self
      .write(move |tx| tree::insert_list(tx, owner, &title, Utc::now()))
      .await
  }

  async fn lists_with_items(&self, owner: UserId) -> Result<(Vec<TodoList>, Vec<TodoItem>)> {
    self
      .read(move |tx| Ok((tree::lists_of_owner(tx, owner)?, tree::items_of_owner(tx, owner)?)))
      .await
  }

  async fn list_with_items(&self, caller: UserId, list: ListId) -> Result<(TodoList, Vec<TodoItem>)> {
    self
      .read(move |tx| {
        let found = owned_list(tx, caller, list)?;
        Ok((found, tree::items_of_list(tx, list)?))
      })
      .await
  }

  async fn update_list(&self, caller: UserId, list: ListId, patch: ListPatch) -> Result<TodoList> {
    self
      .write(move |tx| {
        owned_list(tx, caller, list)?;
        let patch = patch.validated()?;
        tree::update_list_row(tx, list, &patch)?;
        tree::require_list(tx, list)
      })
      .await
  }

  async fn delete_list(&self, caller: UserId, list: ListId) -> Result<usize> {
    self
      .write(move |tx| {
        owned_list(tx, caller, list)?;
        let removed = tree::delete_items_of_list(tx, list)?;
        tree::delete_list_row(tx, list)?;
        Ok(removed)
      })
      .await
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  async fn create_item(&self, caller: UserId, list: ListId, input: NewItem) -> Result<TodoItem> {
    self
      .write(move |tx| {
        owned_list(tx, caller, list)?;
        tree::insert_item(tx, list, &input.content, input.parent_id, Utc::now())
      })
      .await
  }

  async fn update_item(&self, caller: UserId, item: ItemId, patch: ItemPatch) -> Result<TodoItem> {
    self
      .write(move |tx| {
        guard_item(tx, caller, item)?;
        let patch = patch.validated()?;
        tree::update_item_row(tx, item, &patch)?;
        tree::require_item(tx, item)
      })
      .await
  }

  async fn toggle_item(&self, caller: UserId, item: ItemId) -> Result<TodoItem> {
    self
      .write(move |tx| {
        guard_item(tx, caller, item)?;
        let current = tree::require_item(tx, item)?;
        let patch = ItemPatch { content: None, completed: Some(!current.completed) };
        tree::update_item_row(tx, item, &patch)?;
        Ok(TodoItem { completed: !current.completed, ..current })
      })
      .await
  }

  async fn move_item(&self, caller: UserId, item: ItemId, to: Placement) -> Result<TodoItem> {
    self
      .write(move |tx| {
        let current_list = guard_item(tx, caller, item)?;

        let (parent, list) = match to {
          Placement::Under(parent) => {
            if parent == item {
              return Err(CoreError::Cycle { item, parent }.into());
            }
            let parent_list = guard_item(tx, caller, parent)?;
            if tree::descendants(tx, item)?.contains(&parent) {
              return Err(CoreError::Cycle { item, parent }.into());
            }
            (Some(parent), parent_list)
          }
          Placement::RootOf(list) => {
            owned_list(tx, caller, list)?;
            (None, list)
          }
          Placement::Root => (None, current_list),
        };

        tree::place_item(tx, item, parent, list)?;
        tree::require_item(tx, item)
      })
      .await
  }

  async fn delete_item(&self, caller: UserId, item: ItemId) -> Result<Vec<ItemId>> {
    self
      .write(move |tx| {
        guard_item(tx, caller, item)?;
        let mut removed = tree::delete_subtree(tx, item)?;
        tree::delete_item_row(tx, item)?;
        removed.push(item);
        Ok(removed)
      })
      .await
  }
}
