//! The `TodoStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `twig-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  DomainFailure,
  model::{
    ItemId, ItemPatch, ListId, ListPatch, NewItem, NewSession, NewUser, Placement, TodoItem,
    TodoList, User, UserId,
  },
};

/// Abstraction over a Twig storage backend.
///
/// Every method that takes a `caller` resolves the owning list of its target
/// and runs [`guard::authorize`](crate::guard::authorize) before touching
/// anything, inside the same unit of work as the change itself. A denied call
/// fails with [`Error::Forbidden`](crate::Error::Forbidden) and leaves the
/// store as it was. Unknown ids fail with the matching `*NotFound` error.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TodoStore: Send + Sync {
  type Error: std::error::Error + DomainFailure + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Persist a new user, deriving a unique username.
  ///
  /// Fails with [`Error::EmailTaken`](crate::Error::EmailTaken) when the email
  /// is already registered.
  fn register_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn open_session(
    &self,
    session: NewSession,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The user behind a live session. Expired or unknown digests yield `None`.
  fn session_user(
    &self,
    token_digest: String,
  ) -> impl Future<Output = Result<Option<UserId>, Self::Error>> + Send + '_;

  /// Remove a session; `false` if it did not exist.
  fn close_session(
    &self,
    token_digest: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Lists ─────────────────────────────────────────────────────────────

  /// Create a list owned by `owner`. The title must not be blank.
  fn create_list(
    &self,
    owner: UserId,
    title: String,
  ) -> impl Future<Output = Result<TodoList, Self::Error>> + Send + '_;

  /// Every list `owner` has, with the flat item rows of all of them, read in
  /// one unit of work.
  fn lists_with_items(
    &self,
    owner: UserId,
  ) -> impl Future<Output = Result<(Vec<TodoList>, Vec<TodoItem>), Self::Error>> + Send + '_;

  /// One list and its flat item rows, read in one unit of work.
  fn list_with_items(
    &self,
    caller: UserId,
    list: ListId,
  ) -> impl Future<Output = Result<(TodoList, Vec<TodoItem>), Self::Error>> + Send + '_;

  fn update_list(
    &self,
    caller: UserId,
    list: ListId,
    patch: ListPatch,
  ) -> impl Future<Output = Result<TodoList, Self::Error>> + Send + '_;

  /// Delete a list and every item in it, at any depth. Returns the number of
  /// items removed.
  fn delete_list(
    &self,
    caller: UserId,
    list: ListId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Items ─────────────────────────────────────────────────────────────

  /// Add an item to `list`, optionally under a parent in the same list.
  fn create_item(
    &self,
    caller: UserId,
    list: ListId,
    input: NewItem,
  ) -> impl Future<Output = Result<TodoItem, Self::Error>> + Send + '_;

  fn update_item(
    &self,
    caller: UserId,
    item: ItemId,
    patch: ItemPatch,
  ) -> impl Future<Output = Result<TodoItem, Self::Error>> + Send + '_;

  /// Flip `completed` and return the updated row.
  fn toggle_item(
    &self,
    caller: UserId,
    item: ItemId,
  ) -> impl Future<Output = Result<TodoItem, Self::Error>> + Send + '_;

  /// Re-parent an item (and its subtree). The caller must own both the item
  /// and the destination. Moves that would create a cycle are rejected.
  fn move_item(
    &self,
    caller: UserId,
    item: ItemId,
    to: Placement,
  ) -> impl Future<Output = Result<TodoItem, Self::Error>> + Send + '_;

  /// Delete an item and all its descendants. Returns every id removed, the
  /// item itself last.
  fn delete_item(
    &self,
    caller: UserId,
    item: ItemId,
  ) -> impl Future<Output = Result<Vec<ItemId>, Self::Error>> + Send + '_;
}
