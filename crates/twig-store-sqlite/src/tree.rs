//! Item tree primitives: lists and items over an open transaction.
//!
//! These functions do no authorization. [`crate::SqliteStore`] resolves the
//! owner and runs the guard first, then calls in here within the same
//! transaction.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, Transaction, params};
use twig_core::{
  Error as CoreError,
  guard::Ownership,
  model::{ItemId, ItemPatch, ListId, ListPatch, TodoItem, TodoList, UserId, required},
};

use crate::{
  Result,
  encode::{ITEM_COLUMNS, LIST_COLUMNS, RawItem, RawList, encode_dt},
};

// ─── Lists ───────────────────────────────────────────────────────────────────

pub fn insert_list(
  tx: &Transaction<'_>,
  owner: UserId,
  title: &str,
  now: DateTime<Utc>,
) -> Result<TodoList> {
  let title = required("title", title)?;
  tx.execute(
    "INSERT INTO todo_lists (title, owner_id, created_at) VALUES (?1, ?2, ?3)",
    params![title, owner.0, encode_dt(now)],
  )?;
  Ok(TodoList { id: ListId(tx.last_insert_rowid()), title, owner_id: owner, created_at: now })
}

pub fn find_list(tx: &Transaction<'_>, id: ListId) -> Result<Option<TodoList>> {
  let raw = tx
    .query_row(
      &format!("SELECT {LIST_COLUMNS} FROM todo_lists WHERE id = ?1"),
      params![id.0],
      RawList::from_row,
    )
    .optional()?;
  raw.map(RawList::into_list).transpose()
}

pub fn require_list(tx: &Transaction<'_>, id: ListId) -> Result<TodoList> {
  find_list(tx, id)?.ok_or_else(|| CoreError::ListNotFound(id).into())
}

pub fn lists_of_owner(tx: &Transaction<'_>, owner: UserId) -> Result<Vec<TodoList>> {
  let mut stmt = tx.prepare(&format!(
    "SELECT {LIST_COLUMNS} FROM todo_lists WHERE owner_id = ?1 ORDER BY id"
  ))?;
  let raws = stmt
    .query_map(params![owner.0], RawList::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawList::into_list).collect()
}

/// Apply the set fields of `patch`; unset fields are left alone.
pub fn update_list_row(tx: &Transaction<'_>, id: ListId, patch: &ListPatch) -> Result<()> {
  if let Some(title) = &patch.title {
    tx.execute("UPDATE todo_lists SET title = ?1 WHERE id = ?2", params![title, id.0])?;
  }
  Ok(())
}

/// Remove the list row only. Its items must already be gone.
pub fn delete_list_row(tx: &Transaction<'_>, id: ListId) -> Result<()> {
  tx.execute("DELETE FROM todo_lists WHERE id = ?1", params![id.0])?;
  Ok(())
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// Insert an item into `list`, under `parent` when given.
///
/// The parent must exist and live in the same list.
pub fn insert_item(
  tx: &Transaction<'_>,
  list: ListId,
  content: &str,
  parent: Option<ItemId>,
  now: DateTime<Utc>,
) -> Result<TodoItem> {
  let content = required("content", content)?;
  require_list(tx, list)?;
  if let Some(parent_id) = parent {
    let parent_item = require_item(tx, parent_id)?;
    if parent_item.list_id != list {
      return Err(
        CoreError::CrossList { parent: parent_id, parent_list: parent_item.list_id, list }.into(),
      );
    }
  }

  tx.execute(
    "INSERT INTO todo_items (content, completed, list_id, parent_id, created_at)
     VALUES (?1, 0, ?2, ?3, ?4)",
    params![content, list.0, parent.map(|p| p.0), encode_dt(now)],
  )?;
  Ok(TodoItem {
    id: ItemId(tx.last_insert_rowid()),
    list_id: list,
    parent_id: parent,
    content,
    completed: false,
    created_at: now,
  })
}

pub fn find_item(tx: &Transaction<'_>, id: ItemId) -> Result<Option<TodoItem>> {
  let raw = tx
    .query_row(
      &format!("SELECT {ITEM_COLUMNS} FROM todo_items WHERE id = ?1"),
      params![id.0],
      RawItem::from_row,
    )
    .optional()?;
  raw.map(RawItem::into_item).transpose()
}

pub fn require_item(tx: &Transaction<'_>, id: ItemId) -> Result<TodoItem> {
  find_item(tx, id)?.ok_or_else(|| CoreError::ItemNotFound(id).into())
}

/// The list an item belongs to and that list's owner.
pub fn ownership_of_item(tx: &Transaction<'_>, id: ItemId) -> Result<Ownership> {
  let row: Option<(i64, i64)> = tx
    .query_row(
      "SELECT l.id, l.owner_id
       FROM todo_items i
       JOIN todo_lists l ON l.id = i.list_id
       WHERE i.id = ?1",
      params![id.0],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .optional()?;
  let (list_id, owner_id) = row.ok_or(CoreError::ItemNotFound(id))?;
  Ok(Ownership { list_id: ListId(list_id), owner_id: UserId(owner_id) })
}

fn select_items(tx: &Transaction<'_>, filter: &str, arg: i64) -> Result<Vec<TodoItem>> {
  let mut stmt = tx.prepare(&format!(
    "SELECT {ITEM_COLUMNS} FROM todo_items WHERE {filter} ORDER BY id"
  ))?;
  let raws = stmt
    .query_map(params![arg], RawItem::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawItem::into_item).collect()
}

/// Direct children of `id`.
pub fn children_of(tx: &Transaction<'_>, id: ItemId) -> Result<Vec<TodoItem>> {
  select_items(tx, "parent_id = ?1", id.0)
}

/// Items of `list` without a parent.
pub fn roots_of(tx: &Transaction<'_>, list: ListId) -> Result<Vec<TodoItem>> {
  select_items(tx, "list_id = ?1 AND parent_id IS NULL", list.0)
}

pub fn items_of_list(tx: &Transaction<'_>, list: ListId) -> Result<Vec<TodoItem>> {
  select_items(tx, "list_id = ?1", list.0)
}

pub fn items_of_owner(tx: &Transaction<'_>, owner: UserId) -> Result<Vec<TodoItem>> {
  select_items(
    tx,
    "list_id IN (SELECT id FROM todo_lists WHERE owner_id = ?1)",
    owner.0,
  )
}

/// Apply the set fields of `patch`; unset fields are left alone.
pub fn update_item_row(tx: &Transaction<'_>, id: ItemId, patch: &ItemPatch) -> Result<()> {
  if let Some(content) = &patch.content {
    tx.execute("UPDATE todo_items SET content = ?1 WHERE id = ?2", params![content, id.0])?;
  }
  if let Some(completed) = patch.completed {
    tx.execute("UPDATE todo_items SET completed = ?1 WHERE id = ?2", params![completed, id.0])?;
  }
  Ok(())
}

/// Point `id` at a new parent and list, and carry its descendants over to
/// that list too.
pub fn place_item(
  tx: &Transaction<'_>,
  id: ItemId,
  parent: Option<ItemId>,
  list: ListId,
) -> Result<()> {
  tx.execute(
    "UPDATE todo_items SET parent_id = ?1, list_id = ?2 WHERE id = ?3",
    params![parent.map(|p| p.0), list.0, id.0],
  )?;
  for descendant in descendants(tx, id)? {
    tx.execute(
      "UPDATE todo_items SET list_id = ?1 WHERE id = ?2",
      params![list.0, descendant.0],
    )?;
  }
  Ok(())
}

/// Remove exactly one row. No cascade.
pub fn delete_item_row(tx: &Transaction<'_>, id: ItemId) -> Result<()> {
  tx.execute("DELETE FROM todo_items WHERE id = ?1", params![id.0])?;
  Ok(())
}

// ─── Subtrees ────────────────────────────────────────────────────────────────

/// Every item reachable from `id` through parent links, excluding `id`
/// itself, parents before children.
///
/// Not depth-bounded. A visited set stops the walk if stored data ever
/// contains a cycle.
pub fn descendants(tx: &Transaction<'_>, id: ItemId) -> Result<Vec<ItemId>> {
  let mut seen = HashSet::from([id]);
  let mut order = Vec::new();
  let mut cursor = 0;
  let mut frontier = vec![id];

  while cursor < frontier.len() {
    let current = frontier[cursor];
    cursor += 1;
    for child in children_of(tx, current)? {
      if seen.insert(child.id) {
        order.push(child.id);
        frontier.push(child.id);
      }
    }
  }
  Ok(order)
}

/// Delete every descendant of `id`, children before their parents. The item
/// itself is left for the caller. Returns the removed ids in deletion order.
pub fn delete_subtree(tx: &Transaction<'_>, id: ItemId) -> Result<Vec<ItemId>> {
  let mut doomed = descendants(tx, id)?;
  doomed.reverse();
  for item in &doomed {
    delete_item_row(tx, *item)?;
  }
  Ok(doomed)
}

/// Remove every item of `list` (all depths). Returns how many rows went.
pub fn delete_items_of_list(tx: &Transaction<'_>, list: ListId) -> Result<usize> {
  let mut removed = 0;
  for root in roots_of(tx, list)? {
    removed += delete_subtree(tx, root.id)?.len();
    delete_item_row(tx, root.id)?;
    removed += 1;
  }
  // Rows not reachable from a root (only possible with damaged data).
  removed += tx.execute("DELETE FROM todo_items WHERE list_id = ?1", params![list.0])?;
  Ok(removed)
}
