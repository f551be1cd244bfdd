//! Nested views of a list's items.
//!
//! Items are persisted as flat parent-linked rows. [`Forest`] indexes those
//! rows by id (an arena) with a parent → children index, and
//! [`Forest::serialize`] walks it to a fixed depth to produce the nested
//! [`ItemNode`] shape clients consume.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{ItemId, ListId, TodoItem, TodoList};

/// Depth used when the caller has no opinion. Roots are depth 1.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// One serialized item with its (possibly truncated) children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemNode {
  pub id:        ItemId,
  pub list_id:   ListId,
  pub content:   String,
  pub parent_id: Option<ItemId>,
  pub completed: bool,
  pub items:     Vec<ItemNode>,
}

/// A list together with its serialized forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTree {
  pub id:    ListId,
  pub title: String,
  pub items: Vec<ItemNode>,
}

// ─── Forest ──────────────────────────────────────────────────────────────────

/// Arena of items with root and child indexes, ordered by id.
#[derive(Debug, Default)]
pub struct Forest {
  items:    HashMap<ItemId, TodoItem>,
  roots:    Vec<ItemId>,
  children: HashMap<ItemId, Vec<ItemId>>,
}

impl Forest {
  pub fn new(items: impl IntoIterator<Item = TodoItem>) -> Self {
    let mut forest = Forest::default();
    for item in items {
      match item.parent_id {
        None => forest.roots.push(item.id),
        Some(parent) => forest.children.entry(parent).or_default().push(item.id),
      }
      forest.items.insert(item.id, item);
    }
    forest.roots.sort_unstable();
    for ids in forest.children.values_mut() {
      ids.sort_unstable();
    }
    forest
  }

  /// Serialize every root down to `max_depth` levels.
  ///
  /// An item at depth `max_depth` is emitted with an empty `items` even when
  /// it has descendants. Rows caught in a parent cycle are never reachable
  /// from a root, so they are left out rather than looped over.
  pub fn serialize(&self, max_depth: usize) -> Vec<ItemNode> {
    self.serialize_level(&self.roots, 1, max_depth)
  }

  fn serialize_level(&self, ids: &[ItemId], depth: usize, max_depth: usize) -> Vec<ItemNode> {
    if depth > max_depth {
      return Vec::new();
    }
    ids
      .iter()
      .filter_map(|id| self.items.get(id))
      .map(|item| {
        let kids = self.children.get(&item.id).map(Vec::as_slice).unwrap_or(&[]);
        ItemNode {
          id:        item.id,
          list_id:   item.list_id,
          content:   item.content.clone(),
          parent_id: item.parent_id,
          completed: item.completed,
          items:     self.serialize_level(kids, depth + 1, max_depth),
        }
      })
      .collect()
  }
}

/// Pair each list with the serialized forest of its items.
///
/// `items` may span several lists; rows whose list is not in `lists` are
/// ignored.
pub fn list_trees(lists: Vec<TodoList>, items: Vec<TodoItem>, max_depth: usize) -> Vec<ListTree> {
  let mut by_list: HashMap<ListId, Vec<TodoItem>> = HashMap::new();
  for item in items {
    by_list.entry(item.list_id).or_default().push(item);
  }
  lists
    .into_iter()
    .map(|list| {
      let forest = Forest::new(by_list.remove(&list.id).unwrap_or_default());
      ListTree { id: list.id, title: list.title, items: forest.serialize(max_depth) }
    })
    .collect()
}
