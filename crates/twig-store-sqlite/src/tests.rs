//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use twig_core::{
  DomainFailure, Error as CoreError,
  model::{
    ItemId, ItemPatch, ListId, ListPatch, NewItem, NewSession, NewUser, Placement, TodoItem,
    UserId,
  },
  store::TodoStore,
  tree::{DEFAULT_MAX_DEPTH, Forest},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, email: &str) -> UserId {
  s.register_user(NewUser {
    email:         email.into(),
    name:          "Test User".into(),
    password_hash: "$argon2id$fake".into(),
  })
  .await
  .unwrap()
  .id
}

async fn add(s: &SqliteStore, owner: UserId, list: ListId, content: &str, parent: Option<ItemId>) -> TodoItem {
  s.create_item(owner, list, NewItem { content: content.into(), parent_id: parent })
    .await
    .unwrap()
}

/// Rows of one list, as the owner sees them.
async fn items(s: &SqliteStore, owner: UserId, list: ListId) -> Vec<TodoItem> {
  s.list_with_items(owner, list).await.unwrap().1
}

/// Look an item up among everything `owner` has.
async fn fetch(s: &SqliteStore, owner: UserId, id: ItemId) -> TodoItem {
  let (_, rows) = s.lists_with_items(owner).await.unwrap();
  rows.into_iter().find(|i| i.id == id).expect("item exists")
}

fn domain(e: Error) -> CoreError {
  e.into_domain().expect("expected a domain error")
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_lookup_user() {
  let s = store().await;
  let id = user(&s, "ada@example.com").await;

  let by_email = s.user_by_email("ada@example.com".into()).await.unwrap().unwrap();
  assert_eq!(by_email.id, id);
  assert_eq!(by_email.username, "ada");

  let by_id = s.get_user(id).await.unwrap().unwrap();
  assert_eq!(by_id.email, "ada@example.com");
  assert!(s.get_user(UserId(999)).await.unwrap().is_none());

  assert!(s.user_by_email("nobody@example.com".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
  let s = store().await;
  user(&s, "ada@example.com").await;

  let err = s
    .register_user(NewUser {
      email:         "ada@example.com".into(),
      name:          "Another Ada".into(),
      password_hash: "x".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(domain(err), CoreError::EmailTaken(_)));
}

#[tokio::test]
async fn username_collision_uses_name_with_counter() {
  let s = store().await;
  user(&s, "sam@one.example").await;
  let second = s
    .register_user(NewUser {
      email:         "sam@two.example".into(),
      name:          "Sam Smith".into(),
      password_hash: "x".into(),
    })
    .await
    .unwrap();
  assert_eq!(second.username, "samsmith1");
}

#[tokio::test]
async fn signup_requires_every_field() {
  let s = store().await;
  let err = s
    .register_user(NewUser { email: "a@b.c".into(), name: " ".into(), password_hash: "x".into() })
    .await
    .unwrap_err();
  assert_eq!(domain(err), CoreError::Empty("name"));
}

#[tokio::test]
async fn sessions_open_resolve_expire_and_close() {
  let s = store().await;
  let id = user(&s, "ada@example.com").await;

  s.open_session(NewSession {
    token_digest: "live".into(),
    user_id:      id,
    expires_at:   Utc::now() + Duration::hours(1),
  })
  .await
  .unwrap();
  s.open_session(NewSession {
    token_digest: "stale".into(),
    user_id:      id,
    expires_at:   Utc::now() - Duration::seconds(1),
  })
  .await
  .unwrap();

  assert_eq!(s.session_user("live".into()).await.unwrap(), Some(id));
  assert_eq!(s.session_user("stale".into()).await.unwrap(), None);
  assert_eq!(s.session_user("unknown".into()).await.unwrap(), None);

  assert!(s.close_session("live".into()).await.unwrap());
  assert!(!s.close_session("live".into()).await.unwrap());
  assert_eq!(s.session_user("live".into()).await.unwrap(), None);
}

// ─── Lists ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_list_lists() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let u2 = user(&s, "u2@example.com").await;

  let groceries = s.create_list(u1, "Groceries".into()).await.unwrap();
  s.create_list(u1, "Chores".into()).await.unwrap();
  s.create_list(u2, "Other".into()).await.unwrap();

  assert_eq!(groceries.owner_id, u1);
  let (mine, _) = s.lists_with_items(u1).await.unwrap();
  assert_eq!(mine.len(), 2);
  assert_eq!(mine[0].title, "Groceries");
}

#[tokio::test]
async fn blank_title_is_rejected() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let err = s.create_list(u1, "   ".into()).await.unwrap_err();
  assert_eq!(domain(err), CoreError::Empty("title"));
  assert!(s.lists_with_items(u1).await.unwrap().0.is_empty());
}

#[tokio::test]
async fn update_list_changes_only_given_fields() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let list = s.create_list(u1, "Groceries".into()).await.unwrap();

  let same = s.update_list(u1, list.id, ListPatch::default()).await.unwrap();
  assert_eq!(same.title, "Groceries");

  let renamed = s
    .update_list(u1, list.id, ListPatch { title: Some("Food".into()) })
    .await
    .unwrap();
  assert_eq!(renamed.title, "Food");
}

#[tokio::test]
async fn unknown_list_is_not_found() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let err = s.list_with_items(u1, ListId(404)).await.unwrap_err();
  assert_eq!(domain(err), CoreError::ListNotFound(ListId(404)));
}

#[tokio::test]
async fn delete_list_cascades_through_every_level() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let list = s.create_list(u1, "Deep".into()).await.unwrap();
  let keep = s.create_list(u1, "Keep".into()).await.unwrap();

  let a = add(&s, u1, list.id, "a", None).await;
  let b = add(&s, u1, list.id, "b", Some(a.id)).await;
  let c = add(&s, u1, list.id, "c", Some(b.id)).await;
  add(&s, u1, list.id, "d", Some(c.id)).await;
  add(&s, u1, list.id, "e", None).await;
  let kept = add(&s, u1, keep.id, "kept", None).await;

  let removed = s.delete_list(u1, list.id).await.unwrap();
  assert_eq!(removed, 5);

  let (lists, left) = s.lists_with_items(u1).await.unwrap();
  assert_eq!(lists.len(), 1);
  assert_eq!(left, vec![kept]);
}

// ─── Items ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn groceries_scenario_serializes_nested() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let list = s.create_list(u1, "Groceries".into()).await.unwrap();
  let milk = add(&s, u1, list.id, "Milk", None).await;
  add(&s, u1, list.id, "2%", Some(milk.id)).await;

  let rows = items(&s, u1, list.id).await;
  let nodes = Forest::new(rows).serialize(DEFAULT_MAX_DEPTH);
  assert_eq!(nodes.len(), 1);
  assert_eq!(nodes[0].content, "Milk");
  assert_eq!(nodes[0].items.len(), 1);
  assert_eq!(nodes[0].items[0].content, "2%");
  assert!(nodes[0].items[0].items.is_empty());
}

#[tokio::test]
async fn create_item_validates_input() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let list = s.create_list(u1, "L".into()).await.unwrap();
  let other = s.create_list(u1, "M".into()).await.unwrap();
  let foreign_parent = add(&s, u1, other.id, "elsewhere", None).await;

  let empty = s
    .create_item(u1, list.id, NewItem { content: "".into(), parent_id: None })
    .await
    .unwrap_err();
  assert_eq!(domain(empty), CoreError::Empty("content"));

  let missing_list = s
    .create_item(u1, ListId(999), NewItem { content: "x".into(), parent_id: None })
    .await
    .unwrap_err();
  assert_eq!(domain(missing_list), CoreError::ListNotFound(ListId(999)));

  let missing_parent = s
    .create_item(u1, list.id, NewItem { content: "x".into(), parent_id: Some(ItemId(999)) })
    .await
    .unwrap_err();
  assert_eq!(domain(missing_parent), CoreError::ItemNotFound(ItemId(999)));

  let cross = s
    .create_item(u1, list.id, NewItem { content: "x".into(), parent_id: Some(foreign_parent.id) })
    .await
    .unwrap_err();
  assert!(matches!(domain(cross), CoreError::CrossList { .. }));

  assert!(items(&s, u1, list.id).await.is_empty());
}

#[tokio::test]
async fn toggle_twice_restores_state() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let list = s.create_list(u1, "L".into()).await.unwrap();
  let item = add(&s, u1, list.id, "x", None).await;
  assert!(!item.completed);

  let once = s.toggle_item(u1, item.id).await.unwrap();
  assert!(once.completed);
  let twice = s.toggle_item(u1, item.id).await.unwrap();
  assert!(!twice.completed);
  assert_eq!(fetch(&s, u1, item.id).await.completed, false);
}

#[tokio::test]
async fn update_item_is_partial() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let list = s.create_list(u1, "L".into()).await.unwrap();
  let item = add(&s, u1, list.id, "before", None).await;

  let edited = s
    .update_item(u1, item.id, ItemPatch { content: Some("after".into()), completed: None })
    .await
    .unwrap();
  assert_eq!(edited.content, "after");
  assert!(!edited.completed);

  let err = s
    .update_item(u1, item.id, ItemPatch { content: Some("  ".into()), completed: None })
    .await
    .unwrap_err();
  assert_eq!(domain(err), CoreError::Empty("content"));
  assert_eq!(fetch(&s, u1, item.id).await.content, "after");
}

#[tokio::test]
async fn delete_item_removes_exactly_its_subtree() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let list = s.create_list(u1, "L".into()).await.unwrap();

  let milk = add(&s, u1, list.id, "Milk", None).await;
  let two = add(&s, u1, list.id, "2%", Some(milk.id)).await;
  let brand = add(&s, u1, list.id, "brand", Some(two.id)).await;
  let skim = add(&s, u1, list.id, "skim", Some(milk.id)).await;
  let bread = add(&s, u1, list.id, "Bread", None).await;
  let rye = add(&s, u1, list.id, "rye", Some(bread.id)).await;

  let mut removed = s.delete_item(u1, milk.id).await.unwrap();
  assert_eq!(removed.last(), Some(&milk.id));
  removed.sort();
  assert_eq!(removed, vec![milk.id, two.id, brand.id, skim.id]);

  let left: Vec<_> = items(&s, u1, list.id)
    .await
    .into_iter()
    .map(|i| i.id)
    .collect();
  assert_eq!(left, vec![bread.id, rye.id]);
}

#[tokio::test]
async fn delete_unknown_item_is_not_found() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let err = s.delete_item(u1, ItemId(77)).await.unwrap_err();
  assert_eq!(domain(err), CoreError::ItemNotFound(ItemId(77)));
}

// ─── Moves ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn move_under_new_parent_and_back_to_root() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let list = s.create_list(u1, "L".into()).await.unwrap();
  let a = add(&s, u1, list.id, "a", None).await;
  let b = add(&s, u1, list.id, "b", None).await;

  let moved = s.move_item(u1, b.id, Placement::Under(a.id)).await.unwrap();
  assert_eq!(moved.parent_id, Some(a.id));

  let back = s.move_item(u1, b.id, Placement::Root).await.unwrap();
  assert_eq!(back.parent_id, None);
  assert_eq!(back.list_id, list.id);
}

#[tokio::test]
async fn move_rejects_cycles() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let list = s.create_list(u1, "L".into()).await.unwrap();
  let a = add(&s, u1, list.id, "a", None).await;
  let b = add(&s, u1, list.id, "b", Some(a.id)).await;
  let c = add(&s, u1, list.id, "c", Some(b.id)).await;

  let onto_self = s.move_item(u1, a.id, Placement::Under(a.id)).await.unwrap_err();
  assert!(matches!(domain(onto_self), CoreError::Cycle { .. }));

  let onto_grandchild = s.move_item(u1, a.id, Placement::Under(c.id)).await.unwrap_err();
  assert!(matches!(domain(onto_grandchild), CoreError::Cycle { .. }));

  assert_eq!(fetch(&s, u1, a.id).await.parent_id, None);
}

#[tokio::test]
async fn moving_to_another_list_carries_the_subtree() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let from = s.create_list(u1, "From".into()).await.unwrap();
  let to = s.create_list(u1, "To".into()).await.unwrap();
  let a = add(&s, u1, from.id, "a", None).await;
  let b = add(&s, u1, from.id, "b", Some(a.id)).await;
  let anchor = add(&s, u1, to.id, "anchor", None).await;

  let moved = s.move_item(u1, a.id, Placement::Under(anchor.id)).await.unwrap();
  assert_eq!(moved.list_id, to.id);
  assert_eq!(fetch(&s, u1, b.id).await.list_id, to.id);
  assert!(items(&s, u1, from.id).await.is_empty());

  let rooted = s.move_item(u1, a.id, Placement::RootOf(from.id)).await.unwrap();
  assert_eq!(rooted.list_id, from.id);
  assert_eq!(rooted.parent_id, None);
  assert_eq!(fetch(&s, u1, b.id).await.list_id, from.id);
}

// ─── Ownership guard ─────────────────────────────────────────────────────────

#[tokio::test]
async fn strangers_cannot_touch_anything_and_nothing_changes() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let u2 = user(&s, "u2@example.com").await;
  let list = s.create_list(u1, "Groceries".into()).await.unwrap();
  let milk = add(&s, u1, list.id, "Milk", None).await;
  let two = add(&s, u1, list.id, "2%", Some(milk.id)).await;
  let theirs = s.create_list(u2, "Mine".into()).await.unwrap();
  let their_item = add(&s, u2, theirs.id, "t", None).await;

  let before = items(&s, u1, list.id).await;

  let denied = [
    s.list_with_items(u2, list.id).await.map(|_| ()),
    s.update_list(u2, list.id, ListPatch { title: Some("pwned".into()) }).await.map(|_| ()),
    s.delete_list(u2, list.id).await.map(|_| ()),
    s.create_item(u2, list.id, NewItem { content: "x".into(), parent_id: None }).await.map(|_| ()),
    s.update_item(u2, milk.id, ItemPatch { content: Some("x".into()), completed: None }).await.map(|_| ()),
    s.toggle_item(u2, milk.id).await.map(|_| ()),
    s.move_item(u2, two.id, Placement::Root).await.map(|_| ()),
    s.move_item(u2, their_item.id, Placement::Under(milk.id)).await.map(|_| ()),
    s.move_item(u2, their_item.id, Placement::RootOf(list.id)).await.map(|_| ()),
    s.delete_item(u2, milk.id).await.map(|_| ()),
  ];
  for (i, outcome) in denied.into_iter().enumerate() {
    let err = outcome.expect_err(&format!("operation {i} should be denied"));
    assert_eq!(domain(err), CoreError::Forbidden, "operation {i}");
  }

  assert_eq!(items(&s, u1, list.id).await, before);
  assert_eq!(s.list_with_items(u1, list.id).await.unwrap().0.title, "Groceries");
  assert_eq!(fetch(&s, u2, their_item.id).await.list_id, theirs.id);
}

// ─── Snapshots ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn snapshots_pair_lists_with_their_current_rows() {
  let s = store().await;
  let u1 = user(&s, "u1@example.com").await;
  let from = s.create_list(u1, "From".into()).await.unwrap();
  let to = s.create_list(u1, "To".into()).await.unwrap();
  let a = add(&s, u1, from.id, "a", None).await;
  let b = add(&s, u1, from.id, "b", Some(a.id)).await;
  s.move_item(u1, a.id, Placement::RootOf(to.id)).await.unwrap();

  let (list, rows) = s.list_with_items(u1, to.id).await.unwrap();
  assert_eq!(list.id, to.id);
  assert!(rows.iter().all(|i| i.list_id == to.id));
  assert_eq!(rows.iter().map(|i| i.id).collect::<Vec<_>>(), vec![a.id, b.id]);

  let (lists, all) = s.lists_with_items(u1).await.unwrap();
  assert_eq!(lists.iter().map(|l| l.id).collect::<Vec<_>>(), vec![from.id, to.id]);
  assert_eq!(all.len(), 2);
  assert!(all.iter().all(|i| lists.iter().any(|l| l.id == i.list_id)));
}
