//! Handlers for item endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/list/{id}/add` | Body: `{"content","parent_id"?}`; 201 |
//! | `POST` | `/item/move` | Body: `{"item_id","new_parent_id"?,"list_id"?}` |
//! | `POST` | `/item/toggle/{id}` | Flips `completed` |
//! | `POST` | `/item/edit/{id}` | Body: `{"content"}` |
//! | `POST` | `/item/delete/{id}` | Removes the item and all its descendants |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use twig_core::{
  model::{ItemId, ItemPatch, ListId, NewItem, Placement},
  store::TodoStore,
};

use crate::{
  AppState,
  auth::CurrentUser,
  error::ApiError,
  extract::{JsonBody, PathParam},
};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewItemBody {
  pub content:   Option<String>,
  pub parent_id: Option<ItemId>,
}

/// `POST /list/{id}/add`: returns 201 + `{"success":true,"item_id":<id>}`.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  PathParam(list): PathParam<ListId>,
  JsonBody(body): JsonBody<NewItemBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TodoStore + Clone + 'static,
{
  let input = NewItem { content: body.content.unwrap_or_default(), parent_id: body.parent_id };
  let item = state
    .store
    .create_item(user.id, list, input)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(json!({ "success": true, "item_id": item.id }))))
}

// ─── Move ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MoveBody {
  pub item_id:       Option<ItemId>,
  /// New parent; the item joins the parent's list.
  pub new_parent_id: Option<ItemId>,
  /// Destination list when no parent is given; the item becomes a root there.
  pub list_id:       Option<ListId>,
}

impl MoveBody {
  fn placement(&self) -> Placement {
    match (self.new_parent_id, self.list_id) {
      (Some(parent), _) => Placement::Under(parent),
      (None, Some(list)) => Placement::RootOf(list),
      (None, None) => Placement::Root,
    }
  }
}

/// `POST /item/move`
pub async fn relocate<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  JsonBody(body): JsonBody<MoveBody>,
) -> Result<Json<Value>, ApiError>
where
  S: TodoStore + Clone + 'static,
{
  let Some(item) = body.item_id else {
    return Err(ApiError::BadRequest("item_id is required".into()));
  };
  state
    .store
    .move_item(user.id, item, body.placement())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({ "success": true })))
}

// ─── Toggle ───────────────────────────────────────────────────────────────────

/// `POST /item/toggle/{id}`
pub async fn toggle<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  PathParam(id): PathParam<ItemId>,
) -> Result<Json<Value>, ApiError>
where
  S: TodoStore + Clone + 'static,
{
  let item = state
    .store
    .toggle_item(user.id, id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({ "success": true, "completed": item.completed })))
}

// ─── Edit ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EditBody {
  pub content: Option<String>,
}

/// `POST /item/edit/{id}`
pub async fn edit<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  PathParam(id): PathParam<ItemId>,
  JsonBody(body): JsonBody<EditBody>,
) -> Result<Json<Value>, ApiError>
where
  S: TodoStore + Clone + 'static,
{
  let patch = ItemPatch { content: Some(body.content.unwrap_or_default()), completed: None };
  state
    .store
    .update_item(user.id, id, patch)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({ "success": true })))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `POST /item/delete/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  PathParam(id): PathParam<ItemId>,
) -> Result<Json<Value>, ApiError>
where
  S: TodoStore + Clone + 'static,
{
  let removed = state
    .store
    .delete_item(user.id, id)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(item_id = %id, removed = removed.len(), "item deleted");
  Ok(Json(json!({ "message": "Item deleted", "deleted": removed })))
}
