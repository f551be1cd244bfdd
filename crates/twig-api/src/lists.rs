//! Handlers for `/list` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/list` | Every list of the caller with its nested items |
//! | `POST` | `/list/add` | Body: `{"title":"..."}`; 201 |
//! | `GET`  | `/list/{id}` | One list with its nested items |
//! | `POST` | `/list/{id}/edit` | Body: `{"title":"..."}` |
//! | `POST` | `/list/{id}/delete` | Removes the list and every item in it |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use twig_core::{
  model::{ListId, ListPatch},
  store::TodoStore,
  tree::{Forest, ListTree, list_trees},
};

use crate::{
  AppState,
  auth::CurrentUser,
  error::ApiError,
  extract::{JsonBody, PathParam},
};

#[derive(Debug, Serialize)]
pub struct ListsResponse {
  pub lists: Vec<ListTree>,
}

#[derive(Debug, Deserialize)]
pub struct TitleBody {
  pub title: Option<String>,
}

// ─── Index ────────────────────────────────────────────────────────────────────

/// `GET /list`
pub async fn index<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Json<ListsResponse>, ApiError>
where
  S: TodoStore + Clone + 'static,
{
  let (lists, items) = state
    .store
    .lists_with_items(user.id)
    .await
    .map_err(ApiError::from_store)?;

  Ok(Json(ListsResponse { lists: list_trees(lists, items, state.config.max_tree_depth) }))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /list/add`: returns 201 + `{"success":true,"list_id":<id>}`.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  JsonBody(body): JsonBody<TitleBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TodoStore + Clone + 'static,
{
  let list = state
    .store
    .create_list(user.id, body.title.unwrap_or_default())
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(json!({ "success": true, "list_id": list.id }))))
}

// ─── Show ─────────────────────────────────────────────────────────────────────

/// `GET /list/{id}`
pub async fn show<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  PathParam(id): PathParam<ListId>,
) -> Result<Json<ListTree>, ApiError>
where
  S: TodoStore + Clone + 'static,
{
  let (list, items) = state
    .store
    .list_with_items(user.id, id)
    .await
    .map_err(ApiError::from_store)?;

  Ok(Json(ListTree {
    id:    list.id,
    title: list.title,
    items: Forest::new(items).serialize(state.config.max_tree_depth),
  }))
}

// ─── Rename ───────────────────────────────────────────────────────────────────

/// `POST /list/{id}/edit`
pub async fn rename<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  PathParam(id): PathParam<ListId>,
  JsonBody(body): JsonBody<TitleBody>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: TodoStore + Clone + 'static,
{
  let patch = ListPatch { title: Some(body.title.unwrap_or_default()) };
  state
    .store
    .update_list(user.id, id, patch)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({ "success": true })))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `POST /list/{id}/delete`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
  PathParam(id): PathParam<ListId>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: TodoStore + Clone + 'static,
{
  let removed = state
    .store
    .delete_list(user.id, id)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(list_id = %id, items = removed, "list deleted");
  Ok(Json(json!({ "message": "List deleted", "deleted_items": removed })))
}
