//! Handlers for account endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/signup` | Body: `{"email","name","password"}`; 201, 409 on duplicate email |
//! | `POST` | `/login`  | Body: `{"email","password","remember"?}`; returns a bearer token and sets the session cookie |
//! | `POST` | `/logout` | Closes the cookie session, if any |

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use twig_core::{
  model::{NewSession, NewUser},
  store::TodoStore,
};

use crate::{
  AppState,
  auth::{CurrentUser, clear_session_cookie, session_cookie},
  credentials::{hash_password, new_session_token, session_digest, verify_password},
  error::ApiError,
  extract::JsonBody,
};

// ─── Signup ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupBody {
  pub email:    Option<String>,
  pub name:     Option<String>,
  pub password: Option<String>,
}

/// `POST /signup`
pub async fn signup<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<SignupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TodoStore + Clone + 'static,
{
  let (Some(email), Some(name), Some(password)) = (body.email, body.name, body.password) else {
    return Err(ApiError::BadRequest("email, name and password are all required".into()));
  };
  if password.is_empty() {
    return Err(ApiError::BadRequest("email, name and password are all required".into()));
  }

  let password_hash = hash_password(&password)?;
  let user = state
    .store
    .register_user(NewUser { email, name, password_hash })
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(user_id = %user.id, username = %user.username, "account created");
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "success": true,
      "message": "Account created successfully. Please log in.",
    })),
  ))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    Option<String>,
  pub password: Option<String>,
  /// Keep the session cookie across browser restarts.
  #[serde(default)]
  pub remember: bool,
}

/// `POST /login`: returns `{"success":true,"token":"<jwt>"}` and sets the
/// session cookie.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Response, ApiError>
where
  S: TodoStore + Clone + 'static,
{
  let (Some(email), Some(password)) = (body.email, body.password) else {
    return Err(ApiError::BadRequest("email and password are required".into()));
  };

  let user = state
    .store
    .user_by_email(email)
    .await
    .map_err(ApiError::from_store)?
    .filter(|u| verify_password(&u.password_hash, &password));
  let Some(user) = user else {
    tracing::info!("rejected login attempt");
    return Err(ApiError::InvalidCredentials);
  };

  let token = state
    .tokens
    .issue(user.id)
    .map_err(|e| ApiError::Internal(e.to_string()))?;

  let ttl = state.session_ttl;
  let expires_at = Utc::now()
    .checked_add_signed(ttl)
    .ok_or_else(|| ApiError::Internal("session expiry overflows the clock".into()))?;
  let session = new_session_token();
  state
    .store
    .open_session(NewSession {
      token_digest: session_digest(&session),
      user_id:      user.id,
      expires_at,
    })
    .await
    .map_err(ApiError::from_store)?;

  let max_age = body.remember.then(|| ttl.num_seconds());
  let cookie = session_cookie(&session, max_age, state.config.secure_cookies);

  tracing::info!(user_id = %user.id, "logged in");
  Ok(
    (
      [(header::SET_COOKIE, cookie)],
      Json(json!({ "success": true, "token": token })),
    )
      .into_response(),
  )
}

// ─── Logout ───────────────────────────────────────────────────────────────────

/// `POST /logout`
///
/// Bearer tokens cannot be revoked; they simply expire.
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  user: CurrentUser,
) -> Result<Response, ApiError>
where
  S: TodoStore + Clone + 'static,
{
  if let Some(digest) = user.session {
    state
      .store
      .close_session(digest)
      .await
      .map_err(ApiError::from_store)?;
  }

  tracing::info!(user_id = %user.id, "logged out");
  Ok(
    (
      [(header::SET_COOKIE, clear_session_cookie(state.config.secure_cookies))],
      Json(json!({ "success": true })),
    )
      .into_response(),
  )
}
