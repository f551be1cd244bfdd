//! Caller identification: bearer tokens and session cookies.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use twig_core::{model::UserId, store::TodoStore};

use crate::{AppState, credentials::session_digest, error::ApiError};

/// Name of the cookie that carries the raw session token.
pub const SESSION_COOKIE: &str = "twig_session";

/// The authenticated caller. Present in a handler means the request was
/// authenticated.
#[derive(Debug, Clone)]
pub struct CurrentUser {
  pub id:      UserId,
  /// Digest of the session the request came in on, if it used the cookie.
  pub session: Option<String>,
}

/// `Authorization: Bearer <token>`, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

/// Value of the session cookie, if the request carries one.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
    .map(|(_, value)| value)
}

/// `Set-Cookie` value for a fresh session. Without `max_age` the cookie
/// lasts for the browser session.
pub fn session_cookie(token: &str, max_age: Option<i64>, secure: bool) -> String {
  let mut cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
  if let Some(seconds) = max_age {
    cookie.push_str(&format!("; Max-Age={seconds}"));
  }
  if secure {
    cookie.push_str("; Secure");
  }
  cookie
}

/// `Set-Cookie` value that makes the client drop its session cookie.
pub fn clear_session_cookie(secure: bool) -> String { session_cookie("", Some(0), secure) }

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: TodoStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    if let Some(token) = bearer_token(&parts.headers) {
      let id = state.tokens.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        ApiError::Unauthorized
      })?;
      // A valid signature is not enough once the account is gone.
      let user = state.store.get_user(id).await.map_err(ApiError::from_store)?;
      return match user {
        Some(user) => Ok(CurrentUser { id: user.id, session: None }),
        None => {
          tracing::debug!(user_id = %id, "bearer token names an unknown user");
          Err(ApiError::Unauthorized)
        }
      };
    }

    if let Some(token) = session_token(&parts.headers) {
      let digest = session_digest(token);
      let user = state
        .store
        .session_user(digest.clone())
        .await
        .map_err(ApiError::from_store)?;
      if let Some(id) = user {
        return Ok(CurrentUser { id, session: Some(digest) });
      }
    }

    Err(ApiError::Unauthorized)
  }
}
