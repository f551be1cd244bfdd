//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use twig_core::{DomainFailure, error::ErrorKind};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// No valid bearer token or session cookie.
  #[error("authentication required")]
  Unauthorized,

  #[error("Please check your login details and try again.")]
  InvalidCredentials,

  #[error("{0}")]
  BadRequest(String),

  #[error(transparent)]
  Domain(#[from] twig_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  /// Split a backend error into its domain failure (4xx) or a store fault (500).
  pub fn from_store<E>(e: E) -> Self
  where
    E: DomainFailure + std::error::Error + Send + Sync + 'static,
  {
    match e.into_domain() {
      Ok(domain) => ApiError::Domain(domain),
      Err(other) => ApiError::Store(Box::new(other)),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Domain(e) => match e.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
      },
      ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        "internal server error".to_owned()
      }
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "internal failure");
        "internal server error".to_owned()
      }
      ApiError::Domain(e @ twig_core::Error::Forbidden) => {
        tracing::warn!("ownership check denied a request");
        e.to_string()
      }
      other => other.to_string(),
    };

    let mut res = (status, Json(json!({ "success": false, "message": message }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Bearer realm=\"twig\""),
      );
    }
    res
  }
}
