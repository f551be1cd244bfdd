//! Request extractors whose rejections render as [`ApiError`] bodies.
//!
//! axum's own `Json` and `Path` reject with plain text and a mix of 400, 415
//! and 422. These wrappers route every rejection through [`ApiError`] so
//! clients always get `{"success":false,"message":...}` with a 400.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// A JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// A typed path segment, such as a list or item id.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);
