//! HTTP JSON layer for Twig.
//!
//! Exposes an axum [`Router`] over any [`TodoStore`]. Callers authenticate
//! with a bearer token from `/login` or with the session cookie it sets.

pub mod accounts;
pub mod auth;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod items;
pub mod lists;
pub mod token;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::{get, post}};
use chrono::{TimeDelta, Utc};
use serde::Deserialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use twig_core::{store::TodoStore, tree::DEFAULT_MAX_DEPTH};

use token::TokenIssuer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TWIG_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_database_path")]
  pub database_path:     PathBuf,
  /// HS256 key for bearer tokens. `server --generate-secret` prints one.
  pub jwt_secret:        String,
  #[serde(default = "default_token_ttl_hours")]
  pub token_ttl_hours:   i64,
  /// Lifetime of a remembered session cookie and of the server-side session.
  #[serde(default = "default_session_ttl_hours")]
  pub session_ttl_hours: i64,
  #[serde(default = "default_max_tree_depth")]
  pub max_tree_depth:    usize,
  #[serde(default)]
  pub secure_cookies:    bool,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 5000 }
fn default_database_path() -> PathBuf { PathBuf::from("~/.local/share/twig/twig.db") }
fn default_token_ttl_hours() -> i64 { 24 }
fn default_session_ttl_hours() -> i64 { 24 * 14 }
fn default_max_tree_depth() -> usize { DEFAULT_MAX_DEPTH }

/// A configuration value the server cannot run with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("{field} must be a positive number of hours that fits the clock, got {hours}")]
  Lifetime { field: &'static str, hours: i64 },
}

impl ServerConfig {
  pub fn token_ttl(&self) -> Result<TimeDelta, ConfigError> {
    lifetime("token_ttl_hours", self.token_ttl_hours)
  }

  pub fn session_ttl(&self) -> Result<TimeDelta, ConfigError> {
    lifetime("session_ttl_hours", self.session_ttl_hours)
  }
}

/// `hours` as a positive span that can still be added to the current time.
fn lifetime(field: &'static str, hours: i64) -> Result<TimeDelta, ConfigError> {
  TimeDelta::try_hours(hours)
    .filter(|ttl| *ttl > TimeDelta::zero())
    .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
    .ok_or(ConfigError::Lifetime { field, hours })
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: TodoStore> {
  pub store:       Arc<S>,
  pub config:      Arc<ServerConfig>,
  pub tokens:      Arc<TokenIssuer>,
  /// Validated `session_ttl_hours`.
  pub session_ttl: TimeDelta,
}

impl<S: TodoStore> AppState<S> {
  /// Fails when a lifetime in `config` is not usable.
  pub fn new(store: S, config: ServerConfig) -> Result<Self, ConfigError> {
    let tokens = TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl()?);
    let session_ttl = config.session_ttl()?;
    Ok(Self {
      store: Arc::new(store),
      config: Arc::new(config),
      tokens: Arc::new(tokens),
      session_ttl,
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the Twig API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: TodoStore + Clone + 'static,
{
  Router::new()
    .route("/signup",               post(accounts::signup::<S>))
    .route("/login",                post(accounts::login::<S>))
    .route("/logout",               post(accounts::logout::<S>))
    .route("/list",                 get(lists::index::<S>))
    .route("/list/add",             post(lists::create::<S>))
    .route("/list/{id}",            get(lists::show::<S>))
    .route("/list/{id}/edit",       post(lists::rename::<S>))
    .route("/list/{id}/delete",     post(lists::delete::<S>))
    .route("/list/{id}/add",        post(items::create::<S>))
    .route("/item/move",            post(items::relocate::<S>))
    .route("/item/toggle/{id}",     post(items::toggle::<S>))
    .route("/item/edit/{id}",       post(items::edit::<S>))
    .route("/item/delete/{id}",     post(items::delete::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
