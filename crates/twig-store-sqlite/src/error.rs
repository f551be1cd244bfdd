//! Error type for `twig-store-sqlite`.

use thiserror::Error;
use twig_core::DomainFailure;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Core(#[from] twig_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl DomainFailure for Error {
  fn into_domain(self) -> std::result::Result<twig_core::Error, Self> {
    match self {
      Error::Core(e) => Ok(e),
      other => Err(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
