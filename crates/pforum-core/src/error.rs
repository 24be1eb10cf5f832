//! Error taxonomy for `pforum-core`.
//!
//! Every failure a caller can observe is one of these kinds. Adapter errors
//! (store, oracle) are folded into [`Error::Internal`], whose message never
//! carries the adapter detail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("not authenticated")]
  Unauthenticated,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("{0} not found")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("{0} not found or already processed")]
  NotFoundOrAlreadyProcessed(String),

  #[error("internal error")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a store or oracle failure.
  pub fn internal<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Internal(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
