//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use pforum_core::Error;
use serde_json::json;

/// An error returned by an API handler.
///
/// Wraps the core taxonomy so it can carry an HTTP mapping.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match &self.0 {
      Error::Unauthenticated => StatusCode::UNAUTHORIZED,
      Error::Forbidden(_) => StatusCode::FORBIDDEN,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::Conflict(_) => StatusCode::CONFLICT,
      Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
      Error::NotFoundOrAlreadyProcessed(_) => StatusCode::PRECONDITION_FAILED,
      Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self(Error::InvalidInput(rejection.body_text()))
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self(Error::InvalidInput(rejection.body_text()))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    // `Internal` displays a fixed message; the source was logged where it
    // was wrapped.
    let message = match &self.0 {
      Error::Forbidden(m) | Error::Conflict(m) | Error::InvalidInput(m) => m.clone(),
      other => other.to_string(),
    };
    (self.status(), Json(json!({ "error": message }))).into_response()
  }
}
