//! Handlers for admin review of the pending buffer.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/admin/pending` | Admins only |
//! | `POST` | `/admin/approve/{id}` | `{"status":"approved",..}`. 412 if already processed |
//! | `POST` | `/admin/reject/{id}` | 204. 412 if already processed |

use axum::{Json, extract::State, http::StatusCode};
use pforum_core::{
  oracle::PermissionOracle,
  project::{PendingSubmission, SubmissionId},
  store::ProjectStore,
};

use crate::{
  AppState, auth::Authenticated, error::ApiError, extract::PathParam, projects::Placement,
};

/// `GET /admin/pending`
pub async fn list_pending<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
) -> Result<Json<Vec<PendingSubmission>>, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  Ok(Json(state.lifecycle.list_pending(&actor).await?))
}

/// `POST /admin/approve/{id}`
pub async fn approve<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
  PathParam(id): PathParam<SubmissionId>,
) -> Result<Json<Placement>, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  let project = state.lifecycle.approve(&actor, id).await?;
  Ok(Json(project.into()))
}

/// `POST /admin/reject/{id}`
pub async fn reject<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
  PathParam(id): PathParam<SubmissionId>,
) -> Result<StatusCode, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  state.lifecycle.reject(&actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
