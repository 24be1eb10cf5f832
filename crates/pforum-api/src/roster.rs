//! Handlers for a project's maintainer and contributor rosters.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/projects/{id}/maintainers` | Public |
//! | `POST`   | `/projects/{id}/maintainers` | Body: `{"user_id":1,"user_name":"..."}`, 409 on duplicate |
//! | `DELETE` | `/projects/{id}/maintainers/{user_id}` | 204 |
//! | `GET`    | `/projects/{id}/contributors` | Public |
//! | `POST`   | `/projects/{id}/contributors` | `user_name` optional. 201, or 200 if already present |
//! | `DELETE` | `/projects/{id}/contributors/{user_id}` | 204 |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use pforum_core::{
  identity::{IdentityRecord, UserId},
  lifecycle::ContributorAdded,
  oracle::PermissionOracle,
  project::{ContributorAssignment, MaintainerAssignment, ProjectId},
  store::ProjectStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  AppState,
  auth::Authenticated,
  error::ApiError,
  extract::{JsonBody, PathParam},
};

// ─── Maintainers ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MaintainerBody {
  pub user_id:   UserId,
  pub user_name: String,
}

/// `GET /projects/{id}/maintainers`
pub async fn list_maintainers<S, O>(
  State(state): State<AppState<S, O>>,
  PathParam(id): PathParam<ProjectId>,
) -> Result<Json<Vec<MaintainerAssignment>>, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  Ok(Json(state.lifecycle.list_maintainers(id).await?))
}

/// `POST /projects/{id}/maintainers`
pub async fn add_maintainer<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
  PathParam(id): PathParam<ProjectId>,
  JsonBody(body): JsonBody<MaintainerBody>,
) -> Result<(StatusCode, Json<MaintainerAssignment>), ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  let maintainer = IdentityRecord::new(body.user_id, body.user_name)?;
  let assignment = state.lifecycle.add_maintainer(&actor, id, maintainer).await?;
  Ok((StatusCode::CREATED, Json(assignment)))
}

/// `DELETE /projects/{id}/maintainers/{user_id}`
pub async fn remove_maintainer<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
  PathParam((id, user_id)): PathParam<(ProjectId, UserId)>,
) -> Result<StatusCode, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  state.lifecycle.remove_maintainer(&actor, id, user_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Contributors ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ContributorBody {
  pub user_id:   UserId,
  #[serde(default)]
  pub user_name: Option<String>,
}

/// `GET /projects/{id}/contributors`
pub async fn list_contributors<S, O>(
  State(state): State<AppState<S, O>>,
  PathParam(id): PathParam<ProjectId>,
) -> Result<Json<Vec<ContributorAssignment>>, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  Ok(Json(state.lifecycle.list_contributors(id).await?))
}

/// `POST /projects/{id}/contributors`
pub async fn add_contributor<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
  PathParam(id): PathParam<ProjectId>,
  JsonBody(body): JsonBody<ContributorBody>,
) -> Result<Response, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  let outcome = state
    .lifecycle
    .add_contributor(&actor, id, body.user_id, body.user_name)
    .await?;
  let response = match outcome {
    ContributorAdded::Added(assignment) => (StatusCode::CREATED, Json(assignment)).into_response(),
    ContributorAdded::AlreadyContributor => (
      StatusCode::OK,
      Json(json!({ "message": "user is already a contributor for this project" })),
    )
      .into_response(),
  };
  Ok(response)
}

/// `DELETE /projects/{id}/contributors/{user_id}`
pub async fn remove_contributor<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
  PathParam((id, user_id)): PathParam<(ProjectId, UserId)>,
) -> Result<StatusCode, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  state.lifecycle.remove_contributor(&actor, id, user_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
