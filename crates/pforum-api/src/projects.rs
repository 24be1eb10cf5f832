//! Handlers for `/projects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/projects` | Public |
//! | `GET`    | `/projects/{id}` | Public, 404 if not live |
//! | `POST`   | `/projects` | 201 `{"status":"approved",..}` or 202 `{"status":"pending",..}` |
//! | `POST`   | `/projects/submit` | Always buffered, 201 `{"status":"pending",..}` |
//! | `PATCH`  | `/projects/{id}/status` | Body: `{"status":"completed"}` |
//! | `DELETE` | `/projects/{id}` | Archives, then deletes. 204 |

use axum::{Json, extract::State, http::StatusCode};
use pforum_core::{
  lifecycle::Created,
  oracle::PermissionOracle,
  project::{LiveProject, NewProject, PendingSubmission, ProjectId, SubmissionId},
  store::ProjectStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::Authenticated,
  error::ApiError,
  extract::{JsonBody, PathParam},
};

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /projects`
pub async fn list<S, O>(
  State(state): State<AppState<S, O>>,
) -> Result<Json<Vec<LiveProject>>, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  Ok(Json(state.lifecycle.list_projects().await?))
}

/// `GET /projects/{id}`
pub async fn get_one<S, O>(
  State(state): State<AppState<S, O>>,
  PathParam(id): PathParam<ProjectId>,
) -> Result<Json<LiveProject>, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  Ok(Json(state.lifecycle.get_project(id).await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// Where a new project landed. Also the body of an approval.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Placement {
  Approved { project_id: ProjectId, project: LiveProject },
  Pending { submission_id: SubmissionId, submission: PendingSubmission },
}

impl Placement {
  pub fn status_code(&self) -> StatusCode {
    match self {
      Self::Approved { .. } => StatusCode::CREATED,
      Self::Pending { .. } => StatusCode::ACCEPTED,
    }
  }
}

impl From<LiveProject> for Placement {
  fn from(project: LiveProject) -> Self {
    Self::Approved { project_id: project.project_id, project }
  }
}

impl From<PendingSubmission> for Placement {
  fn from(submission: PendingSubmission) -> Self {
    Self::Pending { submission_id: submission.submission_id, submission }
  }
}

impl From<Created> for Placement {
  fn from(created: Created) -> Self {
    match created {
      Created::Approved(project) => project.into(),
      Created::Pending(submission) => submission.into(),
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:        String,
  pub description: String,
}

impl CreateBody {
  fn validate(self) -> Result<NewProject, ApiError> {
    Ok(NewProject::new(self.name, self.description)?)
  }
}

/// `POST /projects`
pub async fn create<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<(StatusCode, Json<Placement>), ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  let input = body.validate()?;
  let placement = Placement::from(state.lifecycle.create_project(&actor, input).await?);
  Ok((placement.status_code(), Json(placement)))
}

/// `POST /projects/submit`
pub async fn submit<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<(StatusCode, Json<Placement>), ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  let input = body.validate()?;
  let submission = state.lifecycle.submit_project(&actor, input).await?;
  Ok((StatusCode::CREATED, Json(submission.into())))
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: String,
}

/// `PATCH /projects/{id}/status`
pub async fn update_status<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
  PathParam(id): PathParam<ProjectId>,
  JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<LiveProject>, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  let project = state.lifecycle.update_status(&actor, id, &body.status).await?;
  Ok(Json(project))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /projects/{id}`
pub async fn delete<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
  PathParam(id): PathParam<ProjectId>,
) -> Result<StatusCode, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  state.lifecycle.delete_project(&actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
