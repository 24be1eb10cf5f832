//! Handlers for the deleted-project archive.

use axum::{Json, extract::State};
use pforum_core::{oracle::PermissionOracle, project::ArchivedProject, store::ProjectStore};

use crate::{AppState, auth::Authenticated, error::ApiError};

/// `GET /archive`, admins and superadmins only.
pub async fn list<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
) -> Result<Json<Vec<ArchivedProject>>, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  Ok(Json(state.lifecycle.list_archived(&actor).await?))
}

/// `GET /archive/mine`
pub async fn mine<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
) -> Result<Json<Vec<ArchivedProject>>, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  Ok(Json(state.lifecycle.list_own_archived(&actor).await?))
}
