//! Handlers for superadmin role management.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/superadmin/roles/admin` | Body: `{"user_id":1,"user_name":"..."}` |
//! | `DELETE` | `/superadmin/roles/admin` | Body: `{"user_id":1}` |
//! | `POST`   | `/superadmin/roles/superadmin` | Body: `{"user_id":1,"user_name":"..."}` |
//!
//! All respond 204 on success.

use axum::{extract::State, http::StatusCode};
use pforum_core::{
  identity::{IdentityRecord, UserId},
  oracle::PermissionOracle,
  store::ProjectStore,
};
use serde::Deserialize;

use crate::{AppState, auth::Authenticated, error::ApiError, extract::JsonBody};

#[derive(Debug, Deserialize)]
pub struct GrantBody {
  pub user_id:   UserId,
  pub user_name: String,
}

#[derive(Debug, Deserialize)]
pub struct RevokeBody {
  pub user_id: UserId,
}

/// `POST /superadmin/roles/admin`
pub async fn assign_admin<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
  JsonBody(body): JsonBody<GrantBody>,
) -> Result<StatusCode, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  let grantee = IdentityRecord::new(body.user_id, body.user_name)?;
  state.lifecycle.assign_admin(&actor, grantee).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /superadmin/roles/admin`
pub async fn revoke_admin<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
  JsonBody(body): JsonBody<RevokeBody>,
) -> Result<StatusCode, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  state.lifecycle.revoke_admin(&actor, body.user_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /superadmin/roles/superadmin`
pub async fn assign_superadmin<S, O>(
  State(state): State<AppState<S, O>>,
  Authenticated(actor): Authenticated,
  JsonBody(body): JsonBody<GrantBody>,
) -> Result<StatusCode, ApiError>
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  let grantee = IdentityRecord::new(body.user_id, body.user_name)?;
  state.lifecycle.assign_superadmin(&actor, grantee).await?;
  Ok(StatusCode::NO_CONTENT)
}
