//! HTTP layer for the project forum.
//!
//! Exposes an axum [`Router`] over a [`Lifecycle`] backed by any
//! [`ProjectStore`] and [`PermissionOracle`]. Identity arrives in request
//! headers (see [`auth`]); everything else is decided by the lifecycle.

pub mod archive;
pub mod auth;
pub mod error;
pub mod extract;
pub mod projects;
pub mod review;
pub mod roles;
pub mod roster;

pub use error::ApiError;

use std::path::PathBuf;

use axum::{
  Router,
  routing::{delete, get, patch, post},
};
use pforum_core::{
  identity::UserId,
  lifecycle::Lifecycle,
  oracle::PermissionOracle,
  store::ProjectStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  pub permissions_path: PathBuf,
  /// Users granted superadmin at startup.
  #[serde(default)]
  pub bootstrap_superadmins: Vec<BootstrapUser>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapUser {
  pub user_id:   UserId,
  pub user_name: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, O> {
  pub lifecycle: Lifecycle<S, O>,
}

impl<S, O> Clone for AppState<S, O> {
  fn clone(&self) -> Self { Self { lifecycle: self.lifecycle.clone() } }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the forum's axum [`Router`].
pub fn router<S, O>(state: AppState<S, O>) -> Router
where
  S: ProjectStore + 'static,
  O: PermissionOracle + 'static,
{
  Router::new()
    // Live projects
    .route("/projects",             get(projects::list::<S, O>).post(projects::create::<S, O>))
    .route("/projects/submit",      post(projects::submit::<S, O>))
    .route("/projects/{id}",        get(projects::get_one::<S, O>).delete(projects::delete::<S, O>))
    .route("/projects/{id}/status", patch(projects::update_status::<S, O>))
    // Rosters
    .route(
      "/projects/{id}/maintainers",
      get(roster::list_maintainers::<S, O>).post(roster::add_maintainer::<S, O>),
    )
    .route("/projects/{id}/maintainers/{user_id}", delete(roster::remove_maintainer::<S, O>))
    .route(
      "/projects/{id}/contributors",
      get(roster::list_contributors::<S, O>).post(roster::add_contributor::<S, O>),
    )
    .route("/projects/{id}/contributors/{user_id}", delete(roster::remove_contributor::<S, O>))
    // Review
    .route("/admin/pending",      get(review::list_pending::<S, O>))
    .route("/admin/approve/{id}", post(review::approve::<S, O>))
    .route("/admin/reject/{id}",  post(review::reject::<S, O>))
    // Archive
    .route("/archive",      get(archive::list::<S, O>))
    .route("/archive/mine", get(archive::mine::<S, O>))
    // Roles
    .route(
      "/superadmin/roles/admin",
      post(roles::assign_admin::<S, O>).delete(roles::revoke_admin::<S, O>),
    )
    .route("/superadmin/roles/superadmin", post(roles::assign_superadmin::<S, O>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
