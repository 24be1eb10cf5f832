//! The `ProjectStore` trait and the outcome types of its conditioned writes.
//!
//! The trait is implemented by storage backends (e.g. `pforum-store-sqlite`).
//! Every multi-step transition is a single atomic unit inside the backend:
//! either all of its writes commit or none do. Whether a conditioned
//! transition actually applied is decided by the backend at mutation time
//! from affected-row counts, never by a separate prior read.

use std::future::Future;

use crate::{
  identity::{IdentityRecord, UserId},
  project::{
    ArchivedProject, ContributorAssignment, LiveProject, MaintainerAssignment,
    NewProject, PendingSubmission, ProjectId, ProjectStatus, SubmissionId,
  },
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Result of inserting a roster row keyed on `(project_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterInsert<T> {
  Inserted(T),
  /// The pair already existed; nothing was written.
  Duplicate,
  /// The project left the live set before the insert ran.
  ProjectMissing,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relational project store.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ProjectStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identities ────────────────────────────────────────────────────────

  fn upsert_identity(
    &self,
    identity: IdentityRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_identity(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Option<IdentityRecord>, Self::Error>> + Send + '_;

  // ── Pending buffer ────────────────────────────────────────────────────

  /// Upsert the creator's identity and insert a `pending` submission.
  fn submit_project(
    &self,
    input: NewProject,
    creator: IdentityRecord,
  ) -> impl Future<Output = Result<PendingSubmission, Self::Error>> + Send + '_;

  /// List submissions whose status is still `pending`.
  fn list_pending(
    &self,
  ) -> impl Future<Output = Result<Vec<PendingSubmission>, Self::Error>> + Send + '_;

  /// Promote a pending submission into the live set with status `upcoming`.
  ///
  /// The insert and the conditioned delete of the submission form one unit.
  /// Returns `None` (and writes nothing) when no `pending` submission with
  /// this id exists.
  fn approve_submission(
    &self,
    id: SubmissionId,
  ) -> impl Future<Output = Result<Option<LiveProject>, Self::Error>> + Send + '_;

  /// Mark a `pending` submission `rejected`. Returns `false` if no `pending`
  /// submission with this id exists.
  fn reject_submission(
    &self,
    id: SubmissionId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Live projects ─────────────────────────────────────────────────────

  /// Upsert the creator's identity and insert straight into the live set
  /// with status `in_progress`.
  fn create_project(
    &self,
    input: NewProject,
    creator: IdentityRecord,
  ) -> impl Future<Output = Result<LiveProject, Self::Error>> + Send + '_;

  fn get_project(
    &self,
    id: ProjectId,
  ) -> impl Future<Output = Result<Option<LiveProject>, Self::Error>> + Send + '_;

  fn list_projects(
    &self,
  ) -> impl Future<Output = Result<Vec<LiveProject>, Self::Error>> + Send + '_;

  /// Set the status of a live project. Returns `false` if the project does
  /// not exist. Setting the current value again counts as applied.
  fn update_status(
    &self,
    id: ProjectId,
    status: ProjectStatus,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Archive then delete a live project, cascading its roster rows, as one
  /// unit. Returns `None` (and writes nothing) if the project does not exist.
  fn delete_project(
    &self,
    id: ProjectId,
  ) -> impl Future<Output = Result<Option<ArchivedProject>, Self::Error>> + Send + '_;

  // ── Archive ───────────────────────────────────────────────────────────

  /// List archived projects, optionally restricted to one creator.
  fn list_archived(
    &self,
    creator: Option<UserId>,
  ) -> impl Future<Output = Result<Vec<ArchivedProject>, Self::Error>> + Send + '_;

  // ── Rosters ───────────────────────────────────────────────────────────

  fn is_maintainer(
    &self,
    project_id: ProjectId,
    user_id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_maintainers(
    &self,
    project_id: ProjectId,
  ) -> impl Future<Output = Result<Vec<MaintainerAssignment>, Self::Error>> + Send + '_;

  /// Upsert the maintainer's identity, then insert the assignment.
  fn add_maintainer(
    &self,
    project_id: ProjectId,
    maintainer: IdentityRecord,
  ) -> impl Future<Output = Result<RosterInsert<MaintainerAssignment>, Self::Error>>
  + Send
  + '_;

  /// Returns `false` if no such assignment existed.
  fn remove_maintainer(
    &self,
    project_id: ProjectId,
    user_id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_contributors(
    &self,
    project_id: ProjectId,
  ) -> impl Future<Output = Result<Vec<ContributorAssignment>, Self::Error>> + Send + '_;

  /// Upsert the contributor's identity, then insert the assignment.
  fn add_contributor(
    &self,
    project_id: ProjectId,
    contributor: IdentityRecord,
  ) -> impl Future<Output = Result<RosterInsert<ContributorAssignment>, Self::Error>>
  + Send
  + '_;

  /// Returns `false` if no such assignment existed.
  fn remove_contributor(
    &self,
    project_id: ProjectId,
    user_id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
