//! The lifecycle executor.
//!
//! [`Lifecycle`] turns an actor's request into a state transition. For every
//! mutating operation it resolves role evidence from the
//! [`PermissionOracle`], establishes that the target exists, asks
//! [`decide`] for a verdict, and only then runs the store transition. The
//! store's affected-row outcome is the final word on whether a conditioned
//! transition applied.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
  Error, Result,
  authz::{CreationPath, Decision, Operation, Relation, RoleEvidence, creation_path, decide},
  identity::{Actor, IdentityRecord, UserId},
  oracle::{MEMBER_ROLE, PermissionOracle, Space},
  project::{
    ArchivedProject, ContributorAssignment, LiveProject, MaintainerAssignment,
    NewProject, PendingSubmission, ProjectId, ProjectStatus, SubmissionId,
  },
  store::{ProjectStore, RosterInsert},
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Where a create-project request ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Created {
  /// Inserted directly into the live set.
  Approved(LiveProject),
  /// Buffered for admin review.
  Pending(PendingSubmission),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContributorAdded {
  Added(ContributorAssignment),
  /// The user was already a contributor; nothing changed.
  AlreadyContributor,
}

// ─── Failure helpers ─────────────────────────────────────────────────────────

fn store_failure<E>(err: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  error!(error = %err, "project store call failed");
  Error::internal(err)
}

fn oracle_failure<E>(err: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  error!(error = %err, "permission oracle call failed");
  Error::internal(err)
}

fn denial(op: Operation) -> &'static str {
  match op {
    Operation::CreateProject => "only admins and superadmins may create projects directly",
    Operation::SubmitProject => "you may not submit projects",
    Operation::ListPending | Operation::Approve | Operation::Reject => {
      "only admins may review pending submissions"
    }
    Operation::UpdateStatus => {
      "only the creator, a maintainer, an admin or a superadmin may update this project's status"
    }
    Operation::DeleteProject => "you do not have permission to delete this project",
    Operation::AddMaintainer | Operation::RemoveMaintainer => {
      "only the creator, an admin or a superadmin may manage maintainers"
    }
    Operation::AddContributor | Operation::RemoveContributor => {
      "only the project creator or a maintainer may manage contributors"
    }
    Operation::AssignAdmin | Operation::RevokeAdmin | Operation::AssignSuperadmin => {
      "only superadmins may manage roles"
    }
    Operation::ListArchive => "only admins and superadmins may view all deleted projects",
    Operation::ListOwnArchive => "you may not view deleted projects",
  }
}

// ─── Executor ────────────────────────────────────────────────────────────────

/// Request-scoped driver of every project transition.
///
/// Holds no state of its own between calls beyond the injected store and
/// oracle handles. Cloning is cheap.
pub struct Lifecycle<S, O> {
  store:  Arc<S>,
  oracle: Arc<O>,
}

impl<S, O> Clone for Lifecycle<S, O> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), oracle: Arc::clone(&self.oracle) }
  }
}

impl<S, O> Lifecycle<S, O>
where
  S: ProjectStore,
  O: PermissionOracle,
{
  pub fn new(store: Arc<S>, oracle: Arc<O>) -> Self { Self { store, oracle } }

  pub fn store(&self) -> &S { &self.store }

  // ── Evidence ──────────────────────────────────────────────────────────

  /// Query both role flags. Neither implies the other.
  pub async fn role_evidence(&self, actor: &Actor) -> Result<RoleEvidence> {
    let subject = actor.subject();
    let is_superadmin = self
      .oracle
      .check(&subject, Space::Superadmins, MEMBER_ROLE)
      .await
      .map_err(oracle_failure)?;
    let is_admin = self
      .oracle
      .check(&subject, Space::Admins, MEMBER_ROLE)
      .await
      .map_err(oracle_failure)?;
    Ok(RoleEvidence { is_superadmin, is_admin })
  }

  async fn relation(&self, actor: &Actor, project: &LiveProject) -> Result<Relation> {
    let is_maintainer = self
      .store
      .is_maintainer(project.project_id, actor.user_id)
      .await
      .map_err(store_failure)?;
    Ok(Relation { is_creator: project.creator_id == actor.user_id, is_maintainer })
  }

  async fn authorize(
    &self,
    actor: &Actor,
    op: Operation,
    project: Option<&LiveProject>,
  ) -> Result<()> {
    let relation = match project {
      Some(p) if op.is_project_scoped() => self.relation(actor, p).await?,
      _ => Relation::default(),
    };

    // Role flags only ever widen a verdict, so skip the oracle when the
    // relation alone suffices.
    if decide(op, RoleEvidence::default(), relation).is_allowed() {
      return Ok(());
    }
    let roles = self.role_evidence(actor).await?;

    match decide(op, roles, relation) {
      Decision::Allow => Ok(()),
      Decision::Deny => {
        warn!(
          actor = actor.user_id,
          project = project.map(|p| p.project_id),
          ?op,
          "authorization denied"
        );
        Err(Error::Forbidden(denial(op).to_string()))
      }
    }
  }

  /// Existence is established before any verdict so a denied caller cannot
  /// tell "forbidden" apart from "exists".
  async fn require_project(&self, id: ProjectId) -> Result<LiveProject> {
    self
      .store
      .get_project(id)
      .await
      .map_err(store_failure)?
      .ok_or_else(|| Error::NotFound(format!("project {id}")))
  }

  async fn creator_identity(&self, actor: &Actor) -> Result<IdentityRecord> {
    if let Some(name) = actor.name.as_deref().filter(|n| !n.trim().is_empty()) {
      return Ok(IdentityRecord { user_id: actor.user_id, name: name.to_string() });
    }
    let cached = self
      .store
      .get_identity(actor.user_id)
      .await
      .map_err(store_failure)?;
    Ok(cached.unwrap_or_else(|| IdentityRecord {
      user_id: actor.user_id,
      name:    actor.subject(),
    }))
  }

  // ── Public reads ──────────────────────────────────────────────────────

  pub async fn list_projects(&self) -> Result<Vec<LiveProject>> {
    self.store.list_projects().await.map_err(store_failure)
  }

  pub async fn get_project(&self, id: ProjectId) -> Result<LiveProject> {
    self.require_project(id).await
  }

  pub async fn list_maintainers(&self, id: ProjectId) -> Result<Vec<MaintainerAssignment>> {
    self.require_project(id).await?;
    self.store.list_maintainers(id).await.map_err(store_failure)
  }

  pub async fn list_contributors(&self, id: ProjectId) -> Result<Vec<ContributorAssignment>> {
    self.require_project(id).await?;
    self.store.list_contributors(id).await.map_err(store_failure)
  }

  // ── Creation ──────────────────────────────────────────────────────────

  /// Admins and superadmins create straight into the live set; everyone
  /// else lands in the pending buffer.
  pub async fn create_project(&self, actor: &Actor, input: NewProject) -> Result<Created> {
    let roles = self.role_evidence(actor).await?;
    let creator = self.creator_identity(actor).await?;

    match creation_path(roles) {
      CreationPath::Direct => {
        let project = self
          .store
          .create_project(input, creator)
          .await
          .map_err(store_failure)?;
        info!(actor = actor.user_id, project = project.project_id, "project created directly");
        Ok(Created::Approved(project))
      }
      CreationPath::Buffered => {
        let submission = self
          .store
          .submit_project(input, creator)
          .await
          .map_err(store_failure)?;
        info!(
          actor = actor.user_id,
          submission = submission.submission_id,
          "project submitted for review"
        );
        Ok(Created::Pending(submission))
      }
    }
  }

  /// Buffer a submission regardless of the actor's roles.
  pub async fn submit_project(
    &self,
    actor: &Actor,
    input: NewProject,
  ) -> Result<PendingSubmission> {
    self.authorize(actor, Operation::SubmitProject, None).await?;
    let creator = self.creator_identity(actor).await?;
    let submission = self
      .store
      .submit_project(input, creator)
      .await
      .map_err(store_failure)?;
    info!(
      actor = actor.user_id,
      submission = submission.submission_id,
      "project submitted for review"
    );
    Ok(submission)
  }

  // ── Review ────────────────────────────────────────────────────────────

  pub async fn list_pending(&self, actor: &Actor) -> Result<Vec<PendingSubmission>> {
    self.authorize(actor, Operation::ListPending, None).await?;
    self.store.list_pending().await.map_err(store_failure)
  }

  pub async fn approve(&self, actor: &Actor, id: SubmissionId) -> Result<LiveProject> {
    self.authorize(actor, Operation::Approve, None).await?;
    let project = self
      .store
      .approve_submission(id)
      .await
      .map_err(store_failure)?
      .ok_or_else(|| Error::NotFoundOrAlreadyProcessed(format!("submission {id}")))?;
    info!(
      actor = actor.user_id,
      submission = id,
      project = project.project_id,
      "submission approved"
    );
    Ok(project)
  }

  pub async fn reject(&self, actor: &Actor, id: SubmissionId) -> Result<()> {
    self.authorize(actor, Operation::Reject, None).await?;
    let applied = self.store.reject_submission(id).await.map_err(store_failure)?;
    if !applied {
      return Err(Error::NotFoundOrAlreadyProcessed(format!("submission {id}")));
    }
    info!(actor = actor.user_id, submission = id, "submission rejected");
    Ok(())
  }

  // ── Live project transitions ──────────────────────────────────────────

  pub async fn update_status(
    &self,
    actor: &Actor,
    id: ProjectId,
    status: &str,
  ) -> Result<LiveProject> {
    let status: ProjectStatus = status.parse()?;
    let project = self.require_project(id).await?;
    self.authorize(actor, Operation::UpdateStatus, Some(&project)).await?;

    let applied = self.store.update_status(id, status).await.map_err(store_failure)?;
    if !applied {
      return Err(Error::NotFound(format!("project {id}")));
    }
    info!(actor = actor.user_id, project = id, %status, "project status updated");
    Ok(LiveProject { status, ..project })
  }

  pub async fn delete_project(&self, actor: &Actor, id: ProjectId) -> Result<ArchivedProject> {
    let project = self.require_project(id).await?;
    self.authorize(actor, Operation::DeleteProject, Some(&project)).await?;

    let archived = self
      .store
      .delete_project(id)
      .await
      .map_err(store_failure)?
      .ok_or_else(|| Error::NotFound(format!("project {id}")))?;
    info!(actor = actor.user_id, project = id, "project archived and deleted");
    Ok(archived)
  }

  // ── Maintainers ───────────────────────────────────────────────────────

  pub async fn add_maintainer(
    &self,
    actor: &Actor,
    id: ProjectId,
    maintainer: IdentityRecord,
  ) -> Result<MaintainerAssignment> {
    let project = self.require_project(id).await?;
    self.authorize(actor, Operation::AddMaintainer, Some(&project)).await?;

    let user_id = maintainer.user_id;
    match self.store.add_maintainer(id, maintainer).await.map_err(store_failure)? {
      RosterInsert::Inserted(assignment) => {
        info!(actor = actor.user_id, project = id, user = user_id, "maintainer added");
        Ok(assignment)
      }
      RosterInsert::Duplicate => Err(Error::Conflict(
        "user is already a maintainer for this project".to_string(),
      )),
      RosterInsert::ProjectMissing => Err(Error::NotFound(format!("project {id}"))),
    }
  }

  pub async fn remove_maintainer(
    &self,
    actor: &Actor,
    id: ProjectId,
    user_id: UserId,
  ) -> Result<()> {
    let project = self.require_project(id).await?;
    self.authorize(actor, Operation::RemoveMaintainer, Some(&project)).await?;

    let removed = self
      .store
      .remove_maintainer(id, user_id)
      .await
      .map_err(store_failure)?;
    if !removed {
      return Err(Error::NotFound(format!("maintainer {user_id} of project {id}")));
    }
    info!(actor = actor.user_id, project = id, user = user_id, "maintainer removed");
    Ok(())
  }

  // ── Contributors ──────────────────────────────────────────────────────

  /// Add a contributor. Without a `name` the cached identity is used and
  /// must already exist.
  pub async fn add_contributor(
    &self,
    actor: &Actor,
    id: ProjectId,
    user_id: UserId,
    name: Option<String>,
  ) -> Result<ContributorAdded> {
    let project = self.require_project(id).await?;
    self.authorize(actor, Operation::AddContributor, Some(&project)).await?;

    let contributor = match name {
      Some(name) => IdentityRecord::new(user_id, name)?,
      None => self
        .store
        .get_identity(user_id)
        .await
        .map_err(store_failure)?
        .ok_or_else(|| Error::InvalidInput("user to be added does not exist".to_string()))?,
    };

    match self.store.add_contributor(id, contributor).await.map_err(store_failure)? {
      RosterInsert::Inserted(assignment) => {
        info!(actor = actor.user_id, project = id, user = user_id, "contributor added");
        Ok(ContributorAdded::Added(assignment))
      }
      RosterInsert::Duplicate => Ok(ContributorAdded::AlreadyContributor),
      RosterInsert::ProjectMissing => Err(Error::NotFound(format!("project {id}"))),
    }
  }

  pub async fn remove_contributor(
    &self,
    actor: &Actor,
    id: ProjectId,
    user_id: UserId,
  ) -> Result<()> {
    let project = self.require_project(id).await?;
    self.authorize(actor, Operation::RemoveContributor, Some(&project)).await?;

    let removed = self
      .store
      .remove_contributor(id, user_id)
      .await
      .map_err(store_failure)?;
    if !removed {
      return Err(Error::NotFound(format!("contributor {user_id} of project {id}")));
    }
    info!(actor = actor.user_id, project = id, user = user_id, "contributor removed");
    Ok(())
  }

  // ── Roles ─────────────────────────────────────────────────────────────

  /// Cache the grantee's identity, then grant membership in `space`.
  ///
  /// The identity upsert is not undone if the grant fails.
  async fn grant_membership(&self, grantee: IdentityRecord, space: Space) -> Result<()> {
    let subject = grantee.user_id.to_string();
    self.store.upsert_identity(grantee).await.map_err(store_failure)?;
    self
      .oracle
      .grant(&subject, space, MEMBER_ROLE)
      .await
      .map_err(oracle_failure)
  }

  pub async fn assign_admin(&self, actor: &Actor, grantee: IdentityRecord) -> Result<()> {
    self.authorize(actor, Operation::AssignAdmin, None).await?;
    let user_id = grantee.user_id;
    self.grant_membership(grantee, Space::Admins).await?;
    info!(actor = actor.user_id, user = user_id, "admin role assigned");
    Ok(())
  }

  pub async fn revoke_admin(&self, actor: &Actor, user_id: UserId) -> Result<()> {
    self.authorize(actor, Operation::RevokeAdmin, None).await?;
    self
      .oracle
      .revoke(&user_id.to_string(), Space::Admins, MEMBER_ROLE)
      .await
      .map_err(oracle_failure)?;
    info!(actor = actor.user_id, user = user_id, "admin role revoked");
    Ok(())
  }

  pub async fn assign_superadmin(&self, actor: &Actor, grantee: IdentityRecord) -> Result<()> {
    self.authorize(actor, Operation::AssignSuperadmin, None).await?;
    let user_id = grantee.user_id;
    self.grant_membership(grantee, Space::Superadmins).await?;
    info!(actor = actor.user_id, user = user_id, "superadmin role assigned");
    Ok(())
  }

  /// Grant superadmin without an authorization check. Only for process
  /// startup, before any request is served.
  pub async fn bootstrap_superadmin(&self, grantee: IdentityRecord) -> Result<()> {
    let user_id = grantee.user_id;
    self.grant_membership(grantee, Space::Superadmins).await?;
    info!(user = user_id, "bootstrap superadmin granted");
    Ok(())
  }

  // ── Archive ───────────────────────────────────────────────────────────

  pub async fn list_archived(&self, actor: &Actor) -> Result<Vec<ArchivedProject>> {
    self.authorize(actor, Operation::ListArchive, None).await?;
    self.store.list_archived(None).await.map_err(store_failure)
  }

  pub async fn list_own_archived(&self, actor: &Actor) -> Result<Vec<ArchivedProject>> {
    self.authorize(actor, Operation::ListOwnArchive, None).await?;
    self
      .store
      .list_archived(Some(actor.user_id))
      .await
      .map_err(store_failure)
  }
}
