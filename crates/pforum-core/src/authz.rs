//! The authorization decision table.
//!
//! [`decide`] is a pure function of the operation, the actor's role evidence,
//! and the actor's relation to the target project. Roles are flat: admin and
//! superadmin are independent flags and neither implies the other.

/// Every operation that is gated by the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  /// Privileged creation straight into the live set.
  CreateProject,
  /// Creation into the pending buffer.
  SubmitProject,
  ListPending,
  Approve,
  Reject,
  UpdateStatus,
  DeleteProject,
  AddMaintainer,
  RemoveMaintainer,
  AddContributor,
  RemoveContributor,
  AssignAdmin,
  RevokeAdmin,
  AssignSuperadmin,
  ListArchive,
  ListOwnArchive,
}

impl Operation {
  /// Whether the operation targets a live project, so that existence must be
  /// established before a verdict.
  pub fn is_project_scoped(self) -> bool {
    matches!(
      self,
      Self::UpdateStatus
        | Self::DeleteProject
        | Self::AddMaintainer
        | Self::RemoveMaintainer
        | Self::AddContributor
        | Self::RemoveContributor
    )
  }
}

/// Role flags queried from the permission oracle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleEvidence {
  pub is_superadmin: bool,
  pub is_admin:      bool,
}

impl RoleEvidence {
  fn privileged(self) -> bool { self.is_superadmin || self.is_admin }
}

/// The actor's ownership relation to a live project. Both flags may be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Relation {
  pub is_creator:    bool,
  pub is_maintainer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Allow,
  Deny,
}

impl Decision {
  pub fn is_allowed(self) -> bool { matches!(self, Self::Allow) }

  fn from_bool(allowed: bool) -> Self { if allowed { Self::Allow } else { Self::Deny } }
}

/// Where a create-project request lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationPath {
  /// Inserted into the live set with status `in_progress`.
  Direct,
  /// Inserted into the pending buffer for review.
  Buffered,
}

/// Pick the creation path for an actor. Any authenticated actor may create;
/// only admins and superadmins skip review.
pub fn creation_path(roles: RoleEvidence) -> CreationPath {
  if decide(Operation::CreateProject, roles, Relation::default()).is_allowed() {
    CreationPath::Direct
  } else {
    CreationPath::Buffered
  }
}

/// Decide whether `op` is permitted.
///
/// `relation` is ignored for operations that do not target a project.
pub fn decide(op: Operation, roles: RoleEvidence, relation: Relation) -> Decision {
  use Operation::*;

  let allowed = match op {
    CreateProject => roles.privileged(),
    SubmitProject | ListOwnArchive => true,
    // Approval routes are admin-only; superadmin is not implied.
    ListPending | Approve | Reject => roles.is_admin,
    UpdateStatus => {
      roles.privileged() || relation.is_creator || relation.is_maintainer
    }
    DeleteProject | AddMaintainer | RemoveMaintainer => {
      roles.privileged() || relation.is_creator
    }
    // No admin or superadmin bypass on the contributor path.
    AddContributor | RemoveContributor => {
      relation.is_creator || relation.is_maintainer
    }
    AssignAdmin | RevokeAdmin | AssignSuperadmin => roles.is_superadmin,
    ListArchive => roles.privileged(),
  };

  Decision::from_bool(allowed)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn roles(is_superadmin: bool, is_admin: bool) -> RoleEvidence {
    RoleEvidence { is_superadmin, is_admin }
  }

  fn rel(is_creator: bool, is_maintainer: bool) -> Relation {
    Relation { is_creator, is_maintainer }
  }

  const NOBODY: RoleEvidence = RoleEvidence { is_superadmin: false, is_admin: false };
  const STRANGER: Relation = Relation { is_creator: false, is_maintainer: false };

  fn all_combinations() -> impl Iterator<Item = (RoleEvidence, Relation)> {
    (0..16u8).map(|bits| {
      (
        roles(bits & 1 != 0, bits & 2 != 0),
        rel(bits & 4 != 0, bits & 8 != 0),
      )
    })
  }

  #[test]
  fn update_status_allowed_iff_any_role_or_relation() {
    for (r, p) in all_combinations() {
      let expected = r.is_superadmin || r.is_admin || p.is_creator || p.is_maintainer;
      assert_eq!(
        decide(Operation::UpdateStatus, r, p).is_allowed(),
        expected,
        "roles={r:?} relation={p:?}"
      );
    }
  }

  #[test]
  fn maintainers_may_not_delete() {
    assert_eq!(decide(Operation::DeleteProject, NOBODY, rel(false, true)), Decision::Deny);
    assert_eq!(decide(Operation::DeleteProject, NOBODY, rel(true, false)), Decision::Allow);
    assert_eq!(decide(Operation::DeleteProject, roles(false, true), STRANGER), Decision::Allow);
    assert_eq!(decide(Operation::DeleteProject, roles(true, false), STRANGER), Decision::Allow);
  }

  #[test]
  fn maintainer_roster_follows_delete_policy() {
    for op in [Operation::AddMaintainer, Operation::RemoveMaintainer] {
      for (r, p) in all_combinations() {
        assert_eq!(
          decide(op, r, p),
          decide(Operation::DeleteProject, r, p),
          "{op:?} roles={r:?} relation={p:?}"
        );
      }
    }
  }

  #[test]
  fn contributor_path_has_no_role_bypass() {
    for op in [Operation::AddContributor, Operation::RemoveContributor] {
      assert_eq!(decide(op, roles(true, true), STRANGER), Decision::Deny);
      assert_eq!(decide(op, NOBODY, rel(true, false)), Decision::Allow);
      assert_eq!(decide(op, NOBODY, rel(false, true)), Decision::Allow);
      assert_eq!(decide(op, NOBODY, rel(true, true)), Decision::Allow);
    }
  }

  #[test]
  fn approval_requires_admin_not_superadmin() {
    for op in [Operation::Approve, Operation::Reject, Operation::ListPending] {
      assert_eq!(decide(op, roles(true, false), STRANGER), Decision::Deny);
      assert_eq!(decide(op, roles(false, true), STRANGER), Decision::Allow);
    }
  }

  #[test]
  fn role_management_requires_superadmin_only() {
    for op in [Operation::AssignAdmin, Operation::RevokeAdmin, Operation::AssignSuperadmin] {
      assert_eq!(decide(op, roles(false, true), rel(true, true)), Decision::Deny);
      assert_eq!(decide(op, roles(true, false), STRANGER), Decision::Allow);
    }
  }

  #[test]
  fn creation_path_by_role() {
    assert_eq!(creation_path(NOBODY), CreationPath::Buffered);
    assert_eq!(creation_path(roles(false, true)), CreationPath::Direct);
    assert_eq!(creation_path(roles(true, false)), CreationPath::Direct);
    assert!(decide(Operation::SubmitProject, NOBODY, STRANGER).is_allowed());
  }

  #[test]
  fn archive_listing() {
    assert_eq!(decide(Operation::ListArchive, NOBODY, STRANGER), Decision::Deny);
    assert_eq!(decide(Operation::ListArchive, roles(false, true), STRANGER), Decision::Allow);
    assert_eq!(decide(Operation::ListArchive, roles(true, false), STRANGER), Decision::Allow);
    assert_eq!(decide(Operation::ListOwnArchive, NOBODY, STRANGER), Decision::Allow);
  }

  #[test]
  fn project_scoped_operations() {
    assert!(Operation::DeleteProject.is_project_scoped());
    assert!(Operation::AddContributor.is_project_scoped());
    assert!(!Operation::Approve.is_project_scoped());
    assert!(!Operation::AssignAdmin.is_project_scoped());
  }

  #[test]
  fn roles_never_narrow_a_verdict() {
    use Operation::*;
    let ops = [
      CreateProject, SubmitProject, ListPending, Approve, Reject, UpdateStatus,
      DeleteProject, AddMaintainer, RemoveMaintainer, AddContributor,
      RemoveContributor, AssignAdmin, RevokeAdmin, AssignSuperadmin,
      ListArchive, ListOwnArchive,
    ];
    for op in ops {
      for (r, p) in all_combinations() {
        if decide(op, NOBODY, p).is_allowed() {
          assert!(decide(op, r, p).is_allowed(), "{op:?} roles={r:?} relation={p:?}");
        }
      }
    }
  }
}
