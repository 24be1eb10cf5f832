//! Integration tests for `SqliteStore` and for the lifecycle executor running
//! on top of it, against in-memory databases.

use std::sync::{
  Arc,
  atomic::{AtomicUsize, Ordering},
};

use pforum_core::{
  Error,
  identity::{Actor, IdentityRecord},
  lifecycle::{ContributorAdded, Created, Lifecycle},
  oracle::{MEMBER_ROLE, PermissionOracle, Space},
  project::{NewProject, ProjectStatus, SubmissionStatus},
  store::{ProjectStore, RosterInsert},
};

use crate::{SqlitePermissions, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn ident(user_id: i64, name: &str) -> IdentityRecord {
  IdentityRecord { user_id, name: name.into() }
}

fn new_project(name: &str) -> NewProject {
  NewProject::new(name, format!("{name} description")).unwrap()
}

// ─── Identities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn identity_upsert_replaces_name() {
  let s = store().await;
  assert!(s.get_identity(1).await.unwrap().is_none());

  s.upsert_identity(ident(1, "Alice")).await.unwrap();
  s.upsert_identity(ident(1, "Alice L.")).await.unwrap();

  let fetched = s.get_identity(1).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Alice L.");
}

// ─── Pending buffer ──────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_caches_creator_and_lists_pending() {
  let s = store().await;
  let sub = s.submit_project(new_project("X"), ident(5, "Eve")).await.unwrap();
  assert_eq!(sub.status, SubmissionStatus::Pending);
  assert_eq!(sub.creator_name, "Eve");

  let pending = s.list_pending().await.unwrap();
  assert_eq!(pending, vec![sub]);
  assert_eq!(s.get_identity(5).await.unwrap(), Some(ident(5, "Eve")));
}

#[tokio::test]
async fn approve_promotes_exactly_once() {
  let s = store().await;
  let sub = s.submit_project(new_project("X"), ident(5, "Eve")).await.unwrap();

  let live = s.approve_submission(sub.submission_id).await.unwrap().unwrap();
  assert_eq!(live.status, ProjectStatus::Upcoming);
  assert_eq!(live.name, "X");
  assert_eq!(live.description, "X description");
  assert_eq!(live.creator_id, 5);
  assert_eq!(live.creator_name, "Eve");

  assert!(s.list_pending().await.unwrap().is_empty());
  assert!(s.approve_submission(sub.submission_id).await.unwrap().is_none());
  assert_eq!(s.list_projects().await.unwrap().len(), 1);
}

#[tokio::test]
async fn reject_blocks_later_approval() {
  let s = store().await;
  let sub = s.submit_project(new_project("X"), ident(5, "Eve")).await.unwrap();

  assert!(s.reject_submission(sub.submission_id).await.unwrap());
  assert!(!s.reject_submission(sub.submission_id).await.unwrap());

  // The failed approval must not leave a live row behind.
  assert!(s.approve_submission(sub.submission_id).await.unwrap().is_none());
  assert!(s.list_projects().await.unwrap().is_empty());
  assert!(s.list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn approve_unknown_submission_writes_nothing() {
  let s = store().await;
  assert!(s.approve_submission(999).await.unwrap().is_none());
  assert!(s.list_projects().await.unwrap().is_empty());
}

// ─── Live projects ───────────────────────────────────────────────────────────

#[tokio::test]
async fn direct_create_starts_in_progress() {
  let s = store().await;
  let p = s.create_project(new_project("Y"), ident(1, "Root")).await.unwrap();
  assert_eq!(p.status, ProjectStatus::InProgress);

  let fetched = s.get_project(p.project_id).await.unwrap().unwrap();
  assert_eq!(fetched.project_id, p.project_id);
  assert_eq!(fetched.status, ProjectStatus::InProgress);
}

#[tokio::test]
async fn update_status_counts_matched_rows() {
  let s = store().await;
  let p = s.create_project(new_project("Y"), ident(1, "Root")).await.unwrap();

  assert!(s.update_status(p.project_id, ProjectStatus::Completed).await.unwrap());
  assert!(s.update_status(p.project_id, ProjectStatus::Completed).await.unwrap());
  assert!(!s.update_status(p.project_id + 100, ProjectStatus::Completed).await.unwrap());

  let fetched = s.get_project(p.project_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, ProjectStatus::Completed);
}

#[tokio::test]
async fn delete_archives_and_cascades_roster() {
  let s = store().await;
  let p = s.create_project(new_project("Z"), ident(1, "Root")).await.unwrap();
  s.add_maintainer(p.project_id, ident(2, "Bob")).await.unwrap();
  s.add_contributor(p.project_id, ident(3, "Cat")).await.unwrap();

  let archived = s.delete_project(p.project_id).await.unwrap().unwrap();
  assert_eq!(archived.project_id, p.project_id);
  assert_eq!(archived.name, p.name);
  assert_eq!(archived.description, p.description);
  assert_eq!(archived.creator_id, p.creator_id);
  assert_eq!(archived.creator_name, p.creator_name);

  assert!(s.get_project(p.project_id).await.unwrap().is_none());
  assert!(s.list_maintainers(p.project_id).await.unwrap().is_empty());
  assert!(s.list_contributors(p.project_id).await.unwrap().is_empty());
  assert!(!s.is_maintainer(p.project_id, 2).await.unwrap());

  // A second delete finds nothing and archives nothing.
  assert!(s.delete_project(p.project_id).await.unwrap().is_none());
  assert_eq!(s.list_archived(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn project_ids_are_not_reused_after_delete() {
  let s = store().await;
  let first = s.create_project(new_project("A"), ident(1, "Root")).await.unwrap();
  s.delete_project(first.project_id).await.unwrap();

  let second = s.create_project(new_project("B"), ident(1, "Root")).await.unwrap();
  assert_ne!(first.project_id, second.project_id);
}

#[tokio::test]
async fn list_archived_filters_by_creator() {
  let s = store().await;
  let mine = s.create_project(new_project("Mine"), ident(1, "Ann")).await.unwrap();
  let theirs = s.create_project(new_project("Theirs"), ident(2, "Ben")).await.unwrap();
  s.delete_project(mine.project_id).await.unwrap();
  s.delete_project(theirs.project_id).await.unwrap();

  let own = s.list_archived(Some(1)).await.unwrap();
  assert_eq!(own.len(), 1);
  assert_eq!(own[0].name, "Mine");
  assert_eq!(s.list_archived(None).await.unwrap().len(), 2);
}

// ─── Rosters ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_maintainer_leaves_one_row() {
  let s = store().await;
  let p = s.create_project(new_project("Z"), ident(1, "Root")).await.unwrap();

  let first = s.add_maintainer(p.project_id, ident(2, "Bob")).await.unwrap();
  assert!(matches!(first, RosterInsert::Inserted(ref m) if m.user_id == 2));
  let second = s.add_maintainer(p.project_id, ident(2, "Bob")).await.unwrap();
  assert_eq!(second, RosterInsert::Duplicate);

  assert_eq!(s.list_maintainers(p.project_id).await.unwrap().len(), 1);
  assert!(s.is_maintainer(p.project_id, 2).await.unwrap());
}

#[tokio::test]
async fn roster_insert_on_missing_project() {
  let s = store().await;
  let outcome = s.add_contributor(42, ident(2, "Bob")).await.unwrap();
  assert_eq!(outcome, RosterInsert::ProjectMissing);
}

#[tokio::test]
async fn remove_roster_entries() {
  let s = store().await;
  let p = s.create_project(new_project("Z"), ident(1, "Root")).await.unwrap();
  s.add_maintainer(p.project_id, ident(2, "Bob")).await.unwrap();
  s.add_contributor(p.project_id, ident(3, "Cat")).await.unwrap();

  assert!(s.remove_maintainer(p.project_id, 2).await.unwrap());
  assert!(!s.remove_maintainer(p.project_id, 2).await.unwrap());
  assert!(s.remove_contributor(p.project_id, 3).await.unwrap());
  assert!(!s.remove_contributor(p.project_id, 3).await.unwrap());
}

#[tokio::test]
async fn maintainers_and_contributors_are_independent() {
  let s = store().await;
  let p = s.create_project(new_project("Z"), ident(1, "Root")).await.unwrap();

  s.add_maintainer(p.project_id, ident(2, "Bob")).await.unwrap();
  let outcome = s.add_contributor(p.project_id, ident(2, "Bob")).await.unwrap();
  assert!(matches!(outcome, RosterInsert::Inserted(_)));
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

const ROOT: i64 = 1;
const ADMIN: i64 = 2;
const CREATOR: i64 = 3;
const MAINTAINER: i64 = 4;
const STRANGER: i64 = 5;

async fn lifecycle() -> Lifecycle<SqliteStore, SqlitePermissions> {
  let oracle = SqlitePermissions::open_in_memory()
    .await
    .expect("in-memory permissions");
  oracle.grant(&ROOT.to_string(), Space::Superadmins, MEMBER_ROLE).await.unwrap();
  oracle.grant(&ADMIN.to_string(), Space::Admins, MEMBER_ROLE).await.unwrap();
  Lifecycle::new(Arc::new(store().await), Arc::new(oracle))
}

fn actor(id: i64) -> Actor { Actor::new(id) }

/// A live project created by `CREATOR` with `MAINTAINER` on its roster.
async fn seeded(lc: &Lifecycle<SqliteStore, SqlitePermissions>) -> i64 {
  let p = lc
    .store()
    .create_project(new_project("Seed"), ident(CREATOR, "Creator"))
    .await
    .unwrap();
  lc.store()
    .add_maintainer(p.project_id, ident(MAINTAINER, "Maint"))
    .await
    .unwrap();
  p.project_id
}

#[tokio::test]
async fn admin_create_goes_live_in_progress() {
  let lc = lifecycle().await;
  let created = lc.create_project(&actor(ADMIN), new_project("Direct")).await.unwrap();
  match created {
    Created::Approved(p) => {
      assert_eq!(p.status, ProjectStatus::InProgress);
      assert_eq!(p.creator_id, ADMIN);
    }
    other => panic!("expected direct creation, got {other:?}"),
  }
  assert_eq!(lc.list_projects().await.unwrap().len(), 1);
}

#[tokio::test]
async fn plain_user_create_is_buffered() {
  let lc = lifecycle().await;
  let created = lc
    .create_project(&actor(STRANGER).with_name("Sam"), new_project("Idea"))
    .await
    .unwrap();
  match created {
    Created::Pending(s) => assert_eq!(s.creator_name, "Sam"),
    other => panic!("expected pending submission, got {other:?}"),
  }
  assert!(lc.list_projects().await.unwrap().is_empty());
}

#[tokio::test]
async fn creator_name_falls_back_to_cache_then_id() {
  let lc = lifecycle().await;
  let sub = lc.submit_project(&actor(STRANGER), new_project("A")).await.unwrap();
  assert_eq!(sub.creator_name, STRANGER.to_string());

  lc.store().upsert_identity(ident(STRANGER, "Sam")).await.unwrap();
  let sub = lc.submit_project(&actor(STRANGER), new_project("B")).await.unwrap();
  assert_eq!(sub.creator_name, "Sam");
}

#[tokio::test]
async fn submit_then_approve_round_trip() {
  let lc = lifecycle().await;
  let sub = lc
    .submit_project(&actor(CREATOR), NewProject::new("X", "Y").unwrap())
    .await
    .unwrap();

  let live = lc.approve(&actor(ADMIN), sub.submission_id).await.unwrap();
  assert_eq!(live.status, ProjectStatus::Upcoming);
  assert_eq!(live.name, "X");
  assert_eq!(live.description, "Y");
  assert_eq!(live.creator_id, CREATOR);
}

#[tokio::test]
async fn approve_and_reject_are_mutually_exclusive() {
  let lc = lifecycle().await;
  let admin = actor(ADMIN);

  let a = lc.submit_project(&actor(CREATOR), new_project("A")).await.unwrap();
  lc.approve(&admin, a.submission_id).await.unwrap();
  assert!(matches!(
    lc.reject(&admin, a.submission_id).await,
    Err(Error::NotFoundOrAlreadyProcessed(_))
  ));
  assert!(matches!(
    lc.approve(&admin, a.submission_id).await,
    Err(Error::NotFoundOrAlreadyProcessed(_))
  ));

  let b = lc.submit_project(&actor(CREATOR), new_project("B")).await.unwrap();
  lc.reject(&admin, b.submission_id).await.unwrap();
  assert!(matches!(
    lc.approve(&admin, b.submission_id).await,
    Err(Error::NotFoundOrAlreadyProcessed(_))
  ));
  assert!(matches!(
    lc.reject(&admin, b.submission_id).await,
    Err(Error::NotFoundOrAlreadyProcessed(_))
  ));
}

#[tokio::test]
async fn superadmin_does_not_imply_admin_for_review() {
  let lc = lifecycle().await;
  let sub = lc.submit_project(&actor(CREATOR), new_project("A")).await.unwrap();

  assert!(matches!(
    lc.approve(&actor(ROOT), sub.submission_id).await,
    Err(Error::Forbidden(_))
  ));
  assert!(matches!(lc.list_pending(&actor(ROOT)).await, Err(Error::Forbidden(_))));
  assert_eq!(lc.list_pending(&actor(ADMIN)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn stranger_cannot_delete() {
  let lc = lifecycle().await;
  let id = seeded(&lc).await;

  assert!(matches!(
    lc.delete_project(&actor(STRANGER), id).await,
    Err(Error::Forbidden(_))
  ));
  assert!(matches!(
    lc.delete_project(&actor(MAINTAINER), id).await,
    Err(Error::Forbidden(_))
  ));
  assert!(lc.get_project(id).await.is_ok());
  assert!(lc.store().list_archived(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn creator_delete_moves_project_to_archive() {
  let lc = lifecycle().await;
  let id = seeded(&lc).await;

  let archived = lc.delete_project(&actor(CREATOR), id).await.unwrap();
  assert_eq!(archived.project_id, id);
  assert!(matches!(lc.get_project(id).await, Err(Error::NotFound(_))));

  let archive = lc.list_archived(&actor(ADMIN)).await.unwrap();
  assert_eq!(archive.len(), 1);
  assert_eq!(archive[0].creator_id, CREATOR);
}

#[tokio::test]
async fn missing_project_is_not_found_before_forbidden() {
  let lc = lifecycle().await;
  assert!(matches!(
    lc.delete_project(&actor(STRANGER), 404).await,
    Err(Error::NotFound(_))
  ));
  assert!(matches!(
    lc.remove_contributor(&actor(STRANGER), 404, 9).await,
    Err(Error::NotFound(_))
  ));
}

#[tokio::test]
async fn update_status_policy() {
  let lc = lifecycle().await;
  let id = seeded(&lc).await;

  let p = lc.update_status(&actor(MAINTAINER), id, "completed").await.unwrap();
  assert_eq!(p.status, ProjectStatus::Completed);
  lc.update_status(&actor(CREATOR), id, "upcoming").await.unwrap();
  lc.update_status(&actor(ADMIN), id, "in_progress").await.unwrap();
  lc.update_status(&actor(ROOT), id, "in_progress").await.unwrap();

  assert!(matches!(
    lc.update_status(&actor(STRANGER), id, "completed").await,
    Err(Error::Forbidden(_))
  ));
  let current = lc.get_project(id).await.unwrap();
  assert_eq!(current.status, ProjectStatus::InProgress);
}

#[tokio::test]
async fn invalid_status_is_rejected_without_mutation() {
  let lc = lifecycle().await;
  let id = seeded(&lc).await;

  assert!(matches!(
    lc.update_status(&actor(ROOT), id, "archived").await,
    Err(Error::InvalidInput(_))
  ));
  let current = lc.get_project(id).await.unwrap();
  assert_eq!(current.status, ProjectStatus::InProgress);
}

#[tokio::test]
async fn duplicate_maintainer_is_conflict() {
  let lc = lifecycle().await;
  let id = seeded(&lc).await;
  let creator = actor(CREATOR);

  lc.add_maintainer(&creator, id, ident(7, "Gus")).await.unwrap();
  assert!(matches!(
    lc.add_maintainer(&creator, id, ident(7, "Gus")).await,
    Err(Error::Conflict(_))
  ));
  let gus = lc
    .list_maintainers(id)
    .await
    .unwrap()
    .into_iter()
    .filter(|m| m.user_id == 7)
    .count();
  assert_eq!(gus, 1);
}

#[tokio::test]
async fn maintainer_roster_policy() {
  let lc = lifecycle().await;
  let id = seeded(&lc).await;

  assert!(matches!(
    lc.add_maintainer(&actor(MAINTAINER), id, ident(7, "Gus")).await,
    Err(Error::Forbidden(_))
  ));
  lc.add_maintainer(&actor(ADMIN), id, ident(7, "Gus")).await.unwrap();
  lc.remove_maintainer(&actor(ROOT), id, 7).await.unwrap();
  assert!(matches!(
    lc.remove_maintainer(&actor(ROOT), id, 7).await,
    Err(Error::NotFound(_))
  ));
}

#[tokio::test]
async fn contributor_policy_and_soft_duplicate() {
  let lc = lifecycle().await;
  let id = seeded(&lc).await;

  // Admins get no bypass on this path.
  assert!(matches!(
    lc.add_contributor(&actor(ADMIN), id, 8, Some("Hal".into())).await,
    Err(Error::Forbidden(_))
  ));

  let first = lc
    .add_contributor(&actor(MAINTAINER), id, 8, Some("Hal".into()))
    .await
    .unwrap();
  assert!(matches!(first, ContributorAdded::Added(ref c) if c.name == "Hal"));

  let again = lc.add_contributor(&actor(CREATOR), id, 8, None).await.unwrap();
  assert_eq!(again, ContributorAdded::AlreadyContributor);
  assert_eq!(lc.list_contributors(id).await.unwrap().len(), 1);

  lc.remove_contributor(&actor(CREATOR), id, 8).await.unwrap();
  assert!(matches!(
    lc.remove_contributor(&actor(CREATOR), id, 8).await,
    Err(Error::NotFound(_))
  ));
}

#[tokio::test]
async fn contributor_without_known_identity_is_invalid() {
  let lc = lifecycle().await;
  let id = seeded(&lc).await;
  assert!(matches!(
    lc.add_contributor(&actor(CREATOR), id, 99, None).await,
    Err(Error::InvalidInput(_))
  ));
}

#[tokio::test]
async fn role_management_requires_superadmin() {
  let lc = lifecycle().await;

  assert!(matches!(
    lc.assign_admin(&actor(ADMIN), ident(STRANGER, "Sam")).await,
    Err(Error::Forbidden(_))
  ));

  lc.assign_admin(&actor(ROOT), ident(STRANGER, "Sam")).await.unwrap();
  let roles = lc.role_evidence(&actor(STRANGER)).await.unwrap();
  assert!(roles.is_admin);
  assert!(!roles.is_superadmin);
  assert_eq!(lc.store().get_identity(STRANGER).await.unwrap(), Some(ident(STRANGER, "Sam")));

  lc.revoke_admin(&actor(ROOT), STRANGER).await.unwrap();
  assert!(!lc.role_evidence(&actor(STRANGER)).await.unwrap().is_admin);

  lc.assign_superadmin(&actor(ROOT), ident(CREATOR, "Creator")).await.unwrap();
  assert!(lc.role_evidence(&actor(CREATOR)).await.unwrap().is_superadmin);
}

#[tokio::test]
async fn bootstrap_superadmin_skips_authorization() {
  let lc = lifecycle().await;
  lc.bootstrap_superadmin(ident(STRANGER, "Sam")).await.unwrap();
  assert!(lc.role_evidence(&actor(STRANGER)).await.unwrap().is_superadmin);
}

#[tokio::test]
async fn archive_listing_policy() {
  let lc = lifecycle().await;
  let id = seeded(&lc).await;
  lc.delete_project(&actor(CREATOR), id).await.unwrap();

  assert!(matches!(lc.list_archived(&actor(CREATOR)).await, Err(Error::Forbidden(_))));
  assert_eq!(lc.list_archived(&actor(ROOT)).await.unwrap().len(), 1);
  assert_eq!(lc.list_own_archived(&actor(CREATOR)).await.unwrap().len(), 1);
  assert!(lc.list_own_archived(&actor(STRANGER)).await.unwrap().is_empty());
}

// ─── Oracle outages ──────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("permission service unavailable")]
struct Unavailable;

/// An oracle whose grants and revokes always fail. `check` answers from a
/// fixed superadmin list, or fails as well when `checks_down` is set.
#[derive(Default)]
struct FailingOracle {
  superadmins: Vec<String>,
  checks_down: bool,
  writes:      AtomicUsize,
}

impl PermissionOracle for FailingOracle {
  type Error = Unavailable;

  async fn check(&self, subject: &str, space: Space, _role: &str) -> Result<bool, Unavailable> {
    if self.checks_down {
      return Err(Unavailable);
    }
    Ok(space == Space::Superadmins && self.superadmins.iter().any(|s| s == subject))
  }

  async fn grant(&self, _subject: &str, _space: Space, _role: &str) -> Result<(), Unavailable> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    Err(Unavailable)
  }

  async fn revoke(&self, _subject: &str, _space: Space, _role: &str) -> Result<(), Unavailable> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    Err(Unavailable)
  }
}

#[tokio::test]
async fn failed_grant_is_internal_and_keeps_identity() {
  let oracle = Arc::new(FailingOracle {
    superadmins: vec![ROOT.to_string()],
    ..FailingOracle::default()
  });
  let lc = Lifecycle::new(Arc::new(store().await), Arc::clone(&oracle));
  let root = actor(ROOT);

  assert!(matches!(
    lc.assign_admin(&root, ident(9, "Nina")).await,
    Err(Error::Internal(_))
  ));
  // One attempt, no retry.
  assert_eq!(oracle.writes.load(Ordering::SeqCst), 1);
  // The identity upsert is not undone.
  assert_eq!(lc.store().get_identity(9).await.unwrap(), Some(ident(9, "Nina")));

  assert!(matches!(lc.revoke_admin(&root, 9).await, Err(Error::Internal(_))));
  assert_eq!(oracle.writes.load(Ordering::SeqCst), 2);

  assert!(matches!(
    lc.assign_superadmin(&root, ident(10, "Otto")).await,
    Err(Error::Internal(_))
  ));
  assert!(matches!(
    lc.bootstrap_superadmin(ident(11, "Pia")).await,
    Err(Error::Internal(_))
  ));
  assert_eq!(oracle.writes.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn failed_check_only_blocks_role_dependent_operations() {
  let oracle = Arc::new(FailingOracle { checks_down: true, ..FailingOracle::default() });
  let lc = Lifecycle::new(Arc::new(store().await), oracle);

  // Always-allowed operations never consult the oracle.
  lc.submit_project(&actor(STRANGER), new_project("A")).await.unwrap();
  assert!(lc.list_own_archived(&actor(STRANGER)).await.unwrap().is_empty());

  // So does a verdict the relation alone settles.
  let p = lc
    .store()
    .create_project(new_project("B"), ident(CREATOR, "Creator"))
    .await
    .unwrap();
  lc.update_status(&actor(CREATOR), p.project_id, "completed").await.unwrap();

  assert!(matches!(lc.list_pending(&actor(ADMIN)).await, Err(Error::Internal(_))));
  assert!(matches!(
    lc.create_project(&actor(ADMIN), new_project("C")).await,
    Err(Error::Internal(_))
  ));
  assert!(matches!(
    lc.delete_project(&actor(STRANGER), p.project_id).await,
    Err(Error::Internal(_))
  ));
  assert!(lc.get_project(p.project_id).await.is_ok());
}
