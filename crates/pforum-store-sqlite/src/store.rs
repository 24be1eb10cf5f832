//! [`SqliteStore`], the SQLite implementation of [`ProjectStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use pforum_core::{
  identity::{IdentityRecord, UserId},
  project::{
    ArchivedProject, ContributorAssignment, LiveProject, MaintainerAssignment,
    NewProject, PendingSubmission, ProjectId, ProjectStatus, SubmissionId,
    SubmissionStatus,
  },
  store::{ProjectStore, RosterInsert},
};

use crate::{
  Result,
  encode::{
    ARCHIVED_COLUMNS, LIVE_COLUMNS, PENDING_COLUMNS, RawArchivedProject,
    RawLiveProject, RawPendingSubmission, RosterRow, encode_dt,
  },
  schema::SCHEMA,
};

// ─── Roster tables ───────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Roster {
  Maintainers,
  Contributors,
}

impl Roster {
  fn table(self) -> &'static str {
    match self {
      Self::Maintainers => "maintainers",
      Self::Contributors => "contributors",
    }
  }

  fn id_column(self) -> &'static str {
    match self {
      Self::Maintainers => "maintainer_id",
      Self::Contributors => "contributor_id",
    }
  }
}

// ─── Synchronous helpers (run inside `Connection::call`) ─────────────────────

fn upsert_identity_row(
  conn: &rusqlite::Connection,
  user_id: UserId,
  name: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO identities (user_id, name) VALUES (?1, ?2)
     ON CONFLICT (user_id) DO UPDATE SET name = excluded.name",
    rusqlite::params![user_id, name],
  )?;
  Ok(())
}

/// Upsert the identity and insert a roster row as one unit. A duplicate or a
/// vanished project rolls the whole unit back.
fn insert_roster(
  conn: &mut rusqlite::Connection,
  roster: Roster,
  project_id: ProjectId,
  identity: IdentityRecord,
) -> rusqlite::Result<RosterInsert<RosterRow>> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  upsert_identity_row(&tx, identity.user_id, &identity.name)?;

  let live = tx
    .query_row(
      "SELECT 1 FROM live_projects WHERE project_id = ?1",
      rusqlite::params![project_id],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false);
  if !live {
    return Ok(RosterInsert::ProjectMissing);
  }

  let sql = format!(
    "INSERT INTO {table} (project_id, user_id, name) VALUES (?1, ?2, ?3)
     ON CONFLICT (project_id, user_id) DO NOTHING
     RETURNING {id}, project_id, user_id, name",
    table = roster.table(),
    id = roster.id_column(),
  );
  let row = tx
    .query_row(
      &sql,
      rusqlite::params![project_id, identity.user_id, identity.name],
      RosterRow::from_row,
    )
    .optional()?;

  match row {
    Some(row) => {
      tx.commit()?;
      Ok(RosterInsert::Inserted(row))
    }
    None => Ok(RosterInsert::Duplicate),
  }
}

fn list_roster(
  conn: &rusqlite::Connection,
  roster: Roster,
  project_id: ProjectId,
) -> rusqlite::Result<Vec<RosterRow>> {
  let sql = format!(
    "SELECT {id}, project_id, user_id, name FROM {table}
     WHERE project_id = ?1 ORDER BY {id}",
    table = roster.table(),
    id = roster.id_column(),
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(rusqlite::params![project_id], RosterRow::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn delete_roster(
  conn: &rusqlite::Connection,
  roster: Roster,
  project_id: ProjectId,
  user_id: UserId,
) -> rusqlite::Result<bool> {
  let sql = format!(
    "DELETE FROM {table} WHERE project_id = ?1 AND user_id = ?2",
    table = roster.table(),
  );
  Ok(conn.execute(&sql, rusqlite::params![project_id, user_id])? > 0)
}

fn map_roster<T>(
  outcome: RosterInsert<RosterRow>,
  f: impl FnOnce(RosterRow) -> T,
) -> RosterInsert<T> {
  match outcome {
    RosterInsert::Inserted(row) => RosterInsert::Inserted(f(row)),
    RosterInsert::Duplicate => RosterInsert::Duplicate,
    RosterInsert::ProjectMissing => RosterInsert::ProjectMissing,
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A project store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a live project with the given initial status.
  async fn insert_live(
    &self,
    input: NewProject,
    creator: IdentityRecord,
    status: ProjectStatus,
  ) -> Result<LiveProject> {
    let start_date = Utc::now();
    let start_str  = encode_dt(start_date);
    let name       = input.name.clone();
    let desc       = input.description.clone();
    let creator_id = creator.user_id;
    let creator_nm = creator.name.clone();

    let project_id: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        upsert_identity_row(&tx, creator_id, &creator_nm)?;
        tx.execute(
          "INSERT INTO live_projects
             (name, description, creator_id, creator_name, start_date, status)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![name, desc, creator_id, creator_nm, start_str, status.as_str()],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(LiveProject {
      project_id,
      name: input.name,
      description: input.description,
      creator_id: creator.user_id,
      creator_name: creator.name,
      start_date,
      status,
    })
  }
}

// ─── ProjectStore impl ───────────────────────────────────────────────────────

impl ProjectStore for SqliteStore {
  type Error = crate::Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn upsert_identity(&self, identity: IdentityRecord) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        upsert_identity_row(conn, identity.user_id, &identity.name)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_identity(&self, user_id: UserId) -> Result<Option<IdentityRecord>> {
    let identity = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, name FROM identities WHERE user_id = ?1",
            rusqlite::params![user_id],
            |row| {
              Ok(IdentityRecord {
                user_id: row.get(0)?,
                name:    row.get(1)?,
              })
            },
          )
          .optional()?)
      })
      .await?;
    Ok(identity)
  }

  // ── Pending buffer ────────────────────────────────────────────────────────

  async fn submit_project(
    &self,
    input: NewProject,
    creator: IdentityRecord,
  ) -> Result<PendingSubmission> {
    let submitted_at = Utc::now();
    let at_str       = encode_dt(submitted_at);
    let name         = input.name.clone();
    let desc         = input.description.clone();
    let creator_id   = creator.user_id;
    let creator_nm   = creator.name.clone();

    let submission_id: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        upsert_identity_row(&tx, creator_id, &creator_nm)?;
        tx.execute(
          "INSERT INTO pending_submissions
             (name, description, creator_id, creator_name, status, submitted_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            name,
            desc,
            creator_id,
            creator_nm,
            SubmissionStatus::Pending.as_str(),
            at_str,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
      })
      .await?;

    Ok(PendingSubmission {
      submission_id,
      name: input.name,
      description: input.description,
      creator_id: creator.user_id,
      creator_name: creator.name,
      status: SubmissionStatus::Pending,
      submitted_at,
    })
  }

  async fn list_pending(&self) -> Result<Vec<PendingSubmission>> {
    let raws: Vec<RawPendingSubmission> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PENDING_COLUMNS} FROM pending_submissions
           WHERE status = 'pending' ORDER BY submission_id"
        ))?;
        let rows = stmt
          .query_map([], RawPendingSubmission::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPendingSubmission::into_submission).collect()
  }

  async fn approve_submission(&self, id: SubmissionId) -> Result<Option<LiveProject>> {
    let start_str = encode_dt(Utc::now());

    let raw: Option<RawLiveProject> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx.execute(
          "INSERT INTO live_projects
             (name, description, creator_id, creator_name, start_date, status)
           SELECT name, description, creator_id, creator_name, ?2, ?3
           FROM pending_submissions
           WHERE submission_id = ?1 AND status = 'pending'",
          rusqlite::params![id, start_str, ProjectStatus::Upcoming.as_str()],
        )?;
        let project_id = tx.last_insert_rowid();

        let deleted = tx.execute(
          "DELETE FROM pending_submissions WHERE submission_id = ?1 AND status = 'pending'",
          rusqlite::params![id],
        )?;

        // Dropping `tx` without commit discards the insert as well.
        if inserted == 0 || deleted == 0 {
          return Ok(None);
        }

        let raw = tx.query_row(
          &format!("SELECT {LIVE_COLUMNS} FROM live_projects WHERE project_id = ?1"),
          rusqlite::params![project_id],
          RawLiveProject::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawLiveProject::into_project).transpose()
  }

  async fn reject_submission(&self, id: SubmissionId) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE pending_submissions SET status = 'rejected'
           WHERE submission_id = ?1 AND status = 'pending'",
          rusqlite::params![id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  // ── Live projects ─────────────────────────────────────────────────────────

  async fn create_project(
    &self,
    input: NewProject,
    creator: IdentityRecord,
  ) -> Result<LiveProject> {
    self.insert_live(input, creator, ProjectStatus::InProgress).await
  }

  async fn get_project(&self, id: ProjectId) -> Result<Option<LiveProject>> {
    let raw: Option<RawLiveProject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {LIVE_COLUMNS} FROM live_projects WHERE project_id = ?1"),
            rusqlite::params![id],
            RawLiveProject::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawLiveProject::into_project).transpose()
  }

  async fn list_projects(&self) -> Result<Vec<LiveProject>> {
    let raws: Vec<RawLiveProject> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LIVE_COLUMNS} FROM live_projects ORDER BY project_id"
        ))?;
        let rows = stmt
          .query_map([], RawLiveProject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLiveProject::into_project).collect()
  }

  async fn update_status(&self, id: ProjectId, status: ProjectStatus) -> Result<bool> {
    // SQLite counts matched rows, so re-setting the current value reports 1.
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE live_projects SET status = ?1 WHERE project_id = ?2",
          rusqlite::params![status.as_str(), id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn delete_project(&self, id: ProjectId) -> Result<Option<ArchivedProject>> {
    let deleted_str = encode_dt(Utc::now());

    let raw: Option<RawArchivedProject> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
          "INSERT INTO archived_projects
             (project_id, name, description, creator_id, creator_name, deleted_date)
           SELECT project_id, name, description, creator_id, creator_name, ?2
           FROM live_projects WHERE project_id = ?1",
          rusqlite::params![id, deleted_str],
        )?;

        // Roster rows go with it via ON DELETE CASCADE.
        let deleted = tx.execute(
          "DELETE FROM live_projects WHERE project_id = ?1",
          rusqlite::params![id],
        )?;
        if deleted == 0 {
          return Ok(None);
        }

        let raw = tx.query_row(
          &format!("SELECT {ARCHIVED_COLUMNS} FROM archived_projects WHERE project_id = ?1"),
          rusqlite::params![id],
          RawArchivedProject::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawArchivedProject::into_archived).transpose()
  }

  // ── Archive ───────────────────────────────────────────────────────────────

  async fn list_archived(&self, creator: Option<UserId>) -> Result<Vec<ArchivedProject>> {
    let raws: Vec<RawArchivedProject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ARCHIVED_COLUMNS} FROM archived_projects
           WHERE ?1 IS NULL OR creator_id = ?1
           ORDER BY project_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![creator], RawArchivedProject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawArchivedProject::into_archived).collect()
  }

  // ── Rosters ───────────────────────────────────────────────────────────────

  async fn is_maintainer(&self, project_id: ProjectId, user_id: UserId) -> Result<bool> {
    let exists = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS(SELECT 1 FROM maintainers WHERE project_id = ?1 AND user_id = ?2)",
          rusqlite::params![project_id, user_id],
          |row| row.get::<_, bool>(0),
        )?)
      })
      .await?;
    Ok(exists)
  }

  async fn list_maintainers(&self, project_id: ProjectId) -> Result<Vec<MaintainerAssignment>> {
    let rows = self
      .conn
      .call(move |conn| Ok(list_roster(conn, Roster::Maintainers, project_id)?))
      .await?;
    Ok(rows.into_iter().map(RosterRow::into_maintainer).collect())
  }

  async fn add_maintainer(
    &self,
    project_id: ProjectId,
    maintainer: IdentityRecord,
  ) -> Result<RosterInsert<MaintainerAssignment>> {
    let outcome = self
      .conn
      .call(move |conn| Ok(insert_roster(conn, Roster::Maintainers, project_id, maintainer)?))
      .await?;
    Ok(map_roster(outcome, RosterRow::into_maintainer))
  }

  async fn remove_maintainer(&self, project_id: ProjectId, user_id: UserId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| Ok(delete_roster(conn, Roster::Maintainers, project_id, user_id)?))
      .await?;
    Ok(removed)
  }

  async fn list_contributors(
    &self,
    project_id: ProjectId,
  ) -> Result<Vec<ContributorAssignment>> {
    let rows = self
      .conn
      .call(move |conn| Ok(list_roster(conn, Roster::Contributors, project_id)?))
      .await?;
    Ok(rows.into_iter().map(RosterRow::into_contributor).collect())
  }

  async fn add_contributor(
    &self,
    project_id: ProjectId,
    contributor: IdentityRecord,
  ) -> Result<RosterInsert<ContributorAssignment>> {
    let outcome = self
      .conn
      .call(move |conn| {
        Ok(insert_roster(conn, Roster::Contributors, project_id, contributor)?)
      })
      .await?;
    Ok(map_roster(outcome, RosterRow::into_contributor))
  }

  async fn remove_contributor(&self, project_id: ProjectId, user_id: UserId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| Ok(delete_roster(conn, Roster::Contributors, project_id, user_id)?))
      .await?;
    Ok(removed)
  }
}
