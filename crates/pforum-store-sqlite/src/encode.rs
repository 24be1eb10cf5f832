//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; status enums as their
//! lowercase wire names.

use chrono::{DateTime, Utc};
use pforum_core::project::{
  ArchivedProject, ContributorAssignment, LiveProject, MaintainerAssignment,
  PendingSubmission, ProjectStatus, SubmissionStatus,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Status enums ────────────────────────────────────────────────────────────

pub fn decode_project_status(s: &str) -> Result<ProjectStatus> {
  match s {
    "upcoming" => Ok(ProjectStatus::Upcoming),
    "in_progress" => Ok(ProjectStatus::InProgress),
    "completed" => Ok(ProjectStatus::Completed),
    other => Err(Error::Decode { column: "status", value: other.to_owned() }),
  }
}

pub fn decode_submission_status(s: &str) -> Result<SubmissionStatus> {
  match s {
    "pending" => Ok(SubmissionStatus::Pending),
    "rejected" => Ok(SubmissionStatus::Rejected),
    other => Err(Error::Decode { column: "status", value: other.to_owned() }),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawLiveProject::from_row`].
pub const LIVE_COLUMNS: &str =
  "project_id, name, description, creator_id, creator_name, start_date, status";

/// Raw values read directly from a `live_projects` row.
pub struct RawLiveProject {
  pub project_id:   i64,
  pub name:         String,
  pub description:  String,
  pub creator_id:   i64,
  pub creator_name: String,
  pub start_date:   String,
  pub status:       String,
}

impl RawLiveProject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      project_id:   row.get(0)?,
      name:         row.get(1)?,
      description:  row.get(2)?,
      creator_id:   row.get(3)?,
      creator_name: row.get(4)?,
      start_date:   row.get(5)?,
      status:       row.get(6)?,
    })
  }

  pub fn into_project(self) -> Result<LiveProject> {
    Ok(LiveProject {
      project_id:   self.project_id,
      name:         self.name,
      description:  self.description,
      creator_id:   self.creator_id,
      creator_name: self.creator_name,
      start_date:   decode_dt(&self.start_date)?,
      status:       decode_project_status(&self.status)?,
    })
  }
}

/// Column list matching [`RawPendingSubmission::from_row`].
pub const PENDING_COLUMNS: &str =
  "submission_id, name, description, creator_id, creator_name, status, submitted_at";

/// Raw values read directly from a `pending_submissions` row.
pub struct RawPendingSubmission {
  pub submission_id: i64,
  pub name:          String,
  pub description:   String,
  pub creator_id:    i64,
  pub creator_name:  String,
  pub status:        String,
  pub submitted_at:  String,
}

impl RawPendingSubmission {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      submission_id: row.get(0)?,
      name:          row.get(1)?,
      description:   row.get(2)?,
      creator_id:    row.get(3)?,
      creator_name:  row.get(4)?,
      status:        row.get(5)?,
      submitted_at:  row.get(6)?,
    })
  }

  pub fn into_submission(self) -> Result<PendingSubmission> {
    Ok(PendingSubmission {
      submission_id: self.submission_id,
      name:          self.name,
      description:   self.description,
      creator_id:    self.creator_id,
      creator_name:  self.creator_name,
      status:        decode_submission_status(&self.status)?,
      submitted_at:  decode_dt(&self.submitted_at)?,
    })
  }
}

/// Column list matching [`RawArchivedProject::from_row`].
pub const ARCHIVED_COLUMNS: &str =
  "project_id, name, description, creator_id, creator_name, deleted_date";

/// Raw values read directly from an `archived_projects` row.
pub struct RawArchivedProject {
  pub project_id:   i64,
  pub name:         String,
  pub description:  String,
  pub creator_id:   i64,
  pub creator_name: String,
  pub deleted_date: String,
}

impl RawArchivedProject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      project_id:   row.get(0)?,
      name:         row.get(1)?,
      description:  row.get(2)?,
      creator_id:   row.get(3)?,
      creator_name: row.get(4)?,
      deleted_date: row.get(5)?,
    })
  }

  pub fn into_archived(self) -> Result<ArchivedProject> {
    Ok(ArchivedProject {
      project_id:   self.project_id,
      name:         self.name,
      description:  self.description,
      creator_id:   self.creator_id,
      creator_name: self.creator_name,
      deleted_date: decode_dt(&self.deleted_date)?,
    })
  }
}

/// A `maintainers` or `contributors` row; both tables share a shape.
pub struct RosterRow {
  pub id:         i64,
  pub project_id: i64,
  pub user_id:    i64,
  pub name:       String,
}

impl RosterRow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      project_id: row.get(1)?,
      user_id:    row.get(2)?,
      name:       row.get(3)?,
    })
  }

  pub fn into_maintainer(self) -> MaintainerAssignment {
    MaintainerAssignment {
      maintainer_id: self.id,
      project_id:    self.project_id,
      user_id:       self.user_id,
      name:          self.name,
    }
  }

  pub fn into_contributor(self) -> ContributorAssignment {
    ContributorAssignment {
      contributor_id: self.id,
      project_id:     self.project_id,
      user_id:        self.user_id,
      name:           self.name,
    }
  }
}
