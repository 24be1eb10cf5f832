//! Project records across their lifecycle: pending submission, live project,
//! archived project, and the maintainer/contributor rosters.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, identity::UserId};

pub type ProjectId = i64;
pub type SubmissionId = i64;

// ─── Status enums ────────────────────────────────────────────────────────────

/// Progress of a live project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
  Upcoming,
  InProgress,
  Completed,
}

impl ProjectStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Upcoming => "upcoming",
      Self::InProgress => "in_progress",
      Self::Completed => "completed",
    }
  }
}

impl fmt::Display for ProjectStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ProjectStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "upcoming" => Ok(Self::Upcoming),
      "in_progress" => Ok(Self::InProgress),
      "completed" => Ok(Self::Completed),
      other => Err(Error::InvalidInput(format!(
        "invalid status {other:?}; must be 'in_progress', 'completed', or 'upcoming'"
      ))),
    }
  }
}

/// Review state of a buffered submission. Approved submissions leave the
/// buffer, so there is no `Approved` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
  Pending,
  Rejected,
}

impl SubmissionStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Rejected => "rejected",
    }
  }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Validated name and description for a new project or submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
  pub name:        String,
  pub description: String,
}

impl NewProject {
  pub fn new(name: impl Into<String>, description: impl Into<String>) -> Result<Self> {
    let name = name.into();
    let description = description.into();
    if name.trim().is_empty() {
      return Err(Error::InvalidInput("name is required".to_string()));
    }
    if description.trim().is_empty() {
      return Err(Error::InvalidInput("description is required".to_string()));
    }
    Ok(Self { name, description })
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A project awaiting admin review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSubmission {
  pub submission_id: SubmissionId,
  pub name:          String,
  pub description:   String,
  pub creator_id:    UserId,
  pub creator_name:  String,
  pub status:        SubmissionStatus,
  pub submitted_at:  DateTime<Utc>,
}

/// An approved project. `creator_id` never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveProject {
  pub project_id:   ProjectId,
  pub name:         String,
  pub description:  String,
  pub creator_id:   UserId,
  pub creator_name: String,
  pub start_date:   DateTime<Utc>,
  pub status:       ProjectStatus,
}

/// Append-only record of a deleted live project; keeps the live project id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedProject {
  pub project_id:   ProjectId,
  pub name:         String,
  pub description:  String,
  pub creator_id:   UserId,
  pub creator_name: String,
  pub deleted_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintainerAssignment {
  pub maintainer_id: i64,
  pub project_id:    ProjectId,
  pub user_id:       UserId,
  pub name:          String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorAssignment {
  pub contributor_id: i64,
  pub project_id:     ProjectId,
  pub user_id:        UserId,
  pub name:           String,
}
