//! SQL schemas for the project store and the permission oracle.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Project store DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Display-name cache, upserted whenever a user is referenced.
CREATE TABLE IF NOT EXISTS identities (
    user_id INTEGER PRIMARY KEY,
    name    TEXT NOT NULL
);

-- Submissions awaiting review. Approved rows are deleted; rejected rows stay.
CREATE TABLE IF NOT EXISTS pending_submissions (
    submission_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    description   TEXT NOT NULL,
    creator_id    INTEGER NOT NULL REFERENCES identities(user_id),
    creator_name  TEXT NOT NULL,
    status        TEXT NOT NULL DEFAULT 'pending'
                  CHECK (status IN ('pending', 'rejected')),
    submitted_at  TEXT NOT NULL    -- RFC 3339 UTC
);

-- AUTOINCREMENT keeps ids of deleted projects from being reused, so an id
-- is never live and archived at the same time.
CREATE TABLE IF NOT EXISTS live_projects (
    project_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    description  TEXT NOT NULL,
    creator_id   INTEGER NOT NULL,
    creator_name TEXT NOT NULL,
    start_date   TEXT NOT NULL,
    status       TEXT NOT NULL
                 CHECK (status IN ('upcoming', 'in_progress', 'completed'))
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS archived_projects (
    project_id   INTEGER PRIMARY KEY,
    name         TEXT NOT NULL,
    description  TEXT NOT NULL,
    creator_id   INTEGER NOT NULL,
    creator_name TEXT NOT NULL,
    deleted_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS maintainers (
    maintainer_id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id    INTEGER NOT NULL REFERENCES live_projects(project_id) ON DELETE CASCADE,
    user_id       INTEGER NOT NULL REFERENCES identities(user_id),
    name          TEXT NOT NULL,
    UNIQUE (project_id, user_id)
);

CREATE TABLE IF NOT EXISTS contributors (
    contributor_id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id     INTEGER NOT NULL REFERENCES live_projects(project_id) ON DELETE CASCADE,
    user_id        INTEGER NOT NULL REFERENCES identities(user_id),
    name           TEXT NOT NULL,
    UNIQUE (project_id, user_id)
);

CREATE INDEX IF NOT EXISTS pending_status_idx    ON pending_submissions(status);
CREATE INDEX IF NOT EXISTS archived_creator_idx  ON archived_projects(creator_id);

PRAGMA user_version = 1;
";

/// Permission oracle DDL. Kept in a separate database file from the project
/// store.
pub const PERMISSIONS_SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS permissions (
    subject    TEXT NOT NULL,
    space      TEXT NOT NULL,
    role       TEXT NOT NULL,
    granted_at TEXT NOT NULL,
    PRIMARY KEY (subject, space, role)
);

PRAGMA user_version = 1;
";
