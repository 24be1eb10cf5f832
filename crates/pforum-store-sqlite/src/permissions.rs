//! [`SqlitePermissions`]: a [`PermissionOracle`] over its own SQLite file.
//!
//! Stands in for the external permission service: grants live in a
//! database separate from the project store, so role grants and identity
//! caching are never part of the same transaction.

use std::path::Path;

use chrono::Utc;
use pforum_core::oracle::{PermissionOracle, Space};

use crate::{Result, encode::encode_dt, schema::PERMISSIONS_SCHEMA};

#[derive(Clone)]
pub struct SqlitePermissions {
  conn: tokio_rusqlite::Connection,
}

impl SqlitePermissions {
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let oracle = Self { conn };
    oracle.init_schema().await?;
    Ok(oracle)
  }

  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let oracle = Self { conn };
    oracle.init_schema().await?;
    Ok(oracle)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(PERMISSIONS_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl PermissionOracle for SqlitePermissions {
  type Error = crate::Error;

  async fn check(&self, subject: &str, space: Space, role: &str) -> Result<bool> {
    let subject = subject.to_owned();
    let role = role.to_owned();

    let held = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS(
             SELECT 1 FROM permissions WHERE subject = ?1 AND space = ?2 AND role = ?3
           )",
          rusqlite::params![subject, space.as_str(), role],
          |row| row.get::<_, bool>(0),
        )?)
      })
      .await?;
    Ok(held)
  }

  async fn grant(&self, subject: &str, space: Space, role: &str) -> Result<()> {
    let subject = subject.to_owned();
    let role = role.to_owned();
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO permissions (subject, space, role, granted_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (subject, space, role) DO NOTHING",
          rusqlite::params![subject, space.as_str(), role, at_str],
        )?;
        Ok(())
      })
      .await?;
    tracing::debug!(space = space.as_str(), "permission granted");
    Ok(())
  }

  async fn revoke(&self, subject: &str, space: Space, role: &str) -> Result<()> {
    let subject = subject.to_owned();
    let role = role.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM permissions WHERE subject = ?1 AND space = ?2 AND role = ?3",
          rusqlite::params![subject, space.as_str(), role],
        )?;
        Ok(())
      })
      .await?;
    tracing::debug!(space = space.as_str(), "permission revoked");
    Ok(())
  }
}
