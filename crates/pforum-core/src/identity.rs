//! Who is acting, and the cached display names of everyone referenced.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Integer user identifier issued by the identity source.
pub type UserId = i64;

/// A denormalised name cache entry.
///
/// Upserted whenever a user is referenced (submitter, maintainer,
/// contributor, role grantee) so that historical display names survive
/// changes in the identity source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
  pub user_id: UserId,
  pub name:    String,
}

impl IdentityRecord {
  /// Build a record, rejecting a blank name.
  pub fn new(user_id: UserId, name: impl Into<String>) -> Result<Self> {
    let name = name.into();
    if name.trim().is_empty() {
      return Err(Error::InvalidInput("user_name is required".to_string()));
    }
    Ok(Self { user_id, name })
  }
}

/// The authenticated principal behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
  pub user_id: UserId,
  /// Display name offered by the identity source, if any.
  pub name:    Option<String>,
}

impl Actor {
  pub fn new(user_id: UserId) -> Self { Self { user_id, name: None } }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  /// The string form used as the subject of permission-oracle queries.
  pub fn subject(&self) -> String { self.user_id.to_string() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_identity_name_is_rejected() {
    assert!(matches!(
      IdentityRecord::new(7, "   "),
      Err(Error::InvalidInput(_))
    ));
    assert_eq!(IdentityRecord::new(7, "Ada").unwrap().name, "Ada");
  }

  #[test]
  fn actor_subject_is_decimal_id() {
    assert_eq!(Actor::new(42).subject(), "42");
  }
}
