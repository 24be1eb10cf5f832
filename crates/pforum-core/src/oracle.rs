//! The `PermissionOracle` trait: an external capability service answering
//! "does subject X hold role R in space S?".
//!
//! The core never sees how grants are stored. It only checks, grants and
//! revokes membership through this interface.

use std::future::Future;

/// The single role granted in every space.
pub const MEMBER_ROLE: &str = "member";

/// A named permission domain held by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
  Admins,
  Superadmins,
}

impl Space {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Admins => "admins",
      Self::Superadmins => "superadmins",
    }
  }
}

/// Abstraction over the remote permission service.
///
/// Calls are fallible remote calls. Callers do not retry; a failure surfaces
/// immediately.
pub trait PermissionOracle: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn check<'a>(
    &'a self,
    subject: &'a str,
    space: Space,
    role: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Grant `role` in `space`. Granting a role already held is not an error
  /// and does not create a second grant.
  fn grant<'a>(
    &'a self,
    subject: &'a str,
    space: Space,
    role: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Revoke `role` in `space`. Revoking a role not held is not an error.
  fn revoke<'a>(
    &'a self,
    subject: &'a str,
    space: Space,
    role: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
