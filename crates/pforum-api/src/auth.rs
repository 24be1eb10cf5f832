//! Identity resolution from request headers.
//!
//! Authentication itself happens upstream; by the time a request reaches
//! this service the caller's numeric id is in `X-User-Id`, optionally with a
//! display name in `X-User-Name`.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use pforum_core::{Error, identity::Actor};

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// An authenticated actor. Present in a handler means identity resolved.
pub struct Authenticated(pub Actor);

/// Resolve the actor from headers. A missing or non-numeric id is
/// `Unauthenticated`; an unreadable or blank name is ignored.
pub fn resolve_actor(headers: &HeaderMap) -> Result<Actor, Error> {
  let user_id = headers
    .get(USER_ID_HEADER)
    .and_then(|v| v.to_str().ok())
    .and_then(|s| s.trim().parse::<i64>().ok())
    .ok_or(Error::Unauthenticated)?;

  let name = headers
    .get(USER_NAME_HEADER)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|s| !s.is_empty());

  Ok(match name {
    Some(name) => Actor::new(user_id).with_name(name),
    None => Actor::new(user_id),
  })
}

impl<S> FromRequestParts<S> for Authenticated
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    Ok(Authenticated(resolve_actor(&parts.headers)?))
  }
}
