//! SQLite backends for the project forum.
//!
//! [`SqliteStore`] implements the project store; [`SqlitePermissions`]
//! implements the permission oracle over its own database file. Both wrap
//! [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod permissions;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use permissions::SqlitePermissions;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
