//! Core types and trait definitions for the project forum.
//!
//! This crate is deliberately free of HTTP and database dependencies. It holds
//! the data model, the authorization decision table, and the lifecycle
//! executor that drives a [`store::ProjectStore`] and a
//! [`oracle::PermissionOracle`].

pub mod authz;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod oracle;
pub mod project;
pub mod store;

pub use error::{Error, Result};
