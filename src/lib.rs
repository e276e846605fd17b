//! Client and phone records kept in PostgreSQL.
//!
//! [`db::Database`] owns the connection pool and exposes every repository
//! operation; [`demo::run`] walks through them once end to end.

pub mod config;
pub mod db;
pub mod demo;
pub mod error;
pub mod models;

pub use db::Database;
pub use error::{RegistryError, Result};
