//! SQLite persistence layer

mod integration_repository;
mod manager;

pub use integration_repository::SqliteCredentialStore;
pub use manager::{DbManager, SqliteConn, SqlitePool};
