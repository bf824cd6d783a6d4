//! Persistence layer modules.

pub mod db;
pub mod issue_repo;
pub mod schema;
pub mod seed;
pub mod user_repo;

/// Re-export the database pool type for convenience.
pub use sqlx::SqlitePool;
