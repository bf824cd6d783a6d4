//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS`, so bootstrap
//! runs on every server startup.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS user (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL UNIQUE,
    role            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS issue (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    title           TEXT NOT NULL,
    description     TEXT NOT NULL,
    status          TEXT NOT NULL DEFAULT 'Open' CHECK(status IN ('Open','In-Progress','Closed')),
    priority        TEXT NOT NULL DEFAULT 'Medium' CHECK(priority IN ('Low','Medium','High')),
    assignee_id     INTEGER REFERENCES user(id),
    created_at      TEXT NOT NULL,
    due_date        TEXT
);

CREATE INDEX IF NOT EXISTS idx_issue_assignee ON issue(assignee_id);
CREATE INDEX IF NOT EXISTS idx_issue_status ON issue(status);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
