//! User repository for `SQLite` persistence.

use std::sync::Arc;

use crate::models::user::{NewUser, User};
use crate::{AppError, Result};

use super::db::Database;
use super::issue_repo::IssueRepo;

/// Repository wrapper around `SQLite` for user records.
#[derive(Clone)]
pub struct UserRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    role: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            role: row.role,
        }
    }
}

impl UserRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new user. Names are unique, enforced by the `UNIQUE`
    /// constraint so concurrent inserts cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` if a user with the same name exists,
    /// or `AppError::Db` if the insert fails.
    pub async fn create(&self, user: &NewUser) -> Result<User> {
        let result = sqlx::query("INSERT INTO user (name, role) VALUES (?1, ?2)")
            .bind(&user.name)
            .bind(&user.role)
            .execute(self.db.as_ref())
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AppError::Conflict("User with this name already exists".into())
                }
                other => AppError::from(other),
            })?;

        Ok(User {
            id: result.last_insert_rowid(),
            name: user.name.clone(),
            role: user.role.clone(),
        })
    }

    /// Retrieve a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the user does not exist.
    pub async fn get_by_id(&self, id: i64) -> Result<User> {
        let row: Option<UserRow> = sqlx::query_as("SELECT id, name, role FROM user WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;
        row.map(User::from)
            .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))
    }

    /// All users in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as("SELECT id, name, role FROM user ORDER BY id ASC")
            .fetch_all(self.db.as_ref())
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    /// First user (lowest id) whose name contains `fragment`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn find_by_name_fragment(&self, fragment: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, role FROM user
             WHERE LOWER(name) LIKE '%' || LOWER(?1) || '%'
             ORDER BY id ASC LIMIT 1",
        )
        .bind(fragment)
        .fetch_optional(self.db.as_ref())
        .await?;
        Ok(row.map(User::from))
    }

    /// Whether any user exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn is_empty(&self) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user")
            .fetch_one(self.db.as_ref())
            .await?;
        Ok(count == 0)
    }

    /// Delete a user that has no assigned issues.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the user does not exist, or
    /// `AppError::Conflict` if issues are still assigned to them.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.get_by_id(id).await?;

        let assigned = IssueRepo::new(Arc::clone(&self.db))
            .count_for_assignee(id)
            .await?;
        if assigned > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete user. User has {assigned} assigned issue(s). \
                 Please reassign or delete those issues first."
            )));
        }

        sqlx::query("DELETE FROM user WHERE id = ?1")
            .bind(id)
            .execute(self.db.as_ref())
            .await?;
        Ok(())
    }
}
