//! Issue repository for `SQLite` persistence.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

use crate::models::issue::{Issue, IssuePatch, IssueStatus, NewIssue, Priority};
use crate::models::user::User;
use crate::{AppError, Result};

use super::db::Database;

/// Column list shared by every issue query; joins the assignee.
const SELECT_ISSUE: &str = "SELECT i.id, i.title, i.description, i.status, i.priority, \
     i.assignee_id, i.created_at, i.due_date, u.name AS assignee_name, u.role AS assignee_role \
     FROM issue i LEFT JOIN user u ON u.id = i.assignee_id";

/// Newest first; `id` breaks ties between rows created in the same instant.
const NEWEST_FIRST: &str = " ORDER BY i.created_at DESC, i.id DESC";

/// Search criteria for [`IssueRepo::list`]. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Exact status.
    pub status: Option<IssueStatus>,
    /// Exact assignee identifier.
    pub assignee_id: Option<i64>,
    /// Case-insensitive substring of the assignee's name.
    pub assignee_name: Option<String>,
}

/// Repository wrapper around `SQLite` for issue records.
#[derive(Clone)]
pub struct IssueRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct IssueRow {
    id: i64,
    title: String,
    description: String,
    status: String,
    priority: String,
    assignee_id: Option<i64>,
    created_at: String,
    due_date: Option<String>,
    assignee_name: Option<String>,
    assignee_role: Option<String>,
}

impl IssueRow {
    /// Convert a database row into the domain model.
    fn into_issue(self) -> Result<Issue> {
        let status = self
            .status
            .parse::<IssueStatus>()
            .map_err(|_| AppError::Db(format!("invalid status: {}", self.status)))?;
        let priority = self
            .priority
            .parse::<Priority>()
            .map_err(|_| AppError::Db(format!("invalid priority: {}", self.priority)))?;
        let created_at = parse_stored(&self.created_at, "created_at")?;
        let due_date = self
            .due_date
            .as_deref()
            .map(|s| parse_stored(s, "due_date"))
            .transpose()?;
        let assignee = match (self.assignee_id, self.assignee_name, self.assignee_role) {
            (Some(id), Some(name), Some(role)) => Some(User { id, name, role }),
            _ => None,
        };

        Ok(Issue {
            id: self.id,
            title: self.title,
            description: self.description,
            status,
            priority,
            assignee_id: self.assignee_id,
            assignee,
            created_at,
            due_date,
        })
    }
}

fn parse_stored(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Db(format!("invalid {column}: {e}")))
}

impl IssueRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new issue stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the database insert fails.
    pub async fn create(&self, issue: &NewIssue) -> Result<Issue> {
        self.create_at(issue, Utc::now()).await
    }

    /// Insert a new issue with an explicit creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the database insert fails.
    pub async fn create_at(&self, issue: &NewIssue, created_at: DateTime<Utc>) -> Result<Issue> {
        let result = sqlx::query(
            "INSERT INTO issue (title, description, status, priority, assignee_id, created_at, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&issue.title)
        .bind(&issue.description)
        .bind(issue.status.as_str())
        .bind(issue.priority.as_str())
        .bind(issue.assignee_id)
        .bind(created_at.to_rfc3339())
        .bind(issue.due_date.map(|d| d.to_rfc3339()))
        .execute(self.db.as_ref())
        .await?;

        self.get_by_id(result.last_insert_rowid()).await
    }

    /// Retrieve an issue by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the issue does not exist.
    pub async fn get_by_id(&self, id: i64) -> Result<Issue> {
        let row: Option<IssueRow> = sqlx::query_as(&format!("{SELECT_ISSUE} WHERE i.id = ?1"))
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;
        row.ok_or_else(|| AppError::NotFound(format!("issue {id} not found")))?
            .into_issue()
    }

    /// List issues matching every set field of `filter`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_ISSUE);
        qb.push(" WHERE 1 = 1");
        if let Some(ref title) = filter.title {
            qb.push(" AND i.title LIKE ").push_bind(format!("%{title}%"));
        }
        if let Some(status) = filter.status {
            qb.push(" AND i.status = ").push_bind(status.as_str());
        }
        if let Some(assignee_id) = filter.assignee_id {
            qb.push(" AND i.assignee_id = ").push_bind(assignee_id);
        }
        if let Some(ref name) = filter.assignee_name {
            qb.push(" AND u.name LIKE ").push_bind(format!("%{name}%"));
        }
        qb.push(" ORDER BY i.id ASC");

        let rows: Vec<IssueRow> = qb.build_query_as().fetch_all(self.db.as_ref()).await?;
        rows.into_iter().map(IssueRow::into_issue).collect()
    }

    /// Apply a partial update and return the stored result.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the issue does not exist, or
    /// `AppError::Db` if the update fails.
    pub async fn update(&self, id: i64, patch: &IssuePatch) -> Result<Issue> {
        let mut current = self.get_by_id(id).await?;
        patch.apply(&mut current);

        sqlx::query(
            "UPDATE issue SET title = ?1, description = ?2, status = ?3, priority = ?4,
                 assignee_id = ?5, due_date = ?6
             WHERE id = ?7",
        )
        .bind(&current.title)
        .bind(&current.description)
        .bind(current.status.as_str())
        .bind(current.priority.as_str())
        .bind(current.assignee_id)
        .bind(current.due_date.map(|d| d.to_rfc3339()))
        .bind(id)
        .execute(self.db.as_ref())
        .await?;

        self.get_by_id(id).await
    }

    /// Change only the status of an issue.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the issue does not exist.
    pub async fn update_status(&self, id: i64, status: IssueStatus) -> Result<Issue> {
        let result = sqlx::query("UPDATE issue SET status = ?1 WHERE id = ?2")
            .bind(status.as_str())
            .bind(id)
            .execute(self.db.as_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("issue {id} not found")));
        }
        self.get_by_id(id).await
    }

    /// Delete an issue.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the issue does not exist.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM issue WHERE id = ?1")
            .bind(id)
            .execute(self.db.as_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("issue {id} not found")));
        }
        Ok(())
    }

    /// All issues with exactly `status`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_by_status(&self, status: IssueStatus) -> Result<Vec<Issue>> {
        let rows: Vec<IssueRow> =
            sqlx::query_as(&format!("{SELECT_ISSUE} WHERE i.status = ?1{NEWEST_FIRST}"))
                .bind(status.as_str())
                .fetch_all(self.db.as_ref())
                .await?;
        rows.into_iter().map(IssueRow::into_issue).collect()
    }

    /// All issues assigned to `user_id`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_by_assignee(&self, user_id: i64) -> Result<Vec<Issue>> {
        let rows: Vec<IssueRow> =
            sqlx::query_as(&format!("{SELECT_ISSUE} WHERE i.assignee_id = ?1 ORDER BY i.id ASC"))
                .bind(user_id)
                .fetch_all(self.db.as_ref())
                .await?;
        rows.into_iter().map(IssueRow::into_issue).collect()
    }

    /// Up to `limit` non-closed issues of the given priority, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_unclosed_by_priority(
        &self,
        priority: Priority,
        limit: u32,
    ) -> Result<Vec<Issue>> {
        let rows: Vec<IssueRow> = sqlx::query_as(&format!(
            "{SELECT_ISSUE} WHERE i.priority = ?1 AND i.status != 'Closed'{NEWEST_FIRST} LIMIT ?2"
        ))
        .bind(priority.as_str())
        .bind(i64::from(limit))
        .fetch_all(self.db.as_ref())
        .await?;
        rows.into_iter().map(IssueRow::into_issue).collect()
    }

    /// Up to `limit` open or in-progress issues by priority label descending
    /// (`Medium`, `Low`, `High`), then newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_active(&self, limit: u32) -> Result<Vec<Issue>> {
        let rows: Vec<IssueRow> = sqlx::query_as(&format!(
            "{SELECT_ISSUE} WHERE i.status IN ('Open', 'In-Progress') \
             ORDER BY i.priority DESC, i.created_at DESC, i.id DESC LIMIT ?1"
        ))
        .bind(i64::from(limit))
        .fetch_all(self.db.as_ref())
        .await?;
        rows.into_iter().map(IssueRow::into_issue).collect()
    }

    /// Number of issues assigned to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn count_for_assignee(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM issue WHERE assignee_id = ?1")
            .bind(user_id)
            .fetch_one(self.db.as_ref())
            .await?;
        Ok(count)
    }
}
