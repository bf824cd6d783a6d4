//! Sample data for a freshly created database.
//!
//! Seeding runs once at startup and only when the user table is empty.
//! Failures are logged and never abort startup.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::{info, warn};

use crate::models::issue::{IssueStatus, NewIssue, Priority};
use crate::models::user::{NewUser, User};
use crate::Result;

use super::db::Database;
use super::issue_repo::IssueRepo;
use super::user_repo::UserRepo;

const USERS: [(&str, &str); 5] = [
    ("Alex", "Developer"),
    ("Maddy", "QA Engineer"),
    ("Sarah", "Project Manager"),
    ("John", "Developer"),
    ("Emily", "Designer"),
];

/// Issue template: title, description, status, priority, assignee name,
/// due date as an offset in days from Monday of the current week.
type IssueSeed = (
    &'static str,
    &'static str,
    IssueStatus,
    Priority,
    Option<&'static str>,
    i64,
);

const ISSUES: [IssueSeed; 14] = [
    (
        "Fix login authentication bug",
        "Users are unable to log in with their credentials. Need to investigate and fix the authentication flow.",
        IssueStatus::Open,
        Priority::High,
        Some("Alex"),
        1,
    ),
    (
        "Implement user profile page",
        "Create a new user profile page with edit functionality and avatar upload.",
        IssueStatus::InProgress,
        Priority::High,
        Some("Alex"),
        3,
    ),
    (
        "Optimize database queries",
        "Review and optimize slow database queries in the dashboard endpoint.",
        IssueStatus::Open,
        Priority::Medium,
        Some("Alex"),
        5,
    ),
    (
        "Test payment integration",
        "Write comprehensive tests for the new payment integration feature.",
        IssueStatus::Open,
        Priority::High,
        Some("Maddy"),
        2,
    ),
    (
        "Review pull request #123",
        "Review and test the changes in pull request #123 before merging.",
        IssueStatus::InProgress,
        Priority::Medium,
        Some("Maddy"),
        4,
    ),
    (
        "Update test documentation",
        "Update the test documentation with new test cases and procedures.",
        IssueStatus::Open,
        Priority::Low,
        Some("Maddy"),
        6,
    ),
    (
        "Plan sprint 15",
        "Plan and organize tasks for sprint 15, including backlog grooming.",
        IssueStatus::Open,
        Priority::High,
        Some("Sarah"),
        0,
    ),
    (
        "Client meeting preparation",
        "Prepare presentation and materials for the upcoming client meeting.",
        IssueStatus::InProgress,
        Priority::Medium,
        Some("Sarah"),
        1,
    ),
    (
        "Refactor API endpoints",
        "Refactor the REST API endpoints to follow best practices and improve maintainability.",
        IssueStatus::Open,
        Priority::Medium,
        Some("John"),
        2,
    ),
    (
        "Add error logging",
        "Implement comprehensive error logging system for better debugging.",
        IssueStatus::Closed,
        Priority::Low,
        Some("John"),
        -2,
    ),
    (
        "Design new dashboard UI",
        "Create mockups and designs for the new dashboard user interface.",
        IssueStatus::Open,
        Priority::High,
        Some("Emily"),
        3,
    ),
    (
        "Update brand colors",
        "Update the application with new brand colors and styling guidelines.",
        IssueStatus::InProgress,
        Priority::Medium,
        Some("Emily"),
        4,
    ),
    (
        "Security audit",
        "Conduct a comprehensive security audit of the application.",
        IssueStatus::Open,
        Priority::High,
        None,
        1,
    ),
    (
        "Update dependencies",
        "Update all project dependencies to their latest stable versions.",
        IssueStatus::Open,
        Priority::Low,
        None,
        5,
    ),
];

/// Midnight (UTC) of the Monday in the week containing `today`.
#[must_use]
pub fn week_start(today: NaiveDate) -> DateTime<Utc> {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    monday.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Insert the sample users and issues if the database has no users.
///
/// Returns `true` when data was inserted. Errors are logged, not returned.
pub async fn seed_if_empty(db: Arc<Database>) -> bool {
    match try_seed(db).await {
        Ok(seeded) => seeded,
        Err(err) => {
            warn!(%err, "error seeding sample data");
            false
        }
    }
}

async fn try_seed(db: Arc<Database>) -> Result<bool> {
    let users = UserRepo::new(Arc::clone(&db));
    let issues = IssueRepo::new(db);

    if !users.is_empty().await? {
        return Ok(false);
    }

    let mut created: Vec<User> = Vec::with_capacity(USERS.len());
    for (name, role) in USERS {
        let user = users
            .create(&NewUser {
                name: name.into(),
                role: role.into(),
            })
            .await?;
        created.push(user);
    }

    let monday = week_start(Utc::now().date_naive());
    for (title, description, status, priority, assignee, due_offset) in ISSUES {
        let assignee_id = assignee.and_then(|name| {
            created
                .iter()
                .find(|user| user.name == name)
                .map(|user| user.id)
        });
        let issue = NewIssue {
            title: title.into(),
            description: description.into(),
            status,
            priority,
            assignee_id,
            due_date: Some(monday + Duration::days(due_offset)),
        };
        issues.create(&issue).await?;
    }

    info!(
        users = created.len(),
        issues = ISSUES.len(),
        "sample data seeded"
    );
    Ok(true)
}
