//! Intent-to-query dispatch over the issue store.
//!
//! Each query returns a `Result`; [`IssueQueryService::dispatch`] logs
//! failures and degrades them to an empty answer whose `query_failed`
//! flag is set, so callers can tell "nothing matched" from "lookup broke".

use std::sync::Arc;

use tracing::{error, info};

use crate::models::issue::{Issue, IssueStatus, Priority};
use crate::persistence::db::Database;
use crate::persistence::issue_repo::IssueRepo;
use crate::persistence::user_repo::UserRepo;
use crate::Result;

use super::intent::ChatIntent;
use super::ranker;

/// Result of running the query an intent selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatAnswer {
    /// Intent that selected the query.
    pub intent: ChatIntent,
    /// Issues to present; for suggestions, the suggestion alone.
    pub issues: Vec<Issue>,
    /// Ranked suggestion, for [`ChatIntent::TaskSuggestion`] only.
    pub suggestion: Option<Issue>,
    /// One-line summary of what was found.
    pub context: String,
    /// The store query failed and `issues` was degraded to empty.
    pub query_failed: bool,
}

/// Read-only queries backing the chat endpoint.
#[derive(Clone)]
pub struct IssueQueryService {
    issues: IssueRepo,
    users: UserRepo,
    max_issues: u32,
}

impl IssueQueryService {
    /// Create a query service capping list queries at `max_issues`.
    #[must_use]
    pub fn new(db: Arc<Database>, max_issues: u32) -> Self {
        Self {
            issues: IssueRepo::new(Arc::clone(&db)),
            users: UserRepo::new(db),
            max_issues,
        }
    }

    /// Issues of the first user whose name contains `name` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if a query fails.
    pub async fn by_assignee(&self, name: &str) -> Result<Vec<Issue>> {
        let Some(user) = self.users.find_by_name_fragment(name).await? else {
            info!(assignee = name, "user not found");
            return Ok(Vec::new());
        };
        self.issues.list_by_assignee(user.id).await
    }

    /// High-priority non-closed issues newest first, padded with
    /// medium-priority ones up to the cap.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if a query fails.
    pub async fn priority_issues(&self) -> Result<Vec<Issue>> {
        let mut found = self
            .issues
            .list_unclosed_by_priority(Priority::High, self.max_issues)
            .await?;

        let remaining = self.max_issues.saturating_sub(saturating_u32(found.len()));
        if remaining > 0 {
            let medium = self
                .issues
                .list_unclosed_by_priority(Priority::Medium, remaining)
                .await?;
            found.extend(medium);
        }
        Ok(found)
    }

    /// All issues with `status`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn by_status(&self, status: IssueStatus) -> Result<Vec<Issue>> {
        self.issues.list_by_status(status).await
    }

    /// Best open issue to work on next.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn suggested_task(&self) -> Result<Option<Issue>> {
        let open = self.issues.list_by_status(IssueStatus::Open).await?;
        Ok(ranker::select_suggestion(&open).cloned())
    }

    /// Open or in-progress issues by priority then recency, capped.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn active_issues(&self) -> Result<Vec<Issue>> {
        self.issues.list_active(self.max_issues).await
    }

    /// Run the query selected by `intent`.
    pub async fn dispatch(&self, intent: ChatIntent) -> ChatAnswer {
        match intent {
            ChatIntent::TaskSuggestion => {
                let (suggestion, query_failed) =
                    degrade(self.suggested_task().await, "suggested task");
                let suggestion = suggestion.flatten();
                let context = if suggestion.is_some() {
                    "Found a suggested task based on priority and due date.".to_owned()
                } else {
                    "No Open issues available to suggest.".to_owned()
                };
                ChatAnswer {
                    intent: ChatIntent::TaskSuggestion,
                    issues: suggestion.iter().cloned().collect(),
                    suggestion,
                    context,
                    query_failed,
                }
            }
            ChatIntent::AssigneeLookup { name } => {
                let (issues, query_failed) =
                    degrade(self.by_assignee(&name).await, "issues by assignee");
                let issues = issues.unwrap_or_default();
                let context = format!("Found {} issue(s) assigned to {name}.", issues.len());
                list_answer(ChatIntent::AssigneeLookup { name }, issues, context, query_failed)
            }
            ChatIntent::PriorityQuery => {
                let (issues, query_failed) =
                    degrade(self.priority_issues().await, "priority issues");
                let issues = issues.unwrap_or_default();
                let context = format!("Found {} high priority issue(s).", issues.len());
                list_answer(ChatIntent::PriorityQuery, issues, context, query_failed)
            }
            ChatIntent::StatusQuery { status } => {
                let (issues, query_failed) =
                    degrade(self.by_status(status).await, "issues by status");
                let issues = issues.unwrap_or_default();
                let context = format!("Found {} {status} issue(s).", issues.len());
                list_answer(ChatIntent::StatusQuery { status }, issues, context, query_failed)
            }
            ChatIntent::ActiveIssues => {
                let (issues, query_failed) =
                    degrade(self.active_issues().await, "active issues");
                let issues = issues.unwrap_or_default();
                let context = format!("Found {} active issue(s).", issues.len());
                list_answer(ChatIntent::ActiveIssues, issues, context, query_failed)
            }
        }
    }
}

fn list_answer(
    intent: ChatIntent,
    issues: Vec<Issue>,
    context: String,
    query_failed: bool,
) -> ChatAnswer {
    ChatAnswer {
        intent,
        issues,
        suggestion: None,
        context,
        query_failed,
    }
}

/// Log a failed query and turn it into `(None, true)`.
fn degrade<T>(result: Result<T>, what: &str) -> (Option<T>, bool) {
    match result {
        Ok(value) => (Some(value), false),
        Err(err) => {
            error!(%err, query = what, "chat query failed");
            (None, true)
        }
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
