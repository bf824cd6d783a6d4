//! Plain-text rendering of chat answers.

use crate::models::issue::Issue;

use super::intent::ChatIntent;
use super::query::ChatAnswer;

/// Render issues as the context block handed to the language model.
#[must_use]
pub fn issues_for_llm(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return "No issues found.".to_owned();
    }

    issues
        .iter()
        .map(|issue| {
            let assignee = issue.assignee.as_ref().map_or_else(
                || "Unassigned".to_owned(),
                |user| format!("Assigned to: {} ({})", user.name, user.role),
            );
            let due = issue
                .due_date
                .map_or_else(|| "No due date".to_owned(), |d| format!("Due: {}", d.to_rfc3339()));
            format!(
                "ID: {}\nTitle: {}\nDescription: {}\nStatus: {}\nPriority: {}\n{assignee}\n{due}\nCreated: {}\n",
                issue.id,
                issue.title,
                issue.description,
                issue.status,
                issue.priority,
                issue.created_at.to_rfc3339(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

/// Suggestion reply used when no language model is available.
#[must_use]
pub fn task_suggestion(task: &Issue) -> String {
    let due = task
        .due_date
        .map_or_else(|| "No due date".to_owned(), |d| d.format("%Y-%m-%d").to_string());
    format!(
        "I suggest you work on: {}\n\nDescription: {}\nPriority: {}\nDue Date: {due}\nAssigned to: {}",
        task.title,
        task.description,
        task.priority,
        task.assignee_name(),
    )
}

/// Context line followed by up to `preview` one-line issue summaries.
#[must_use]
pub fn issues_list(issues: &[Issue], context: &str, preview: usize) -> String {
    let mut out = format!("{context}\n\n");
    for issue in issues.iter().take(preview) {
        out.push_str(&format!(
            "- {} ({}, {} priority, Assigned to: {})\n",
            issue.title,
            issue.status,
            issue.priority,
            issue.assignee_name(),
        ));
    }
    out
}

/// Full reply for an answer when the language model is not used.
#[must_use]
pub fn plain_reply(answer: &ChatAnswer, preview: usize) -> String {
    if answer.intent == ChatIntent::TaskSuggestion {
        return answer.suggestion.as_ref().map_or_else(
            || "I don't have any Open issues to suggest at the moment.".to_owned(),
            task_suggestion,
        );
    }
    if answer.issues.is_empty() {
        format!("{} No issues match your query.", answer.context)
    } else {
        issues_list(&answer.issues, &answer.context, preview)
    }
}
