//! Unit tests for plain-text chat reply rendering.

use bug_desk::chat::format::{issues_for_llm, issues_list, plain_reply, task_suggestion};
use bug_desk::chat::intent::ChatIntent;
use bug_desk::chat::query::ChatAnswer;
use bug_desk::models::issue::{parse_timestamp, Issue, IssueStatus, Priority};
use bug_desk::models::user::User;

fn issue(id: i64, title: &str, assignee: Option<User>) -> Issue {
    Issue {
        id,
        title: title.to_owned(),
        description: format!("{title} details"),
        status: IssueStatus::Open,
        priority: Priority::High,
        assignee_id: assignee.as_ref().map(|u| u.id),
        assignee,
        created_at: parse_timestamp("2024-06-01T08:00:00Z").expect("created_at"),
        due_date: parse_timestamp("2024-06-05"),
    }
}

fn alex() -> User {
    User {
        id: 1,
        name: "Alex".into(),
        role: "Developer".into(),
    }
}

fn answer(intent: ChatIntent, issues: Vec<Issue>, context: &str) -> ChatAnswer {
    ChatAnswer {
        intent,
        issues,
        suggestion: None,
        context: context.to_owned(),
        query_failed: false,
    }
}

#[test]
fn task_suggestion_names_title_due_date_and_assignee() {
    let text = task_suggestion(&issue(3, "Fix login", Some(alex())));
    assert!(text.starts_with("I suggest you work on: Fix login"));
    assert!(text.contains("Priority: High"));
    assert!(text.contains("Due Date: 2024-06-05"));
    assert!(text.contains("Assigned to: Alex"));
}

#[test]
fn task_suggestion_without_due_date_or_assignee() {
    let mut task = issue(3, "Fix login", None);
    task.due_date = None;
    let text = task_suggestion(&task);
    assert!(text.contains("Due Date: No due date"));
    assert!(text.contains("Assigned to: Unassigned"));
}

#[test]
fn issues_list_is_capped_at_preview() {
    let issues: Vec<Issue> = (1..=7).map(|i| issue(i, &format!("T{i}"), None)).collect();
    let text = issues_list(&issues, "Found 7 active issue(s).", 5);
    assert!(text.starts_with("Found 7 active issue(s).\n\n"));
    assert_eq!(text.lines().filter(|l| l.starts_with("- ")).count(), 5);
    assert!(text.contains("- T1 (Open, High priority, Assigned to: Unassigned)"));
    assert!(!text.contains("T6"));
}

#[test]
fn plain_reply_for_empty_list_says_nothing_matched() {
    let reply = plain_reply(
        &answer(ChatIntent::PriorityQuery, Vec::new(), "Found 0 high priority issue(s)."),
        5,
    );
    assert_eq!(
        reply,
        "Found 0 high priority issue(s). No issues match your query."
    );
}

#[test]
fn plain_reply_for_missing_suggestion() {
    let reply = plain_reply(
        &answer(
            ChatIntent::TaskSuggestion,
            Vec::new(),
            "No Open issues available to suggest.",
        ),
        5,
    );
    assert_eq!(
        reply,
        "I don't have any Open issues to suggest at the moment."
    );
}

#[test]
fn plain_reply_for_suggestion_uses_suggestion_text() {
    let task = issue(3, "Fix login", Some(alex()));
    let mut a = answer(ChatIntent::TaskSuggestion, vec![task.clone()], "ctx");
    a.suggestion = Some(task);
    assert!(plain_reply(&a, 5).starts_with("I suggest you work on: Fix login"));
}

#[test]
fn llm_context_block_lists_every_field() {
    let text = issues_for_llm(&[issue(9, "Fix login", Some(alex()))]);
    assert!(text.contains("ID: 9"));
    assert!(text.contains("Title: Fix login"));
    assert!(text.contains("Status: Open"));
    assert!(text.contains("Assigned to: Alex (Developer)"));
    assert!(text.contains("Due: 2024-06-05"));
}

#[test]
fn llm_context_block_for_no_issues() {
    assert_eq!(issues_for_llm(&[]), "No issues found.");
}

#[test]
fn llm_context_block_separates_issues() {
    let text = issues_for_llm(&[issue(1, "A", None), issue(2, "B", None)]);
    assert_eq!(text.matches("\n---\n").count(), 1);
}
