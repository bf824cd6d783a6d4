//! Unit tests for intent dispatch against a seeded in-memory store.

use std::sync::Arc;

use chrono::{Duration, Utc};

use bug_desk::chat::intent::ChatIntent;
use bug_desk::chat::query::IssueQueryService;
use bug_desk::models::issue::{parse_timestamp, IssueStatus, NewIssue, Priority};
use bug_desk::models::user::NewUser;
use bug_desk::persistence::db::{self, Database};
use bug_desk::persistence::issue_repo::IssueRepo;
use bug_desk::persistence::user_repo::UserRepo;

struct Fixture {
    db: Arc<Database>,
    issues: IssueRepo,
    alex: i64,
}

async fn fixture() -> Fixture {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let alex = UserRepo::new(Arc::clone(&db))
        .create(&NewUser {
            name: "Alex".into(),
            role: "Developer".into(),
        })
        .await
        .expect("user")
        .id;
    let issues = IssueRepo::new(Arc::clone(&db));
    Fixture { db, issues, alex }
}

fn issue(title: &str, status: IssueStatus, priority: Priority, due: Option<&str>) -> NewIssue {
    NewIssue {
        status,
        priority,
        due_date: due.and_then(parse_timestamp),
        ..NewIssue::new(title, "d")
    }
}

#[tokio::test]
async fn assignee_lookup_returns_that_users_issues() {
    let f = fixture().await;
    let mut mine = issue("Fix login", IssueStatus::Open, Priority::High, None);
    mine.assignee_id = Some(f.alex);
    f.issues.create(&mine).await.expect("create");
    f.issues
        .create(&issue("Other", IssueStatus::Open, Priority::High, None))
        .await
        .expect("create");

    let service = IssueQueryService::new(Arc::clone(&f.db), 10);
    let answer = service
        .dispatch(ChatIntent::AssigneeLookup {
            name: "Alex".into(),
        })
        .await;

    assert!(!answer.query_failed);
    assert_eq!(answer.issues.len(), 1);
    assert_eq!(answer.issues[0].title, "Fix login");
    assert_eq!(answer.context, "Found 1 issue(s) assigned to Alex.");
}

#[tokio::test]
async fn unknown_assignee_yields_empty_answer_without_failure() {
    let f = fixture().await;
    let service = IssueQueryService::new(Arc::clone(&f.db), 10);
    let answer = service
        .dispatch(ChatIntent::AssigneeLookup {
            name: "Zed".into(),
        })
        .await;
    assert!(answer.issues.is_empty());
    assert!(!answer.query_failed);
    assert_eq!(answer.context, "Found 0 issue(s) assigned to Zed.");
}

#[tokio::test]
async fn suggestion_picks_best_open_issue() {
    let f = fixture().await;
    for (title, status, priority, due) in [
        ("medium undated", IssueStatus::Open, Priority::Medium, None),
        ("high later", IssueStatus::Open, Priority::High, Some("2024-06-10")),
        ("high sooner", IssueStatus::Open, Priority::High, Some("2024-06-05")),
        ("in progress", IssueStatus::InProgress, Priority::High, Some("2024-06-01")),
    ] {
        f.issues
            .create(&issue(title, status, priority, due))
            .await
            .expect("create");
    }

    let service = IssueQueryService::new(Arc::clone(&f.db), 10);
    let answer = service.dispatch(ChatIntent::TaskSuggestion).await;

    let suggestion = answer.suggestion.expect("suggestion");
    assert_eq!(suggestion.title, "high sooner");
    assert_eq!(answer.issues, vec![suggestion]);
    assert_eq!(
        answer.context,
        "Found a suggested task based on priority and due date."
    );
}

#[tokio::test]
async fn suggestion_without_open_issues() {
    let f = fixture().await;
    f.issues
        .create(&issue("done", IssueStatus::Closed, Priority::High, None))
        .await
        .expect("create");

    let service = IssueQueryService::new(Arc::clone(&f.db), 10);
    let answer = service.dispatch(ChatIntent::TaskSuggestion).await;
    assert!(answer.suggestion.is_none());
    assert!(answer.issues.is_empty());
    assert_eq!(answer.context, "No Open issues available to suggest.");
}

#[tokio::test]
async fn priority_query_pads_high_with_medium_up_to_cap() {
    let f = fixture().await;
    for (title, status, priority) in [
        ("h1", IssueStatus::Open, Priority::High),
        ("h2", IssueStatus::InProgress, Priority::High),
        ("h closed", IssueStatus::Closed, Priority::High),
        ("m1", IssueStatus::Open, Priority::Medium),
        ("m2", IssueStatus::Open, Priority::Medium),
        ("l1", IssueStatus::Open, Priority::Low),
    ] {
        f.issues
            .create(&issue(title, status, priority, None))
            .await
            .expect("create");
    }

    let service = IssueQueryService::new(Arc::clone(&f.db), 3);
    let answer = service.dispatch(ChatIntent::PriorityQuery).await;

    let priorities: Vec<Priority> = answer.issues.iter().map(|i| i.priority).collect();
    assert_eq!(
        priorities,
        vec![Priority::High, Priority::High, Priority::Medium]
    );
    assert!(answer.issues.iter().all(|i| i.status != IssueStatus::Closed));
    assert_eq!(answer.context, "Found 3 high priority issue(s).");
}

#[tokio::test]
async fn status_query_is_newest_first() {
    let f = fixture().await;
    let now = Utc::now();
    f.issues
        .create_at(
            &issue("older", IssueStatus::InProgress, Priority::Low, None),
            now - Duration::days(1),
        )
        .await
        .expect("create");
    f.issues
        .create_at(
            &issue("newer", IssueStatus::InProgress, Priority::Low, None),
            now,
        )
        .await
        .expect("create");

    let service = IssueQueryService::new(Arc::clone(&f.db), 10);
    let answer = service
        .dispatch(ChatIntent::StatusQuery {
            status: IssueStatus::InProgress,
        })
        .await;

    let titles: Vec<&str> = answer.issues.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["newer", "older"]);
    assert_eq!(answer.context, "Found 2 In-Progress issue(s).");
}

#[tokio::test]
async fn active_issues_respect_cap_and_skip_closed() {
    let f = fixture().await;
    for n in 0..4 {
        f.issues
            .create(&issue(&format!("open {n}"), IssueStatus::Open, Priority::Low, None))
            .await
            .expect("create");
    }
    f.issues
        .create(&issue("closed", IssueStatus::Closed, Priority::High, None))
        .await
        .expect("create");

    let service = IssueQueryService::new(Arc::clone(&f.db), 3);
    let answer = service.dispatch(ChatIntent::ActiveIssues).await;
    assert_eq!(answer.issues.len(), 3);
    assert!(answer.issues.iter().all(|i| i.status == IssueStatus::Open));
    assert_eq!(answer.context, "Found 3 active issue(s).");
}

#[tokio::test]
async fn active_issues_follow_stored_priority_label_order() {
    let f = fixture().await;
    let now = Utc::now();
    for (title, priority) in [
        ("high", Priority::High),
        ("medium", Priority::Medium),
        ("low", Priority::Low),
    ] {
        f.issues
            .create_at(&issue(title, IssueStatus::Open, priority, None), now)
            .await
            .expect("create");
    }

    let service = IssueQueryService::new(Arc::clone(&f.db), 10);
    let answer = service.dispatch(ChatIntent::ActiveIssues).await;
    let titles: Vec<&str> = answer.issues.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["medium", "low", "high"]);
}

#[tokio::test]
async fn active_issues_cap_drops_high_priority_first() {
    let f = fixture().await;
    f.issues
        .create(&issue("high", IssueStatus::Open, Priority::High, None))
        .await
        .expect("create");
    for n in 0..2 {
        f.issues
            .create(&issue(&format!("medium {n}"), IssueStatus::InProgress, Priority::Medium, None))
            .await
            .expect("create");
    }

    let service = IssueQueryService::new(Arc::clone(&f.db), 2);
    let answer = service.dispatch(ChatIntent::ActiveIssues).await;
    assert_eq!(answer.issues.len(), 2);
    assert!(answer.issues.iter().all(|i| i.priority == Priority::Medium));
}

#[tokio::test]
async fn store_failure_degrades_to_flagged_empty_answer() {
    let f = fixture().await;
    f.db.close().await;

    let service = IssueQueryService::new(Arc::clone(&f.db), 10);
    let answer = service.dispatch(ChatIntent::ActiveIssues).await;
    assert!(answer.query_failed);
    assert!(answer.issues.is_empty());
    assert_eq!(answer.context, "Found 0 active issue(s).");

    let answer = service.dispatch(ChatIntent::TaskSuggestion).await;
    assert!(answer.query_failed);
    assert!(answer.suggestion.is_none());
}
