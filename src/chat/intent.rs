//! Chat message intent classification.
//!
//! Messages are matched against small fixed pattern lists. Classification
//! is first-match-wins in a fixed order: task suggestion, assignee lookup,
//! priority query, status query, and finally the active-issues fallback.

use regex::{Regex, RegexSet};

use crate::models::issue::IssueStatus;
use crate::Result;

/// Phrasings asking for one task to work on.
pub const TASK_SUGGESTION_PATTERNS: [&str; 5] = [
    r"suggest (?:a|one) (?:task|issue) (?:to work on|for me|to do)",
    r"what (?:task|issue) (?:should|can) i (?:work on|do|tackle)",
    r"give me (?:a|one) (?:task|issue) (?:to work on|suggestion)",
    r"recommend (?:a|one) (?:task|issue)",
    r"what (?:should|can) i (?:work on|do next)",
];

/// Phrasings naming a person; capture group 1 is the candidate name.
pub const ASSIGNEE_PATTERNS: [&str; 5] = [
    r"what (?:is|are) (\w+) (?:working on|doing|assigned to)",
    r"(\w+)'s (?:tasks|issues|work)",
    r"show (?:me )?(?:issues|tasks) (?:for|assigned to|of) (\w+)(?:\s|$)",
    r"what (?:does|is) (\w+) (?:have|working on)",
    r"who (?:is|are) (\w+)",
];

/// Phrasings asking for the most urgent issues.
pub const PRIORITY_PATTERNS: [&str; 4] = [
    r"(?:top|high|highest) priority (?:tasks|issues)",
    r"(?:suggest|show|give me) (?:tasks|priorities)",
    r"what (?:are|is) the (?:top|most important) (?:tasks|issues)",
    r"(?:urgent|important) (?:tasks|issues)",
];

/// Phrasings mentioning a status.
pub const STATUS_PATTERNS: [&str; 2] = [
    r"(?:open|in-progress|closed) (?:issues|tasks)",
    r"show (?:me )?(?:all )?(?:open|in-progress|closed)",
];

/// Words an assignee pattern may capture that are never names.
pub const NAME_STOPLIST: [&str; 10] = [
    "what", "show", "who", "me", "all", "the", "top", "high", "is", "are",
];

/// Classified purpose of a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatIntent {
    /// "What is Alex working on?"
    AssigneeLookup {
        /// Capitalized name fragment to look up.
        name: String,
    },
    /// "Suggest a task for me."
    TaskSuggestion,
    /// "Show me the top priority issues."
    PriorityQuery,
    /// "Show me open issues."
    StatusQuery {
        /// Status to list.
        status: IssueStatus,
    },
    /// Anything else.
    ActiveIssues,
}

/// Pre-compiled pattern lists. Build once at startup and share.
#[derive(Debug, Clone)]
pub struct IntentParser {
    task_suggestion: RegexSet,
    assignee: Vec<Regex>,
    priority: RegexSet,
    status: RegexSet,
}

impl IntentParser {
    /// Compile the built-in pattern lists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            task_suggestion: RegexSet::new(TASK_SUGGESTION_PATTERNS)?,
            assignee: ASSIGNEE_PATTERNS
                .iter()
                .map(|p| Regex::new(p))
                .collect::<std::result::Result<_, _>>()?,
            priority: RegexSet::new(PRIORITY_PATTERNS)?,
            status: RegexSet::new(STATUS_PATTERNS)?,
        })
    }

    /// Classify a message. Never fails; unmatched input is
    /// [`ChatIntent::ActiveIssues`].
    #[must_use]
    pub fn parse(&self, message: &str) -> ChatIntent {
        let normalized = message.trim().to_lowercase();

        if self.is_task_suggestion(&normalized) {
            return ChatIntent::TaskSuggestion;
        }
        if let Some(name) = self.extract_assignee(&normalized) {
            return ChatIntent::AssigneeLookup { name };
        }
        if self.priority.is_match(&normalized) {
            return ChatIntent::PriorityQuery;
        }
        if let Some(status) = self.extract_status(&normalized) {
            return ChatIntent::StatusQuery { status };
        }
        ChatIntent::ActiveIssues
    }

    fn is_task_suggestion(&self, normalized: &str) -> bool {
        self.task_suggestion.is_match(normalized)
    }

    /// First non-stoplisted capture across the assignee patterns, in order.
    fn extract_assignee(&self, normalized: &str) -> Option<String> {
        self.assignee.iter().find_map(|re| {
            let candidate = re.captures(normalized)?.get(1)?.as_str();
            if NAME_STOPLIST.contains(&candidate) {
                None
            } else {
                Some(capitalize(candidate))
            }
        })
    }

    fn extract_status(&self, normalized: &str) -> Option<IssueStatus> {
        if !self.status.is_match(normalized) {
            return None;
        }
        if normalized.contains("open") {
            Some(IssueStatus::Open)
        } else if normalized.contains("in-progress") || normalized.contains("in progress") {
            Some(IssueStatus::InProgress)
        } else if normalized.contains("closed") {
            Some(IssueStatus::Closed)
        } else {
            None
        }
    }
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
