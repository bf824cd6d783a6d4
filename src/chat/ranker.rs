//! Task suggestion ranking.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use crate::models::issue::Issue;

/// Order candidates best-first: priority rank descending, then due date
/// ascending with undated issues last.
///
/// The sort is stable, so issues equal on both keys keep their input order.
#[must_use]
pub fn rank_candidates(candidates: &[Issue]) -> Vec<&Issue> {
    let mut ranked: Vec<&Issue> = candidates.iter().collect();
    ranked.sort_by_key(|issue| {
        (
            Reverse(issue.priority.rank()),
            issue.due_date.unwrap_or(DateTime::<Utc>::MAX_UTC),
        )
    });
    ranked
}

/// Pick the single best issue to work on from pre-filtered open candidates.
#[must_use]
pub fn select_suggestion(candidates: &[Issue]) -> Option<&Issue> {
    rank_candidates(candidates).into_iter().next()
}
