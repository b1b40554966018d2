//! Case-insensitive name filter.
//!
//! # Invariants
//! - Blank queries return the full collection in order.
//! - Matches keep their original relative order.
//! - Positions inside the result are display-only; resolve a hit back to the
//!   store through its `id`.

use crate::model::task::Task;

/// Returns the tasks whose `name` contains `query`, ignoring case.
///
/// The query is trimmed before matching.
pub fn filter_by_name(tasks: &[Task], query: &str) -> Vec<Task> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tasks.to_vec();
    }

    tasks
        .iter()
        .filter(|task| task.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
