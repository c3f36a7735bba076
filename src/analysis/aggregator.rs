//! Todo aggregation and statistics.
//!
//! This module computes the productivity summary shown on the analytics
//! page from a user's complete todo list.

use crate::models::{AnalyticsSummary, Priority, PriorityBreakdown, TodoWithAnalytics};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::debug;

/// Default length of the "recent" window.
pub const DEFAULT_RECENT_WINDOW_DAYS: u32 = 7;

/// Tunables for the aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorOptions {
    /// Todos created (or completed) within this window of `now` are "recent".
    pub recent_window: Duration,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self::with_window_days(DEFAULT_RECENT_WINDOW_DAYS)
    }
}

impl AggregatorOptions {
    pub fn with_window_days(days: u32) -> Self {
        Self {
            recent_window: Duration::days(i64::from(days)),
        }
    }
}

/// Compute the summary relative to the current time.
pub fn compute_analytics(
    todos: &[TodoWithAnalytics],
    options: &AggregatorOptions,
) -> AnalyticsSummary {
    compute_analytics_at(todos, options, Utc::now())
}

/// Compute the summary relative to `now`.
///
/// Never fails: an empty list yields all-zero counts and "0.00" strings.
pub fn compute_analytics_at(
    todos: &[TodoWithAnalytics],
    options: &AggregatorOptions,
    now: DateTime<Utc>,
) -> AnalyticsSummary {
    let cutoff = now - options.recent_window;

    let completed: Vec<&TodoWithAnalytics> = todos.iter().filter(|t| t.todo.completed).collect();

    let completion_rate = if todos.is_empty() {
        0.0
    } else {
        (completed.len() as f64 / todos.len() as f64) * 100.0
    };

    let recent_todos = todos.iter().filter(|t| t.todo.created_at >= cutoff).count();

    // A completed todo without a recorded completion time is not "recent".
    let recent_completed_todos = completed
        .iter()
        .filter(|t| t.completed_at().is_some_and(|at| at >= cutoff))
        .count();

    let summary = AnalyticsSummary {
        total_todos: todos.len(),
        completed_todos: completed.len(),
        completion_rate: format_decimals(completion_rate, 2),
        todos_by_priority: priority_breakdown(todos),
        todos_by_category: category_counts(todos),
        recent_todos,
        recent_completed_todos,
        average_completion_time_hours: format_decimals(average_completion_hours(&completed), 2),
    };

    debug!(
        "Aggregated {} todos ({} completed, {} recent)",
        summary.total_todos, summary.completed_todos, summary.recent_todos
    );

    summary
}

/// Count todos per priority. Todos without a priority are not counted.
pub fn priority_breakdown(todos: &[TodoWithAnalytics]) -> PriorityBreakdown {
    let mut breakdown = PriorityBreakdown::default();

    for todo in todos {
        match todo.todo.priority {
            Some(Priority::High) => breakdown.high += 1,
            Some(Priority::Medium) => breakdown.medium += 1,
            Some(Priority::Low) => breakdown.low += 1,
            None => {}
        }
    }

    breakdown
}

/// Count todos per category label. Uncategorized todos are left out.
pub fn category_counts(todos: &[TodoWithAnalytics]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for todo in todos {
        if let Some(category) = todo.todo.category_label() {
            *counts.entry(category.to_string()).or_default() += 1;
        }
    }

    counts
}

/// Mean start-to-completion time in hours over todos that recorded both
/// timestamps. Returns 0 when none did.
pub fn average_completion_hours(completed: &[&TodoWithAnalytics]) -> f64 {
    let durations: Vec<f64> = completed
        .iter()
        .filter_map(|t| t.analytics.as_ref().and_then(|a| a.completion_hours()))
        .collect();

    if durations.is_empty() {
        return 0.0;
    }

    durations.iter().sum::<f64>() / durations.len() as f64
}

/// Render `value` with `places` decimals, rounding ties away from zero.
pub fn format_decimals(value: f64, places: usize) -> String {
    let scale = 10f64.powi(places as i32);
    format!("{:.*}", places, (value * scale).round() / scale)
}
