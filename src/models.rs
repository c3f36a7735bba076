//! Data models for the task tracker.
//!
//! This module contains the records the store persists (todos, checkpoints,
//! analytics), the joined views handed to the engines, and the derived
//! summary the aggregator produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Priority level of a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    /// Low priority - whenever there is time
    Low,
    /// Medium priority - the implicit default in chat context
    Medium,
    /// High priority - do first
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "LOW"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::High => write!(f, "HIGH"),
        }
    }
}

impl Priority {
    /// Returns an emoji representation of the priority.
    pub fn emoji(&self) -> &'static str {
        match self {
            Priority::Low => "🟢",
            Priority::Medium => "🟡",
            Priority::High => "🔴",
        }
    }
}

/// Generate a fresh record identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A user-owned task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the todo is done.
    #[serde(default)]
    pub completed: bool,
    /// Optional priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Optional free-text category label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Email of the owning user.
    pub user_id: String,
}

impl Todo {
    /// Creates a new, incomplete todo owned by `user_id`.
    pub fn new(user_id: &str, title: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            title: title.to_string(),
            description: None,
            completed: false,
            priority: None,
            category: None,
            created_at,
            user_id: user_id.to_string(),
        }
    }

    /// Completion glyph used in chat replies and listings.
    pub fn status_emoji(&self) -> &'static str {
        status_emoji(self.completed)
    }

    /// Category label, if present and non-empty.
    pub fn category_label(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// Completion glyph for a completed flag.
pub fn status_emoji(completed: bool) -> &'static str {
    if completed {
        "✅"
    } else {
        "⏳"
    }
}

/// A sub-task belonging to exactly one todo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Parent todo.
    pub todo_id: String,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(todo_id: &str, title: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            title: title.to_string(),
            completed: false,
            todo_id: todo_id.to_string(),
            created_at,
        }
    }
}

/// Per-todo lifecycle and metric record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRecord {
    pub id: String,
    /// The todo this record tracks (one-to-one).
    pub todo_id: String,
    #[serde(default)]
    pub total_tasks: u32,
    #[serde(default)]
    pub completed_tasks: u32,
    /// Minutes spent on the todo.
    #[serde(default)]
    pub time_spent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Set when the todo transitions to completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsRecord {
    /// Creates the record attached to a freshly created todo.
    pub fn for_new_todo(todo_id: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            todo_id: todo_id.to_string(),
            total_tasks: 1,
            completed_tasks: 0,
            time_spent: 0.0,
            started_at: Some(created_at),
            completed_at: None,
            created_at,
        }
    }

    /// Hours between start and completion, when both are known.
    pub fn completion_hours(&self) -> Option<f64> {
        match (self.started_at, self.completed_at) {
            (Some(started), Some(completed)) => {
                let millis = (completed - started).num_milliseconds();
                Some(millis as f64 / MILLIS_PER_HOUR)
            }
            _ => None,
        }
    }
}

const MILLIS_PER_HOUR: f64 = 1000.0 * 60.0 * 60.0;

/// The acting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name, if the user set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Identity key; todos reference it as their owner.
    pub email: String,
}

/// A todo joined with its (optional) analytics record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoWithAnalytics {
    #[serde(flatten)]
    pub todo: Todo,
    pub analytics: Option<AnalyticsRecord>,
}

impl TodoWithAnalytics {
    /// Completion time recorded by the analytics record, if any.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.analytics.as_ref().and_then(|a| a.completed_at)
    }
}

/// A todo joined with its checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoWithCheckpoints {
    #[serde(flatten)]
    pub todo: Todo,
    pub checkpoints: Vec<Checkpoint>,
}

impl TodoWithCheckpoints {
    /// Number of completed checkpoints.
    pub fn completed_checkpoints(&self) -> usize {
        self.checkpoints.iter().filter(|c| c.completed).count()
    }
}

/// A todo as presented to the responder.
///
/// Priority and category are defaulted here ("MEDIUM" and "Uncategorized");
/// the raw todo keeps them optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTodo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub category: String,
    pub checkpoints: Vec<Checkpoint>,
}

impl ChatTodo {
    pub fn status_emoji(&self) -> &'static str {
        status_emoji(self.completed)
    }

    pub fn completed_checkpoints(&self) -> usize {
        self.checkpoints.iter().filter(|c| c.completed).count()
    }
}

/// Per-request bundle handed to the responder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatContext {
    pub user: User,
    /// Most recently created todos, newest first.
    pub todos: Vec<ChatTodo>,
    /// Latest analytics record among `todos`.
    pub analytics: Option<AnalyticsRecord>,
}

/// Todo counts per priority bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityBreakdown {
    /// Sum over all three buckets.
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Summary statistics over all of a user's todos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_todos: usize,
    pub completed_todos: usize,
    /// Percentage with two decimals, e.g. "66.67".
    pub completion_rate: String,
    pub todos_by_priority: PriorityBreakdown,
    pub todos_by_category: BTreeMap<String, usize>,
    pub recent_todos: usize,
    pub recent_completed_todos: usize,
    /// Hours with two decimals.
    pub average_completion_time_hours: String,
}

/// Metadata about an analytics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// The user the report was computed for.
    pub user: User,
    /// When the summary was computed.
    pub generated_at: DateTime<Utc>,
    /// Length of the "recent" window in days.
    pub recent_window_days: u32,
}

/// A complete analytics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub metadata: ReportMetadata,
    pub summary: AnalyticsSummary,
}
