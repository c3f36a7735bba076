//! Chat context assembly.

use crate::models::{AnalyticsRecord, ChatContext, ChatTodo, Priority, TodoWithCheckpoints, User};
use std::collections::HashSet;
use tracing::debug;

/// Default number of recent todos handed to the responder.
pub const DEFAULT_CONTEXT_TODOS: usize = 10;

const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Build the per-request context from a fresh store snapshot.
///
/// Keeps the `limit` most recently created todos and the newest analytics
/// record belonging to one of them.
pub fn build_chat_context(
    user: &User,
    mut todos: Vec<TodoWithCheckpoints>,
    analytics: &[AnalyticsRecord],
    limit: usize,
) -> ChatContext {
    todos.sort_by(|a, b| b.todo.created_at.cmp(&a.todo.created_at));
    todos.truncate(limit);

    let kept: HashSet<&str> = todos.iter().map(|t| t.todo.id.as_str()).collect();
    let latest = analytics
        .iter()
        .filter(|a| kept.contains(a.todo_id.as_str()))
        .max_by_key(|a| a.created_at)
        .cloned();

    debug!(
        "Chat context: {} todos, analytics {}",
        todos.len(),
        if latest.is_some() { "present" } else { "absent" }
    );

    ChatContext {
        user: user.clone(),
        todos: todos.into_iter().map(to_chat_todo).collect(),
        analytics: latest,
    }
}

fn to_chat_todo(entry: TodoWithCheckpoints) -> ChatTodo {
    let TodoWithCheckpoints { todo, checkpoints } = entry;
    ChatTodo {
        id: todo.id,
        title: todo.title,
        description: todo.description.unwrap_or_default(),
        completed: todo.completed,
        priority: todo.priority.unwrap_or(Priority::Medium),
        category: todo
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        checkpoints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Todo;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn user() -> User {
        User {
            name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
        }
    }

    fn todo_at(title: &str, offset_hours: i64) -> TodoWithCheckpoints {
        let created_at = base_time() + Duration::hours(offset_hours);
        TodoWithCheckpoints {
            todo: Todo::new("ada@example.com", title, created_at),
            checkpoints: Vec::new(),
        }
    }

    fn record_at(todo: &TodoWithCheckpoints, hours: i64) -> AnalyticsRecord {
        AnalyticsRecord::for_new_todo(&todo.todo.id, base_time() + Duration::hours(hours))
    }

    #[test]
    fn test_keeps_newest_todos_first() {
        let todos: Vec<_> = (0..12).map(|i| todo_at(&format!("T{}", i), i)).collect();

        let context = build_chat_context(&user(), todos, &[], DEFAULT_CONTEXT_TODOS);

        assert_eq!(context.todos.len(), 10);
        assert_eq!(context.todos[0].title, "T11");
        assert_eq!(context.todos[9].title, "T2");
        assert!(context.analytics.is_none());
    }

    #[test]
    fn test_defaults_priority_and_category() {
        let mut todo = todo_at("Plain", 0);
        todo.todo.category = Some(String::new());
        let mut tagged = todo_at("Tagged", 1);
        tagged.todo.priority = Some(Priority::High);
        tagged.todo.category = Some("Work".to_string());
        tagged.todo.description = Some("Details".to_string());

        let context = build_chat_context(&user(), vec![todo, tagged], &[], 10);

        assert_eq!(context.todos[0].priority, Priority::High);
        assert_eq!(context.todos[0].category, "Work");
        assert_eq!(context.todos[0].description, "Details");
        assert_eq!(context.todos[1].priority, Priority::Medium);
        assert_eq!(context.todos[1].category, "Uncategorized");
        assert_eq!(context.todos[1].description, "");
    }

    #[test]
    fn test_picks_latest_analytics_among_kept_todos() {
        let old = todo_at("Old", 0);
        let newer = todo_at("Newer", 5);
        let newest = todo_at("Newest", 10);

        let newest_record = record_at(&newest, 10);
        let records = vec![record_at(&old, 20), record_at(&newer, 5), newest_record.clone()];

        // "Old" is dropped by the limit, so its later record is ignored.
        let context = build_chat_context(&user(), vec![old, newer, newest], &records, 2);

        assert_eq!(context.todos.len(), 2);
        assert_eq!(context.analytics, Some(newest_record));
    }
}
