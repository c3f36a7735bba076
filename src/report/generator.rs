//! Markdown and JSON rendering.
//!
//! This module turns the analytics summary into a readable report, and
//! formats todo listings and chat replies for the terminal.

use crate::models::{
    AnalyticsReport, AnalyticsSummary, Priority, ReportMetadata, TodoWithCheckpoints,
};
use anyhow::Result;
use serde_json::json;

/// Generate a complete Markdown analytics report.
pub fn generate_markdown_report(report: &AnalyticsReport) -> String {
    let mut output = String::new();

    output.push_str("# TaskPulse Analytics\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_overview_section(&report.summary));
    output.push_str(&generate_priority_section(&report.summary));
    output.push_str(&generate_category_section(&report.summary));
    output.push_str(&generate_recent_section(
        &report.summary,
        report.metadata.recent_window_days,
    ));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    match metadata.user.name {
        Some(ref name) => section.push_str(&format!(
            "- **User:** {} ({})\n",
            name, metadata.user.email
        )),
        None => section.push_str(&format!("- **User:** {}\n", metadata.user.email)),
    }
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push('\n');

    section
}

fn generate_overview_section(summary: &AnalyticsSummary) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str("| Total Tasks | Completed | Completion Rate | Avg. Completion Time |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {}% | {} hrs |\n\n",
        summary.total_todos,
        summary.completed_todos,
        summary.completion_rate,
        summary.average_completion_time_hours
    ));

    section
}

fn generate_priority_section(summary: &AnalyticsSummary) -> String {
    let mut section = String::new();
    let by_priority = &summary.todos_by_priority;

    section.push_str("## Tasks by Priority\n\n");
    let unset = summary.total_todos.saturating_sub(by_priority.total());

    section.push_str(&format!(
        "| {} High | {} Medium | {} Low | Unset |\n",
        Priority::High.emoji(),
        Priority::Medium.emoji(),
        Priority::Low.emoji()
    ));
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        by_priority.high, by_priority.medium, by_priority.low, unset
    ));

    section
}

fn generate_category_section(summary: &AnalyticsSummary) -> String {
    let mut section = String::new();

    section.push_str("## Tasks by Category\n\n");

    if summary.todos_by_category.is_empty() {
        section.push_str("*No categorized tasks yet.*\n\n");
        return section;
    }

    section.push_str("| Category | Tasks |\n");
    section.push_str("|:---|:---:|\n");

    // Busiest first; the map is already name-ordered, and the sort is stable.
    let mut categories: Vec<_> = summary.todos_by_category.iter().collect();
    categories.sort_by_key(|(_, count)| std::cmp::Reverse(**count));

    for (category, count) in categories {
        section.push_str(&format!("| {} | {} |\n", category, count));
    }
    section.push('\n');

    section
}

fn generate_recent_section(summary: &AnalyticsSummary, window_days: u32) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Last {} Days\n\n", window_days));
    section.push_str(&format!("- **Tasks Created:** {}\n", summary.recent_todos));
    section.push_str(&format!(
        "- **Tasks Completed:** {}\n\n",
        summary.recent_completed_todos
    ));

    section
}

fn generate_footer() -> String {
    "---\n\n*Report generated by TaskPulse*\n".to_string()
}

/// Generate the JSON form of the summary.
pub fn generate_json_report(report: &AnalyticsReport) -> Result<String> {
    serde_json::to_string_pretty(&report.summary).map_err(Into::into)
}

/// Wrap a chat reply as a JSON body.
pub fn generate_chat_json(reply: &str) -> Result<String> {
    serde_json::to_string_pretty(&json!({ "reply": reply })).map_err(Into::into)
}

/// Render todos as a terminal listing.
pub fn generate_todo_list(todos: &[TodoWithCheckpoints]) -> String {
    if todos.is_empty() {
        return "No todos yet. Add one with `taskpulse todo add <TITLE>`.\n".to_string();
    }

    let mut output = String::new();

    for entry in todos {
        let todo = &entry.todo;
        let priority = todo
            .priority
            .map(|p| format!(" {} {}", p.emoji(), p))
            .unwrap_or_default();
        let category = todo
            .category_label()
            .map(|c| format!(" [{}]", c))
            .unwrap_or_default();

        output.push_str(&format!(
            "{} {}{}{}\n",
            todo.status_emoji(),
            todo.title,
            priority,
            category
        ));
        output.push_str(&format!("   id: {}\n", todo.id));

        if !entry.checkpoints.is_empty() {
            output.push_str(&format!(
                "   checkpoints: {}/{} completed\n",
                entry.completed_checkpoints(),
                entry.checkpoints.len()
            ));
            for checkpoint in &entry.checkpoints {
                let mark = if checkpoint.completed { "x" } else { " " };
                output.push_str(&format!(
                    "     [{}] {} ({})\n",
                    mark, checkpoint.title, checkpoint.id
                ));
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Checkpoint, PriorityBreakdown, Todo, User};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn create_test_report() -> AnalyticsReport {
        let metadata = ReportMetadata {
            user: User {
                name: Some("Ada".to_string()),
                email: "ada@example.com".to_string(),
            },
            generated_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap(),
            recent_window_days: 7,
        };

        let mut categories = BTreeMap::new();
        categories.insert("Home".to_string(), 1);
        categories.insert("Work".to_string(), 3);

        AnalyticsReport {
            metadata,
            summary: AnalyticsSummary {
                total_todos: 5,
                completed_todos: 2,
                completion_rate: "40.00".to_string(),
                todos_by_priority: PriorityBreakdown {
                    high: 2,
                    medium: 1,
                    low: 1,
                },
                todos_by_category: categories,
                recent_todos: 4,
                recent_completed_todos: 1,
                average_completion_time_hours: "1.25".to_string(),
            },
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.starts_with("# TaskPulse Analytics"));
        assert!(markdown.contains("- **User:** Ada (ada@example.com)"));
        assert!(markdown.contains("2024-06-01 08:30:00 UTC"));
        assert!(markdown.contains("| 5 | 2 | 40.00% | 1.25 hrs |"));
        assert!(markdown.contains("| 2 | 1 | 1 | 1 |"));
        assert!(markdown.contains("## Last 7 Days"));
        assert!(markdown.contains("- **Tasks Completed:** 1"));
    }

    #[test]
    fn test_category_section_orders_by_count() {
        let report = create_test_report();
        let section = generate_category_section(&report.summary);

        let work = section.find("| Work | 3 |").unwrap();
        let home = section.find("| Home | 1 |").unwrap();
        assert!(work < home);
    }

    #[test]
    fn test_category_section_empty() {
        let mut report = create_test_report();
        report.summary.todos_by_category.clear();

        let section = generate_category_section(&report.summary);
        assert!(section.contains("No categorized tasks yet"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"completionRate\": \"40.00\""));
        assert!(json.contains("\"todosByPriority\""));
        assert!(!json.contains("\"metadata\""));
    }

    #[test]
    fn test_generate_chat_json() {
        let json = generate_chat_json("# Hello Ada! 👋").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["reply"], "# Hello Ada! 👋");
    }

    #[test]
    fn test_generate_todo_list() {
        let now = Utc::now();
        let mut todo = Todo::new("ada@example.com", "Plan trip", now);
        todo.priority = Some(Priority::High);
        todo.category = Some("Travel".to_string());
        let mut step = Checkpoint::new(&todo.id, "Book hotel", now);
        step.completed = true;

        let listing = generate_todo_list(&[TodoWithCheckpoints {
            todo,
            checkpoints: vec![step],
        }]);

        assert!(listing.starts_with("⏳ Plan trip 🔴 HIGH [Travel]\n"));
        assert!(listing.contains("checkpoints: 1/1 completed"));
        assert!(listing.contains("[x] Book hotel"));
    }

    #[test]
    fn test_generate_todo_list_empty() {
        assert!(generate_todo_list(&[]).starts_with("No todos yet"));
    }
}
