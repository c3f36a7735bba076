//! Rule-based reply generation.
//!
//! A message is matched against an ordered table of keyword rules; the first
//! rule whose predicate accepts the lowercased message produces the reply.
//! Replies are Markdown and are not sanitized here.

use crate::analysis::format_decimals;
use crate::models::ChatContext;

/// Most recent todos listed by the task overview.
const TASK_OVERVIEW_LIMIT: usize = 5;
/// Completed todos listed under "Recent Achievements".
const ACHIEVEMENTS_LIMIT: usize = 3;
/// Recent todos listed by the fallback reply.
const FALLBACK_TASKS_LIMIT: usize = 3;

const GREETING_PREFIXES: &[&str] = &["hi", "hello", "hey", "greetings"];
const TASK_KEYWORDS: &[&str] = &["todo", "task", "list", "what do i have"];
const ANALYTICS_KEYWORDS: &[&str] = &["analytics", "stats", "progress", "productivity"];
const GRATITUDE_KEYWORDS: &[&str] = &["thank", "thanks", "appreciate"];

const EMPTY_TASKS_REPLY: &str =
    "## You don't have any tasks yet\n\nWould you like me to help you create your first task?";

const NO_ANALYTICS_REPLY: &str = "## No Analytics Available\n\nYou don't have any analytics data \
                                  yet. Start completing tasks to see your productivity insights!";

const GRATITUDE_REPLY: &str = "# Thank you for your kind words! 🙏\n\nI'm glad I could help. \
                               Feel free to ask me anything else about your tasks or \
                               productivity. I'm here to assist you!";

const CAPABILITIES: &[&str] = &[
    "Suggest priorities",
    "Help organize your workflow",
    "Provide productivity tips",
    "Answer questions about task management",
];

/// Which rule produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Greeting,
    TaskQuery,
    AnalyticsQuery,
    Gratitude,
    Fallback,
}

/// A keyword rule: a predicate over the lowercased message and the reply
/// builder it selects.
struct Rule {
    kind: RuleKind,
    matches: fn(&str) -> bool,
    respond: fn(&str, &ChatContext) -> String,
}

/// Keyword rules in evaluation order.
static RULES: &[Rule] = &[
    Rule {
        kind: RuleKind::Greeting,
        matches: is_greeting,
        respond: greeting_reply,
    },
    Rule {
        kind: RuleKind::TaskQuery,
        matches: is_task_query,
        respond: task_reply,
    },
    Rule {
        kind: RuleKind::AnalyticsQuery,
        matches: is_analytics_query,
        respond: analytics_reply,
    },
    Rule {
        kind: RuleKind::Gratitude,
        matches: is_gratitude,
        respond: gratitude_reply,
    },
];

/// Applies when no keyword rule does.
static FALLBACK: Rule = Rule {
    kind: RuleKind::Fallback,
    matches: always,
    respond: fallback_reply,
};

/// Produce the reply for `message`.
///
/// `message` is expected to be non-empty; the caller rejects blank input.
pub fn reply(message: &str, context: &ChatContext) -> String {
    let rule = select_rule(message);
    (rule.respond)(message, context)
}

/// Which rule `message` would be answered by.
pub fn classify(message: &str) -> RuleKind {
    select_rule(message).kind
}

fn select_rule(message: &str) -> &'static Rule {
    let lowered = message.to_lowercase();
    RULES
        .iter()
        .find(|rule| (rule.matches)(&lowered))
        .unwrap_or(&FALLBACK)
}

fn always(_lowered: &str) -> bool {
    true
}

fn is_greeting(lowered: &str) -> bool {
    GREETING_PREFIXES.iter().any(|p| lowered.starts_with(p))
}

fn is_task_query(lowered: &str) -> bool {
    contains_any(lowered, TASK_KEYWORDS)
}

fn is_analytics_query(lowered: &str) -> bool {
    contains_any(lowered, ANALYTICS_KEYWORDS)
}

fn is_gratitude(lowered: &str) -> bool {
    contains_any(lowered, GRATITUDE_KEYWORDS)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn greeting_reply(_message: &str, context: &ChatContext) -> String {
    let name = context.user.name.as_deref().unwrap_or("there");
    format!(
        "# Hello {}! 👋\n\nHow can I help you with your tasks today?",
        name
    )
}

fn task_reply(_message: &str, context: &ChatContext) -> String {
    let todos = &context.todos;
    if todos.is_empty() {
        return EMPTY_TASKS_REPLY.to_string();
    }

    let completed = todos.iter().filter(|t| t.completed).count();
    let pending = todos.len() - completed;

    let mut reply = String::new();
    reply.push_str("## Your Tasks Overview\n\n");
    reply.push_str(&format!("You have **{}** tasks in total:\n", todos.len()));
    reply.push_str(&format!("- **{}** completed\n", completed));
    reply.push_str(&format!("- **{}** pending\n\n", pending));
    reply.push_str("### Recent Tasks:\n\n");

    for todo in todos.iter().take(TASK_OVERVIEW_LIMIT) {
        reply.push_str(&format!("- {} **{}**\n", todo.status_emoji(), todo.title));
        if !todo.checkpoints.is_empty() {
            reply.push_str(&format!(
                "  - Checkpoints: {}/{} completed\n",
                todo.completed_checkpoints(),
                todo.checkpoints.len()
            ));
        }
    }

    if todos.len() > TASK_OVERVIEW_LIMIT {
        reply.push_str(&format!(
            "\n*You have {} more tasks. Would you like to see them all?*",
            todos.len() - TASK_OVERVIEW_LIMIT
        ));
    }

    reply
}

fn analytics_reply(_message: &str, context: &ChatContext) -> String {
    let Some(data) = context.analytics.as_ref() else {
        return NO_ANALYTICS_REPLY.to_string();
    };

    // Not guarded: a zero total renders as NaN or inf.
    let rate = f64::from(data.completed_tasks) / f64::from(data.total_tasks) * 100.0;

    let mut reply = String::new();
    reply.push_str("## Your Productivity Insights\n\n");
    reply.push_str(&format!("- **Total Tasks**: {}\n", data.total_tasks));
    reply.push_str(&format!(
        "- **Completed Tasks**: {}\n",
        data.completed_tasks
    ));
    reply.push_str(&format!("- **Completion Rate**: {}%\n", rate));
    reply.push_str(&format!(
        "- **Time Spent**: {} minutes\n\n",
        format_decimals(data.time_spent, 1)
    ));

    if data.completed_tasks > 0 {
        reply.push_str("### Recent Achievements\n\n");
        for todo in context
            .todos
            .iter()
            .filter(|t| t.completed)
            .take(ACHIEVEMENTS_LIMIT)
        {
            reply.push_str(&format!("- ✅ **{}**\n", todo.title));
        }
    }

    reply
}

fn gratitude_reply(_message: &str, _context: &ChatContext) -> String {
    GRATITUDE_REPLY.to_string()
}

fn fallback_reply(message: &str, context: &ChatContext) -> String {
    let mut reply = format!("## I understand you're asking about: \"{}\"\n\n", message);

    if !context.todos.is_empty() {
        reply.push_str("### Your Recent Tasks\n\n");
        for todo in context.todos.iter().take(FALLBACK_TASKS_LIMIT) {
            reply.push_str(&format!("- {} **{}**\n", todo.status_emoji(), todo.title));
        }
    }

    reply.push_str("\nHow can I help you with these tasks? I can:\n");
    for capability in CAPABILITIES {
        reply.push_str(&format!("- {}\n", capability));
    }
    reply.push_str("\nJust let me know what you need!");

    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalyticsRecord, ChatTodo, Checkpoint, Priority, User};
    use chrono::Utc;

    fn create_test_todo(title: &str, completed: bool) -> ChatTodo {
        ChatTodo {
            id: format!("id-{}", title),
            title: title.to_string(),
            description: String::new(),
            completed,
            priority: Priority::Medium,
            category: "Uncategorized".to_string(),
            checkpoints: Vec::new(),
        }
    }

    fn create_context(name: Option<&str>, todos: Vec<ChatTodo>) -> ChatContext {
        ChatContext {
            user: User {
                name: name.map(String::from),
                email: "ada@example.com".to_string(),
            },
            todos,
            analytics: None,
        }
    }

    fn create_analytics(total: u32, completed: u32, time_spent: f64) -> AnalyticsRecord {
        let mut record = AnalyticsRecord::for_new_todo("t1", Utc::now());
        record.total_tasks = total;
        record.completed_tasks = completed;
        record.time_spent = time_spent;
        record
    }

    #[test]
    fn test_greeting_uses_name() {
        let context = create_context(Some("Ada"), Vec::new());
        let reply = reply("Hello", &context);
        assert!(reply.starts_with("# Hello Ada! 👋"));
        assert!(reply.ends_with("How can I help you with your tasks today?"));
    }

    #[test]
    fn test_greeting_falls_back_to_there() {
        let context = create_context(None, Vec::new());
        assert!(reply("hey you", &context).starts_with("# Hello there! 👋"));
    }

    #[test]
    fn test_greeting_is_prefix_match_only() {
        assert_eq!(classify("GREETINGS friend"), RuleKind::Greeting);
        assert_eq!(classify("oh hi"), RuleKind::Fallback);
    }

    #[test]
    fn test_first_match_wins() {
        // Greeting beats the task keyword that follows it.
        assert_eq!(classify("hi, show my tasks"), RuleKind::Greeting);
        // Task query beats analytics.
        assert_eq!(classify("task progress"), RuleKind::TaskQuery);
        // Analytics beats gratitude.
        assert_eq!(classify("thanks for the stats"), RuleKind::AnalyticsQuery);
    }

    #[test]
    fn test_classify_keywords() {
        assert_eq!(classify("What do I have today?"), RuleKind::TaskQuery);
        assert_eq!(classify("show my TODO items"), RuleKind::TaskQuery);
        assert_eq!(classify("How is my productivity"), RuleKind::AnalyticsQuery);
        assert_eq!(classify("I appreciate it"), RuleKind::Gratitude);
        assert_eq!(classify("xyz123 random"), RuleKind::Fallback);
    }

    #[test]
    fn test_task_query_without_todos() {
        let context = create_context(Some("Ada"), Vec::new());
        assert_eq!(reply("what do i have", &context), EMPTY_TASKS_REPLY);
    }

    #[test]
    fn test_task_query_overview() {
        let mut first = create_test_todo("Write report", false);
        let mut done = Checkpoint::new(&first.id, "Outline", Utc::now());
        done.completed = true;
        first.checkpoints = vec![
            done,
            Checkpoint::new(&first.id, "Draft", Utc::now()),
            Checkpoint::new(&first.id, "Edit", Utc::now()),
        ];
        let todos = vec![first, create_test_todo("Buy milk", true)];
        let context = create_context(Some("Ada"), todos);

        let reply = reply("list", &context);
        let with_checkpoints = "- ⏳ **Write report**\n  - Checkpoints: 1/3 completed\n";

        assert!(reply.starts_with("## Your Tasks Overview\n\n"));
        assert!(reply.contains("You have **2** tasks in total:"));
        assert!(reply.contains("- **1** completed\n"));
        assert!(reply.contains("- **1** pending\n"));
        assert!(reply.contains(with_checkpoints));
        assert!(reply.contains("- ✅ **Buy milk**\n"));
        assert!(!reply.contains("more tasks"));
    }

    #[test]
    fn test_task_query_truncates_to_five() {
        let todos: Vec<ChatTodo> = (1..=7)
            .map(|i| create_test_todo(&format!("Task {}", i), false))
            .collect();
        let context = create_context(None, todos);

        let reply = reply("my tasks", &context);
        let more = "\n*You have 2 more tasks. Would you like to see them all?*";

        assert!(reply.contains("**Task 5**"));
        assert!(!reply.contains("**Task 6**"));
        assert!(reply.ends_with(more));
    }

    #[test]
    fn test_analytics_without_record() {
        let context = create_context(None, Vec::new());
        assert_eq!(reply("show analytics", &context), NO_ANALYTICS_REPLY);
    }

    #[test]
    fn test_analytics_reply() {
        let mut context = create_context(
            None,
            vec![
                create_test_todo("Pending", false),
                create_test_todo("Done one", true),
                create_test_todo("Done two", true),
            ],
        );
        context.analytics = Some(create_analytics(8, 3, 42.26));

        let reply = reply("stats please", &context);
        let achievements = "### Recent Achievements\n\n- ✅ **Done one**\n- ✅ **Done two**\n";

        assert!(reply.contains("- **Total Tasks**: 8\n"));
        assert!(reply.contains("- **Completed Tasks**: 3\n"));
        assert!(reply.contains("- **Completion Rate**: 37.5%\n"));
        assert!(reply.contains("- **Time Spent**: 42.3 minutes\n"));
        assert!(reply.contains(achievements));
        assert!(!reply.contains("Pending"));
    }

    #[test]
    fn test_analytics_reply_without_completions() {
        let mut context = create_context(None, vec![create_test_todo("Pending", false)]);
        context.analytics = Some(create_analytics(1, 0, 0.0));

        let reply = reply("progress", &context);

        assert!(reply.contains("- **Completion Rate**: 0%\n"));
        assert!(!reply.contains("Recent Achievements"));
    }

    #[test]
    fn test_time_spent_rounds_half_up() {
        let mut context = create_context(None, Vec::new());
        context.analytics = Some(create_analytics(1, 0, 0.25));

        let reply = reply("progress", &context);

        assert!(reply.contains("- **Time Spent**: 0.3 minutes\n"));
    }

    #[test]
    fn test_analytics_reply_zero_total_is_not_finite() {
        let mut context = create_context(None, Vec::new());
        context.analytics = Some(create_analytics(0, 0, 0.0));

        let reply = reply("analytics", &context);

        assert!(reply.contains("- **Completion Rate**: NaN%\n"));
    }

    #[test]
    fn test_gratitude_ignores_todos() {
        let context = create_context(Some("Ada"), vec![create_test_todo("Something", false)]);
        assert_eq!(reply("thanks a lot", &context), GRATITUDE_REPLY);
    }

    #[test]
    fn test_fallback_lists_three_recent_todos() {
        let todos: Vec<ChatTodo> = (1..=4)
            .map(|i| create_test_todo(&format!("Item {}", i), i % 2 == 0))
            .collect();
        let context = create_context(None, todos);

        let reply = reply("xyz123 random", &context);
        let echo = "## I understand you're asking about: \"xyz123 random\"\n\n";

        assert!(reply.starts_with(echo));
        assert!(reply.contains("### Your Recent Tasks\n\n"));
        assert_eq!(reply.matches("**Item").count(), 3);
        assert!(!reply.contains("Item 4"));
        assert!(reply.ends_with(
            "- Suggest priorities\n\
             - Help organize your workflow\n\
             - Provide productivity tips\n\
             - Answer questions about task management\n\
             \nJust let me know what you need!"
        ));
    }

    #[test]
    fn test_fallback_without_todos() {
        let context = create_context(None, Vec::new());
        let reply = reply("something else", &context);
        assert!(!reply.contains("Your Recent Tasks"));
        let menu = "\n\n\nHow can I help you with these tasks? I can:\n";
        assert!(reply.contains(menu));
    }
}
