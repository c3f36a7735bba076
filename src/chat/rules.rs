//! Response formatting guidelines for the assistant.
//!
//! These descriptors document how replies should read. They are shown by
//! `taskpulse rules` and play no part in choosing a reply.

use serde::Serialize;

/// A single formatting guideline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResponseRule {
    pub rule: &'static str,
    pub description: &'static str,
}

/// Guidelines in display order.
pub const RESPONSE_RULES: &[ResponseRule] = &[
    ResponseRule {
        rule: "Avoid JSON format in response",
        description: "Never return the entire JSON structure. Provide human-readable summaries.",
    },
    ResponseRule {
        rule: "Formatting rules",
        description: "Ensure the response is formatted using proper markdown syntax. Use headings \
                      for titles or sections, bold text for link titles or important terms, and \
                      italics for links or emphasis. If applicable, use bullet points for lists \
                      or key items. Ensure proper use of code formatting (inline `code` or code \
                      blocks) where needed and keep the structure clear and easy to read.",
    },
    ResponseRule {
        rule: "Focus on relevance",
        description: "Share only relevant details based on the user's query, especially from \
                      their todos.",
    },
    ResponseRule {
        rule: "Be concise",
        description: "Keep answers short and to the point. Avoid overwhelming the user with \
                      unnecessary data.",
    },
    ResponseRule {
        rule: "Clarify vague requests",
        description: "Ask for more details if the user's request is unclear.",
    },
    ResponseRule {
        rule: "use previous messages to process the current prompt",
        description: "just don't repeat the previous messages reply always reply to current \
                      prompt use previous messages to process the current prompt",
    },
    ResponseRule {
        rule: "return a polite thankyou and ask feel free to ask more question message",
        description: "when someone appreciate you then return proper message with polite \
                      thankyou and ask feel free to ask more question message",
    },
];

/// Render the guidelines as a numbered Markdown list.
pub fn render_rules() -> String {
    let mut output = String::from("# Response Guidelines\n\n");

    for (i, rule) in RESPONSE_RULES.iter().enumerate() {
        let number = i + 1;
        output.push_str(&format!(
            "{}. **{}**: {}\n",
            number, rule.rule, rule.description
        ));
    }

    output
}
