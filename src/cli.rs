//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Priority;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TaskPulse - todos, checkpoints and productivity insights
///
/// Track todos with checkpoints, see how productive you have been, and ask
/// the built-in assistant about your tasks.
///
/// Examples:
///   taskpulse todo add "Write report" --priority high --category Work
///   taskpulse checkpoint add <TODO_ID> "Outline"
///   taskpulse todo update <TODO_ID> --completed true
///   taskpulse analytics --format json
///   taskpulse chat "what do i have"
///   taskpulse init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .taskpulse.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Path of the JSON store file
    #[arg(long, value_name = "FILE", env = "TASKPULSE_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Email of the acting user
    #[arg(long, value_name = "EMAIL", env = "TASKPULSE_USER", global = true)]
    pub user: Option<String>,

    /// Display name of the acting user
    #[arg(long, value_name = "NAME", global = true)]
    pub name: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a default .taskpulse.toml configuration file
    InitConfig,

    /// Show productivity analytics over all todos
    Analytics {
        /// Output format (markdown, json)
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Ask the assistant about your tasks
    Chat {
        /// The message to send
        message: String,

        /// Output format (markdown, json)
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Show the assistant's response guidelines
    Rules,

    /// Manage todos
    #[command(subcommand)]
    Todo(TodoCommand),

    /// Manage checkpoints of a todo
    #[command(subcommand)]
    Checkpoint(CheckpointCommand),
}

/// Todo operations.
#[derive(Subcommand, Debug, Clone)]
pub enum TodoCommand {
    /// Create a todo
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_name = "LEVEL")]
        priority: Option<PriorityLevel>,
        #[arg(long)]
        category: Option<String>,
    },

    /// List all todos, newest first
    List,

    /// Show one todo
    Show { id: String },

    /// Update fields of a todo
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_name = "LEVEL")]
        priority: Option<PriorityLevel>,
        #[arg(long)]
        category: Option<String>,
        /// Mark completed (true) or pending (false)
        #[arg(long, value_name = "BOOL")]
        completed: Option<bool>,
    },

    /// Delete a todo and its checkpoints
    Delete { id: String },
}

/// Checkpoint operations.
#[derive(Subcommand, Debug, Clone)]
pub enum CheckpointCommand {
    /// Add a checkpoint to a todo
    Add { todo_id: String, title: String },

    /// Show one checkpoint
    Show {
        todo_id: String,
        checkpoint_id: String,
    },

    /// Update a checkpoint
    Update {
        todo_id: String,
        checkpoint_id: String,
        #[arg(long)]
        title: Option<String>,
        /// Mark completed (true) or pending (false)
        #[arg(long, value_name = "BOOL")]
        completed: Option<bool>,
    },

    /// Delete a checkpoint
    Delete {
        todo_id: String,
        checkpoint_id: String,
    },
}

/// Output format for reports and replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Priority as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PriorityLevel {
    Low,
    Medium,
    High,
}

impl From<PriorityLevel> for Priority {
    fn from(level: PriorityLevel) -> Self {
        match level {
            PriorityLevel::Low => Priority::Low,
            PriorityLevel::Medium => Priority::Medium,
            PriorityLevel::High => Priority::High,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref user) = self.user {
            if user.trim().is_empty() {
                return Err("User email must not be empty".to_string());
            }
        }

        match &self.command {
            Command::Chat { message, .. } if message.trim().is_empty() => {
                Err("Message is required".to_string())
            }
            Command::Todo(TodoCommand::Add { title, .. })
            | Command::Checkpoint(CheckpointCommand::Add { title, .. })
                if title.trim().is_empty() =>
            {
                Err("Title is required".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
