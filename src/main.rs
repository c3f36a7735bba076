//! TaskPulse - personal todo tracker
//!
//! A CLI tool that keeps todos with checkpoints in a local JSON store,
//! summarizes productivity, and answers questions through a rule-based
//! assistant.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (invalid arguments, config, store access, unknown todo, etc.)

mod analysis;
mod chat;
mod cli;
mod config;
mod models;
mod report;
mod store;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, CheckpointCommand, Command, OutputFormat, TodoCommand};
use config::{Config, CONFIG_FILE_NAME};
use models::{AnalyticsReport, ReportMetadata, User};
use std::path::PathBuf;
use store::{CheckpointUpdate, NewTodo, TodoStore, TodoUpdate};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    let config = match load_config(&args) {
        Ok(mut config) => {
            config.merge_with_args(&args);
            config
        }
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    debug!("TaskPulse v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args, config).await {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .taskpulse.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set your name, email and store location.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `[general] verbose` in the config file raises the default level unless
/// `--quiet` is given.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Dispatch a command.
async fn run(args: Args, config: Config) -> Result<()> {
    let user = config.user();

    match args.command {
        Command::InitConfig => handle_init_config(),
        Command::Rules => {
            print!("{}", chat::render_rules());
            Ok(())
        }
        Command::Analytics { format, output } => {
            let store = open_store(&config).await?;
            handle_analytics(&store, &config, &user, format, output)
        }
        Command::Chat { message, format } => {
            let store = open_store(&config).await?;
            handle_chat(&store, &config, &user, &message, format)
        }
        Command::Todo(command) => {
            let mut store = open_store(&config).await?;
            if handle_todo(&mut store, &user, command)? {
                store.save().await.context("Failed to save store")?;
            }
            Ok(())
        }
        Command::Checkpoint(command) => {
            let mut store = open_store(&config).await?;
            if handle_checkpoint(&mut store, &user, command)? {
                store.save().await.context("Failed to save store")?;
            }
            Ok(())
        }
    }
}

async fn open_store(config: &Config) -> Result<TodoStore> {
    let path = config.store_path();
    let store = TodoStore::open(&path)
        .await
        .with_context(|| format!("Failed to open store {}", path.display()))?;
    debug!("Using store {}", store.path().display());
    Ok(store)
}

/// Compute and emit the analytics report.
fn handle_analytics(
    store: &TodoStore,
    config: &Config,
    user: &User,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let todos = store.todos_with_analytics(&user.email);
    let summary = analysis::compute_analytics(&todos, &config.aggregator_options());
    let generated_at = Utc::now();

    let report = AnalyticsReport {
        metadata: ReportMetadata {
            user: user.clone(),
            generated_at,
            recent_window_days: config.analytics.recent_window_days,
        },
        summary,
    };

    let rendered = match format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Answer one chat message from a fresh snapshot.
fn handle_chat(
    store: &TodoStore,
    config: &Config,
    user: &User,
    message: &str,
    format: OutputFormat,
) -> Result<()> {
    let (todos, analytics) = store.chat_snapshot(&user.email);
    let context = chat::build_chat_context(user, todos, &analytics, config.chat.context_todos);
    debug!("Answering with the {:?} rule", chat::classify(message));
    let reply = chat::reply(message, &context);

    match format {
        OutputFormat::Json => println!("{}", report::generate_chat_json(&reply)?),
        OutputFormat::Markdown => println!("{}", reply),
    }

    Ok(())
}

/// Run a todo command. Returns whether the store changed.
fn handle_todo(store: &mut TodoStore, user: &User, command: TodoCommand) -> Result<bool> {
    let owner = user.email.as_str();

    match command {
        TodoCommand::Add {
            title,
            description,
            priority,
            category,
        } => {
            let new = NewTodo {
                title,
                description,
                priority: priority.map(Into::into),
                category,
            };
            let created = store.create_todo(owner, new, Utc::now())?;
            print_json(&created)?;
            Ok(true)
        }
        TodoCommand::List => {
            print!("{}", report::generate_todo_list(&store.list_todos(owner)));
            Ok(false)
        }
        TodoCommand::Show { id } => {
            print_json(&store.get_todo(owner, &id)?)?;
            Ok(false)
        }
        TodoCommand::Update {
            id,
            title,
            description,
            priority,
            category,
            completed,
        } => {
            let update = TodoUpdate {
                title,
                description,
                priority: priority.map(Into::into),
                category,
                completed,
            };
            let updated = store.update_todo(owner, &id, update, Utc::now())?;
            print_json(&updated)?;
            Ok(true)
        }
        TodoCommand::Delete { id } => {
            store.delete_todo(owner, &id)?;
            println!("✅ Deleted todo {}", id);
            Ok(true)
        }
    }
}

/// Run a checkpoint command. Returns whether the store changed.
fn handle_checkpoint(
    store: &mut TodoStore,
    user: &User,
    command: CheckpointCommand,
) -> Result<bool> {
    let owner = user.email.as_str();

    match command {
        CheckpointCommand::Add { todo_id, title } => {
            let checkpoint = store.add_checkpoint(owner, &todo_id, &title, Utc::now())?;
            print_json(&checkpoint)?;
            Ok(true)
        }
        CheckpointCommand::Show {
            todo_id,
            checkpoint_id,
        } => {
            print_json(&store.get_checkpoint(owner, &todo_id, &checkpoint_id)?)?;
            Ok(false)
        }
        CheckpointCommand::Update {
            todo_id,
            checkpoint_id,
            title,
            completed,
        } => {
            let update = CheckpointUpdate { title, completed };
            let checkpoint = store.update_checkpoint(owner, &todo_id, &checkpoint_id, update)?;
            print_json(&checkpoint)?;
            Ok(true)
        }
        CheckpointCommand::Delete {
            todo_id,
            checkpoint_id,
        } => {
            store.delete_checkpoint(owner, &todo_id, &checkpoint_id)?;
            println!("✅ Deleted checkpoint {}", checkpoint_id);
            Ok(true)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems with the default file are
/// reported on stderr directly.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE_NAME, e);
            Ok(Config::default())
        }
    }
}
