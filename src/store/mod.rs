//! JSON-file todo store.
//!
//! This module persists todos, checkpoints and analytics records as three
//! flat tables in one JSON document and enforces per-user ownership. It
//! also owns the analytics lifecycle: records are created with their todo,
//! updated when the completed flag flips, and removed on delete.

use crate::models::{
    AnalyticsRecord, Checkpoint, Priority, Todo, TodoWithAnalytics, TodoWithCheckpoints,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Todo not found: {0}")]
    TodoNotFound(String),

    #[error("Checkpoint not found: {0}")]
    CheckpointNotFound(String),

    #[error("Unauthorized: todo {0} belongs to another user")]
    Unauthorized(String),

    #[error("Title is required")]
    TitleRequired,

    #[error("Failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store data is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields for a new todo.
#[derive(Debug, Clone, Default)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
}

/// Partial update of a todo. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TodoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub completed: Option<bool>,
}

/// Partial update of a checkpoint.
#[derive(Debug, Clone, Default)]
pub struct CheckpointUpdate {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// On-disk layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub todos: Vec<Todo>,
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
    #[serde(default)]
    pub analytics: Vec<AnalyticsRecord>,
}

/// File-backed store.
pub struct TodoStore {
    path: PathBuf,
    data: StoreData,
}

impl TodoStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        let read = tokio::fs::read_to_string(&path).await;
        let data = match read {
            Ok(content) if content.trim().is_empty() => StoreData::default(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No store at {}, starting empty", path.display());
                StoreData::default()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        debug!(
            "Loaded store {} ({} todos, {} checkpoints, {} analytics)",
            path.display(),
            data.todos.len(),
            data.checkpoints.len(),
            data.analytics.len()
        );

        Ok(Self { path, data })
    }

    /// Write the store back to disk via a temporary sibling file.
    pub async fn save(&self) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(&self.data)?;
        let tmp_path = self.path.with_extension("json.tmp");

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|source| self.io_error(source))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| self.io_error(source))?;

        debug!("Saved store to {}", self.path.display());
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// All of `owner`'s todos with checkpoints, newest first.
    pub fn list_todos(&self, owner: &str) -> Vec<TodoWithCheckpoints> {
        let mut todos: Vec<TodoWithCheckpoints> = self
            .data
            .todos
            .iter()
            .filter(|t| t.user_id == owner)
            .map(|t| self.with_checkpoints(t))
            .collect();

        todos.sort_by(|a, b| b.todo.created_at.cmp(&a.todo.created_at));
        todos
    }

    /// All of `owner`'s todos joined with their analytics record.
    pub fn todos_with_analytics(&self, owner: &str) -> Vec<TodoWithAnalytics> {
        self.data
            .todos
            .iter()
            .filter(|t| t.user_id == owner)
            .map(|t| TodoWithAnalytics {
                todo: t.clone(),
                analytics: self.analytics_for(&t.id).cloned(),
            })
            .collect()
    }

    /// `owner`'s todos with checkpoints plus the analytics records of those
    /// todos, for building a chat context.
    pub fn chat_snapshot(&self, owner: &str) -> (Vec<TodoWithCheckpoints>, Vec<AnalyticsRecord>) {
        let todos = self.list_todos(owner);
        let analytics = self
            .data
            .analytics
            .iter()
            .filter(|a| todos.iter().any(|t| t.todo.id == a.todo_id))
            .cloned()
            .collect();

        (todos, analytics)
    }

    /// Fetch one todo.
    pub fn get_todo(&self, owner: &str, id: &str) -> StoreResult<TodoWithCheckpoints> {
        let index = self.owned_todo_index(owner, id)?;
        Ok(self.with_checkpoints(&self.data.todos[index]))
    }

    /// Create a todo together with its analytics record.
    pub fn create_todo(
        &mut self,
        owner: &str,
        new: NewTodo,
        now: DateTime<Utc>,
    ) -> StoreResult<TodoWithCheckpoints> {
        let title = required_title(&new.title)?;

        let mut todo = Todo::new(owner, title, now);
        todo.description = non_empty(new.description);
        todo.priority = new.priority;
        todo.category = non_empty(new.category);

        self.data
            .analytics
            .push(AnalyticsRecord::for_new_todo(&todo.id, now));
        info!("Created todo {} for {}", todo.id, owner);

        let created = TodoWithCheckpoints {
            todo: todo.clone(),
            checkpoints: Vec::new(),
        };
        self.data.todos.push(todo);

        Ok(created)
    }

    /// Apply a partial update.
    ///
    /// Flipping `completed` adjusts the analytics record: false to true
    /// increments `completedTasks`, stamps `completedAt` and records the
    /// minutes spent since `startedAt`; true to false decrements and clears
    /// `completedAt`.
    pub fn update_todo(
        &mut self,
        owner: &str,
        id: &str,
        update: TodoUpdate,
        now: DateTime<Utc>,
    ) -> StoreResult<TodoWithCheckpoints> {
        let index = self.owned_todo_index(owner, id)?;
        let title = match update.title {
            Some(ref title) => Some(required_title(title)?.to_string()),
            None => None,
        };

        if let Some(completed) = update.completed {
            if completed != self.data.todos[index].completed {
                self.record_completion_change(id, completed, now);
            }
        }

        let todo = &mut self.data.todos[index];
        if let Some(title) = title {
            todo.title = title;
        }
        if let Some(description) = update.description {
            todo.description = non_empty(Some(description));
        }
        if let Some(priority) = update.priority {
            todo.priority = Some(priority);
        }
        if let Some(category) = update.category {
            todo.category = non_empty(Some(category));
        }
        if let Some(completed) = update.completed {
            todo.completed = completed;
        }

        debug!("Updated todo {}", id);
        Ok(self.with_checkpoints(&self.data.todos[index]))
    }

    /// Delete a todo and everything attached to it.
    pub fn delete_todo(&mut self, owner: &str, id: &str) -> StoreResult<()> {
        let index = self.owned_todo_index(owner, id)?;
        self.data.todos.remove(index);

        let before = self.data.checkpoints.len();
        self.data.checkpoints.retain(|c| c.todo_id != id);
        self.data.analytics.retain(|a| a.todo_id != id);

        info!(
            "Deleted todo {} ({} checkpoints removed)",
            id,
            before - self.data.checkpoints.len()
        );
        Ok(())
    }

    /// Add a checkpoint to a todo.
    pub fn add_checkpoint(
        &mut self,
        owner: &str,
        todo_id: &str,
        title: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Checkpoint> {
        self.owned_todo_index(owner, todo_id)?;
        let title = required_title(title)?;

        let checkpoint = Checkpoint::new(todo_id, title, now);
        self.data.checkpoints.push(checkpoint.clone());

        debug!("Added checkpoint {} to todo {}", checkpoint.id, todo_id);
        Ok(checkpoint)
    }

    /// Fetch one checkpoint of a todo.
    pub fn get_checkpoint(
        &self,
        owner: &str,
        todo_id: &str,
        checkpoint_id: &str,
    ) -> StoreResult<Checkpoint> {
        self.owned_todo_index(owner, todo_id)?;
        let index = self.checkpoint_index(todo_id, checkpoint_id)?;
        Ok(self.data.checkpoints[index].clone())
    }

    /// Apply a partial checkpoint update.
    pub fn update_checkpoint(
        &mut self,
        owner: &str,
        todo_id: &str,
        checkpoint_id: &str,
        update: CheckpointUpdate,
    ) -> StoreResult<Checkpoint> {
        self.owned_todo_index(owner, todo_id)?;
        let index = self.checkpoint_index(todo_id, checkpoint_id)?;
        let title = match update.title {
            Some(ref title) => Some(required_title(title)?.to_string()),
            None => None,
        };

        let checkpoint = &mut self.data.checkpoints[index];
        if let Some(title) = title {
            checkpoint.title = title;
        }
        if let Some(completed) = update.completed {
            checkpoint.completed = completed;
        }

        Ok(checkpoint.clone())
    }

    /// Remove a checkpoint.
    pub fn delete_checkpoint(
        &mut self,
        owner: &str,
        todo_id: &str,
        checkpoint_id: &str,
    ) -> StoreResult<()> {
        self.owned_todo_index(owner, todo_id)?;
        let index = self.checkpoint_index(todo_id, checkpoint_id)?;
        self.data.checkpoints.remove(index);

        debug!("Deleted checkpoint {} of todo {}", checkpoint_id, todo_id);
        Ok(())
    }

    fn owned_todo_index(&self, owner: &str, id: &str) -> StoreResult<usize> {
        let index = self
            .data
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::TodoNotFound(id.to_string()))?;

        if self.data.todos[index].user_id != owner {
            warn!("{} tried to access todo {} of another user", owner, id);
            return Err(StoreError::Unauthorized(id.to_string()));
        }

        Ok(index)
    }

    fn checkpoint_index(&self, todo_id: &str, checkpoint_id: &str) -> StoreResult<usize> {
        self.data
            .checkpoints
            .iter()
            .position(|c| c.id == checkpoint_id && c.todo_id == todo_id)
            .ok_or_else(|| StoreError::CheckpointNotFound(checkpoint_id.to_string()))
    }

    fn with_checkpoints(&self, todo: &Todo) -> TodoWithCheckpoints {
        TodoWithCheckpoints {
            todo: todo.clone(),
            checkpoints: self
                .data
                .checkpoints
                .iter()
                .filter(|c| c.todo_id == todo.id)
                .cloned()
                .collect(),
        }
    }

    fn analytics_for(&self, todo_id: &str) -> Option<&AnalyticsRecord> {
        self.data.analytics.iter().find(|a| a.todo_id == todo_id)
    }

    fn record_completion_change(&mut self, todo_id: &str, completed: bool, now: DateTime<Utc>) {
        let analytics = &mut self.data.analytics;
        let Some(record) = analytics.iter_mut().find(|a| a.todo_id == todo_id) else {
            warn!("Todo {} has no analytics record", todo_id);
            return;
        };

        if completed {
            record.completed_tasks += 1;
            record.completed_at = Some(now);
            if let Some(started) = record.started_at {
                record.time_spent = (now - started).num_seconds() as f64 / 60.0;
            }
        } else {
            record.completed_tasks = record.completed_tasks.saturating_sub(1);
            record.completed_at = None;
        }
    }
}

fn required_title(title: &str) -> StoreResult<&str> {
    let title = title.trim();
    if title.is_empty() {
        Err(StoreError::TitleRequired)
    } else {
        Ok(title)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
