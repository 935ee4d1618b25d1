use crate::types::Todo;
use tracing::{debug, warn};

pub const TASK_ENV_VAR: &str = "TODO_TIMER_TASK";

/// Source of the task record the timer screen is launched with.
pub trait ArgumentReader {
    fn read_task(&self) -> Option<Todo>;
}

/// Reads the task from command line flags or the environment.
///
/// Two payload formats are accepted: a JSON object (`{"title": "..."}`) and
/// the legacy plain-text form where the whole payload is the title. Which one
/// applies is decided here and nowhere else.
#[derive(Debug, Clone, Default)]
pub struct LaunchArguments {
    pub todo_json: Option<String>,
    pub title: Option<String>,
    pub env_payload: Option<String>,
}

impl LaunchArguments {
    pub fn new(todo_json: Option<String>, title: Option<String>) -> Self {
        Self {
            todo_json,
            title,
            env_payload: std::env::var(TASK_ENV_VAR).ok(),
        }
    }
}

impl ArgumentReader for LaunchArguments {
    fn read_task(&self) -> Option<Todo> {
        if let Some(json) = &self.todo_json {
            return parse_typed(json);
        }
        if let Some(title) = &self.title {
            return parse_legacy(title);
        }
        let payload = self.env_payload.as_deref()?;
        if payload.trim_start().starts_with('{') {
            parse_typed(payload)
        } else {
            parse_legacy(payload)
        }
    }
}

fn parse_typed(payload: &str) -> Option<Todo> {
    match serde_json::from_str::<Todo>(payload) {
        Ok(todo) if !todo.title.trim().is_empty() => {
            debug!(id = ?todo.id, title = %todo.title, "task read from typed payload");
            Some(todo)
        }
        Ok(_) => {
            warn!("task payload has an empty title");
            None
        }
        Err(e) => {
            warn!(error = %e, "task payload is not a valid todo");
            None
        }
    }
}

fn parse_legacy(payload: &str) -> Option<Todo> {
    let title = payload.trim();
    if title.is_empty() {
        warn!("task title is empty");
        return None;
    }
    debug!(title, "task read from legacy payload");
    Some(Todo::with_title(title))
}
