use serde::{Deserialize, Serialize};

/// A to-do item handed to the timer at launch. Only `title` is consulted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Todo {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Todo {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
        }
    }
}
