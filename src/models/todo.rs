use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A task record. Every todo belongs to exactly one owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Todo {
    /// Store-assigned identifier.
    pub id: i64,
    /// Username of the user who created the todo.
    pub owner: String,
    /// Task description.
    pub content: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /todo/{userid}`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewTodoRequest {
    /// Must be between 1 and 500 characters.
    #[validate(length(min = 1, max = 500))]
    pub content: String,
    /// Defaults to `false` when omitted.
    #[serde(default)]
    pub completed: bool,
}

/// Body of `PUT /todo`. The owner is never taken from the body.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateTodoRequest {
    pub id: i64,
    #[validate(length(min = 1, max = 500))]
    pub content: String,
    pub completed: bool,
}

/// A todo about to be inserted; the store assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub owner: String,
    pub content: String,
    pub completed: bool,
}

impl NewTodo {
    pub fn new(owner: &str, input: NewTodoRequest) -> Self {
        Self {
            owner: owner.to_string(),
            content: input.content,
            completed: input.completed,
        }
    }
}

impl Todo {
    /// Materialises a `NewTodo` with the given id. Both timestamps are set to now.
    pub fn from_new(id: i64, new_todo: NewTodo) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner: new_todo.owner,
            content: new_todo.content,
            completed: new_todo.completed,
            created_at: now,
            updated_at: now,
        }
    }
}
