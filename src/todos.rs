//! Owner-scoped todo operations.
//!
//! Every method takes the caller's authenticated username. Route-level
//! ownership (`{userid}` == caller) is settled by the `AuthorizedOwner`
//! extractor beforehand; operations addressed by todo id check the stored
//! owner here. A todo owned by someone else is reported exactly like a missing
//! one.

use log::{debug, info};
use std::sync::Arc;
use validator::Validate;

use crate::error::AppError;
use crate::models::{NewTodo, NewTodoRequest, Todo, UpdateTodoRequest};
use crate::store::Store;

const TODO_NOT_FOUND: &str = "Todo not found";

pub struct TodoService {
    store: Arc<dyn Store>,
}

impl TodoService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// All todos of `owner`. Empty when there are none.
    pub async fn list(&self, owner: &str) -> Result<Vec<Todo>, AppError> {
        Ok(self.store.find_todos(owner).await?)
    }

    pub async fn get(&self, caller: &str, id: i64) -> Result<Todo, AppError> {
        self.owned_by(caller, id).await
    }

    pub async fn add(&self, owner: &str, input: NewTodoRequest) -> Result<Todo, AppError> {
        input.validate()?;
        let todo = self.store.create_todo(NewTodo::new(owner, input)).await?;
        info!("User {} created todo {}", owner, todo.id);
        Ok(todo)
    }

    pub async fn update(&self, caller: &str, input: UpdateTodoRequest) -> Result<Todo, AppError> {
        input.validate()?;
        let mut todo = self.owned_by(caller, input.id).await?;
        todo.content = input.content;
        todo.completed = input.completed;

        // The write is scoped by owner as well; it only misses if the record
        // vanished in between.
        self.store
            .update_todo(&todo)
            .await?
            .ok_or_else(|| AppError::NotFound(TODO_NOT_FOUND.into()))
    }

    pub async fn delete(&self, owner: &str, id: i64) -> Result<(), AppError> {
        if self.store.delete_todo(owner, id).await? {
            info!("User {} deleted todo {}", owner, id);
            Ok(())
        } else {
            Err(AppError::NotFound(TODO_NOT_FOUND.into()))
        }
    }

    /// Removes every todo of `owner` and returns how many were removed.
    pub async fn clear_all(&self, owner: &str) -> Result<u64, AppError> {
        let deleted = self.store.delete_all_todos(owner).await?;
        info!("User {} cleared {} todos", owner, deleted);
        Ok(deleted)
    }

    async fn owned_by(&self, caller: &str, id: i64) -> Result<Todo, AppError> {
        match self.store.find_todo(id).await? {
            Some(todo) if todo.owner == caller => Ok(todo),
            Some(_) => {
                debug!("User {} asked for todo {} owned by someone else", caller, id);
                Err(AppError::NotFound(TODO_NOT_FOUND.into()))
            }
            None => Err(AppError::NotFound(TODO_NOT_FOUND.into())),
        }
    }
}
