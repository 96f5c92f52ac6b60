//! Persistence boundary.
//!
//! [`Store`] is the interface the auth and todo services need from storage. It is
//! implemented by [`PgStore`] for Postgres and [`MemoryStore`] for local runs and
//! tests. [`TimedStore`] wraps either one and puts a deadline on every call.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{NewTodo, Todo, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    Conflict(String),
    /// The call did not finish before the deadline.
    Timeout(Duration),
    /// Any other backend failure.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::Conflict(msg) => write!(f, "conflict: {}", msg),
            StoreError::Timeout(after) => write!(f, "store call timed out after {:?}", after),
            StoreError::Backend(msg) => write!(f, "store backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operations for users and their todos.
///
/// Mutating todo operations take the owner so implementations scope the write to
/// that owner as well; the services check ownership before calling them.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, username: &str) -> StoreResult<Option<User>>;

    /// Fails with [`StoreError::Conflict`] when the username is taken.
    async fn create_user(&self, user: User) -> StoreResult<User>;

    /// All todos for `owner`, ordered by id.
    async fn find_todos(&self, owner: &str) -> StoreResult<Vec<Todo>>;

    async fn find_todo(&self, id: i64) -> StoreResult<Option<Todo>>;

    async fn create_todo(&self, todo: NewTodo) -> StoreResult<Todo>;

    /// Writes content and completion of `todo` if a record with the same id and
    /// owner exists. Returns the stored record, or `None` when nothing matched.
    async fn update_todo(&self, todo: &Todo) -> StoreResult<Option<Todo>>;

    /// Returns whether a todo with `id` owned by `owner` was removed.
    async fn delete_todo(&self, owner: &str, id: i64) -> StoreResult<bool>;

    /// Returns the number of removed todos.
    async fn delete_all_todos(&self, owner: &str) -> StoreResult<u64>;
}

/// Applies a fixed deadline to every call of the wrapped store.
///
/// A call that runs past the deadline is dropped, which cancels the underlying
/// query future.
pub struct TimedStore {
    inner: Arc<dyn Store>,
    deadline: Duration,
}

impl TimedStore {
    pub fn new(inner: Arc<dyn Store>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    async fn run<T, F>(&self, call: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>> + Send,
    {
        tokio::time::timeout(self.deadline, call)
            .await
            .unwrap_or(Err(StoreError::Timeout(self.deadline)))
    }
}

#[async_trait]
impl Store for TimedStore {
    async fn find_user(&self, username: &str) -> StoreResult<Option<User>> {
        self.run(self.inner.find_user(username)).await
    }

    async fn create_user(&self, user: User) -> StoreResult<User> {
        self.run(self.inner.create_user(user)).await
    }

    async fn find_todos(&self, owner: &str) -> StoreResult<Vec<Todo>> {
        self.run(self.inner.find_todos(owner)).await
    }

    async fn find_todo(&self, id: i64) -> StoreResult<Option<Todo>> {
        self.run(self.inner.find_todo(id)).await
    }

    async fn create_todo(&self, todo: NewTodo) -> StoreResult<Todo> {
        self.run(self.inner.create_todo(todo)).await
    }

    async fn update_todo(&self, todo: &Todo) -> StoreResult<Option<Todo>> {
        self.run(self.inner.update_todo(todo)).await
    }

    async fn delete_todo(&self, owner: &str, id: i64) -> StoreResult<bool> {
        self.run(self.inner.delete_todo(owner, id)).await
    }

    async fn delete_all_todos(&self, owner: &str) -> StoreResult<u64> {
        self.run(self.inner.delete_all_todos(owner)).await
    }
}
