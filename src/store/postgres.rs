use async_trait::async_trait;
use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{Store, StoreError, StoreResult};
use crate::models::{NewTodo, Todo, User};

const TODO_COLUMNS: &str = "id, owner, content, completed, created_at, updated_at";

/// Postgres-backed store using a shared connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {}", e)))?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, created_at) VALUES ($1, $2, $3)
             RETURNING username, password_hash, created_at",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_todos(&self, owner: &str) -> StoreResult<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE owner = $1 ORDER BY id",
            TODO_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(todos)
    }

    async fn find_todo(&self, id: i64) -> StoreResult<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE id = $1",
            TODO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn create_todo(&self, todo: NewTodo) -> StoreResult<Todo> {
        let created = sqlx::query_as::<_, Todo>(&format!(
            "INSERT INTO todos (owner, content, completed) VALUES ($1, $2, $3) RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(&todo.owner)
        .bind(&todo.content)
        .bind(todo.completed)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_todo(&self, todo: &Todo) -> StoreResult<Option<Todo>> {
        let updated = sqlx::query_as::<_, Todo>(&format!(
            "UPDATE todos SET content = $1, completed = $2, updated_at = NOW()
             WHERE id = $3 AND owner = $4
             RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(&todo.content)
        .bind(todo.completed)
        .bind(todo.id)
        .bind(&todo.owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_todo(&self, owner: &str, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND owner = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_todos(&self, owner: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM todos WHERE owner = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
