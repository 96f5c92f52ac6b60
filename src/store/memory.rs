use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{Store, StoreError, StoreResult};
use crate::models::{NewTodo, Todo, User};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    todos: BTreeMap<i64, Todo>,
    last_todo_id: i64,
}

/// In-process store. Data lives for the lifetime of the process only.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(username).cloned())
    }

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.username) {
            return Err(StoreError::Conflict(format!(
                "username {} already exists",
                user.username
            )));
        }
        tables.users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn find_todos(&self, owner: &str) -> StoreResult<Vec<Todo>> {
        let tables = self.tables.read().await;
        Ok(tables
            .todos
            .values()
            .filter(|todo| todo.owner == owner)
            .cloned()
            .collect())
    }

    async fn find_todo(&self, id: i64) -> StoreResult<Option<Todo>> {
        Ok(self.tables.read().await.todos.get(&id).cloned())
    }

    async fn create_todo(&self, todo: NewTodo) -> StoreResult<Todo> {
        let mut tables = self.tables.write().await;
        tables.last_todo_id += 1;
        let created = Todo::from_new(tables.last_todo_id, todo);
        tables.todos.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_todo(&self, todo: &Todo) -> StoreResult<Option<Todo>> {
        let mut tables = self.tables.write().await;
        match tables.todos.get_mut(&todo.id) {
            Some(stored) if stored.owner == todo.owner => {
                stored.content = todo.content.clone();
                stored.completed = todo.completed;
                stored.updated_at = Utc::now();
                Ok(Some(stored.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_todo(&self, owner: &str, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let owned = matches!(tables.todos.get(&id), Some(todo) if todo.owner == owner);
        if owned {
            tables.todos.remove(&id);
        }
        Ok(owned)
    }

    async fn delete_all_todos(&self, owner: &str) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.todos.len();
        tables.todos.retain(|_, todo| todo.owner != owner);
        Ok((before - tables.todos.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_todo(owner: &str, content: &str) -> NewTodo {
        NewTodo {
            owner: owner.to_string(),
            content: content.to_string(),
            completed: false,
        }
    }

    #[actix_rt::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        store
            .create_user(User::new("alice".into(), "hash".into()))
            .await
            .unwrap();

        let second = store.create_user(User::new("alice".into(), "other".into())).await;
        assert!(matches!(second, Err(StoreError::Conflict(_))));

        // Usernames are case-sensitive.
        assert!(store
            .create_user(User::new("Alice".into(), "hash".into()))
            .await
            .is_ok());
    }

    #[actix_rt::test]
    async fn test_todo_ids_are_sequential_and_scoped() {
        let store = MemoryStore::new();
        let first = store.create_todo(new_todo("alice", "one")).await.unwrap();
        let second = store.create_todo(new_todo("bob", "two")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.find_todos("alice").await.unwrap(), vec![first.clone()]);

        let mut hijack = second.clone();
        hijack.owner = "alice".into();
        hijack.content = "mine now".into();
        assert_eq!(store.update_todo(&hijack).await.unwrap(), None);
        assert!(!store.delete_todo("alice", second.id).await.unwrap());
        assert_eq!(store.find_todo(second.id).await.unwrap(), Some(second));
    }

    #[actix_rt::test]
    async fn test_delete_all_only_touches_owner() {
        let store = MemoryStore::new();
        for content in ["a", "b", "c"] {
            store.create_todo(new_todo("alice", content)).await.unwrap();
        }
        store.create_todo(new_todo("bob", "keep")).await.unwrap();

        assert_eq!(store.delete_all_todos("alice").await.unwrap(), 3);
        assert_eq!(store.delete_all_todos("alice").await.unwrap(), 0);
        assert_eq!(store.find_todos("bob").await.unwrap().len(), 1);
    }
}
