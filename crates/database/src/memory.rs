use crate::DbError;
use crate::repository::TodoRepository;
use async_trait::async_trait;
use chrono::Utc;
use core_types::{NewTodo, Todo, TodoUpdate};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// An in-process `TodoRepository` with the same contract as the MySQL one.
///
/// Ids start at 1 and are never reused, even after `delete_all`.
#[derive(Debug, Default)]
pub struct InMemoryTodoRepository {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    todos: BTreeMap<i64, Todo>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn create(&self, new_todo: NewTodo) -> Result<Todo, DbError> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let now = Utc::now();
        let todo = Todo::from_parts(
            state.last_id,
            new_todo.title,
            new_todo.description,
            None,
            now,
            now,
        );
        state.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn find_all(&self) -> Result<Vec<Todo>, DbError> {
        let state = self.state.read().await;
        let mut todos: Vec<Todo> = state.todos.values().cloned().collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(todos)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, DbError> {
        Ok(self.state.read().await.todos.get(&id).cloned())
    }

    async fn update(&self, id: i64, update: TodoUpdate) -> Result<Option<Todo>, DbError> {
        let mut state = self.state.write().await;
        let Some(todo) = state.todos.get_mut(&id) else {
            return Ok(None);
        };
        if update.apply_to(todo) {
            todo.updated_at = Utc::now();
        }
        Ok(Some(todo.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.state.write().await.todos.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<(), DbError> {
        self.state.write().await.todos.clear();
        Ok(())
    }
}
