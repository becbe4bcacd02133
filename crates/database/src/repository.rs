use crate::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{NewTodo, Todo, TodoUpdate};
use sqlx::mysql::{MySql, MySqlPool};
use sqlx::{FromRow, QueryBuilder};

/// Data access for todos. Implementations own every storage detail; callers
/// only see `Todo` values and absence sentinels (`None`, `false`).
///
/// Every operation is a single attempt. Any storage failure is reported as a
/// `DbError` without distinguishing its kind.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Inserts a todo and returns the stored row, including generated id and timestamps.
    async fn create(&self, new_todo: NewTodo) -> Result<Todo, DbError>;

    /// All todos, newest first.
    async fn find_all(&self) -> Result<Vec<Todo>, DbError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, DbError>;

    /// Applies the supplied fields and returns the updated row, or `None` if
    /// no todo has this id. An empty update returns the current row without writing.
    async fn update(&self, id: i64, update: TodoUpdate) -> Result<Option<Todo>, DbError>;

    /// Returns `true` iff a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, DbError>;

    /// Removes every todo. Only used to isolate tests.
    async fn delete_all(&self) -> Result<(), DbError>;
}

const SELECT_TODO: &str =
    "SELECT id, title, description, completed, created_at, updated_at FROM todos";

/// This struct represents a row fetched from the todos table.
#[derive(FromRow, Debug, Clone)]
struct DbTodo {
    id: i32,
    title: String,
    description: Option<String>,
    completed: Option<bool>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DbTodo> for Todo {
    fn from(row: DbTodo) -> Self {
        Todo::from_parts(
            i64::from(row.id),
            row.title,
            row.description,
            row.completed,
            row.created_at,
            row.updated_at,
        )
    }
}

/// The MySQL-backed `TodoRepository`. It holds the shared connection pool;
/// each statement runs on its own pooled connection in autocommit mode.
#[derive(Debug, Clone)]
pub struct MySqlTodoRepository {
    pool: MySqlPool,
}

impl MySqlTodoRepository {
    /// Creates a new `MySqlTodoRepository` with a shared database connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl TodoRepository for MySqlTodoRepository {
    async fn create(&self, new_todo: NewTodo) -> Result<Todo, DbError> {
        let description = new_todo.description.unwrap_or_default();

        let result = sqlx::query("INSERT INTO todos (title, description) VALUES (?, ?)")
            .bind(&new_todo.title)
            .bind(&description)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_id() as i64;
        tracing::debug!(id, "Inserted todo.");

        // Read back so the caller gets the generated id and timestamps.
        self.find_by_id(id).await?.ok_or(DbError::NotFound)
    }

    async fn find_all(&self) -> Result<Vec<Todo>, DbError> {
        let sql = format!("{SELECT_TODO} ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, DbTodo>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, DbError> {
        let sql = format!("{SELECT_TODO} WHERE id = ?");
        let row = sqlx::query_as::<_, DbTodo>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Todo::from))
    }

    async fn update(&self, id: i64, update: TodoUpdate) -> Result<Option<Todo>, DbError> {
        if update.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new("UPDATE todos SET ");
        {
            let mut fields = builder.separated(", ");
            if let Some(title) = update.title {
                fields.push("title = ");
                fields.push_bind_unseparated(title);
            }
            if let Some(description) = update.description {
                fields.push("description = ");
                fields.push_bind_unseparated(description);
            }
            if let Some(completed) = update.completed {
                fields.push("completed = ");
                fields.push_bind_unseparated(completed);
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let result = builder.build().execute(&self.pool).await?;
        tracing::debug!(id, rows_affected = result.rows_affected(), "Updated todo.");

        // The read-back decides existence, so a row deleted concurrently is reported as absent.
        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<(), DbError> {
        sqlx::query("DELETE FROM todos").execute(&self.pool).await?;
        Ok(())
    }
}
