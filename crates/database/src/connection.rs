use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::time::Duration;

/// The `todos` table. `updated_at` is refreshed by MySQL itself on every row change.
const CREATE_TODOS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id INT AUTO_INCREMENT PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        description TEXT,
        completed BOOLEAN DEFAULT FALSE,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
    )
"#;

/// Builds the MySQL connect options from the configured settings.
pub fn connect_options(settings: &DatabaseSettings) -> Result<MySqlConnectOptions, DbError> {
    if settings.host.trim().is_empty() {
        return Err(DbError::ConnectionConfigError(
            "database host must be set.".to_string(),
        ));
    }

    Ok(MySqlConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.name))
}

/// Establishes a bounded connection pool to the MySQL database.
///
/// The pool is the single owned storage handle for the process. Callers hand it
/// to the repository and close it with [`close`] on shutdown. Queries beyond
/// `max_connections` wait for a free connection instead of failing.
pub async fn connect(settings: &DatabaseSettings) -> Result<MySqlPool, DbError> {
    let options = connect_options(settings)?;

    let pool = MySqlPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    tracing::info!(
        host = %settings.host,
        port = settings.port,
        database = %settings.name,
        max_connections = settings.max_connections,
        "Connected to the database."
    );
    Ok(pool)
}

/// Creates the `todos` table if it does not exist yet. Safe to run on every start.
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), DbError> {
    sqlx::query(CREATE_TODOS_TABLE).execute(pool).await?;
    tracing::info!("Todos table created or already exists.");
    Ok(())
}

/// Closes the pool, waiting for checked-out connections to be returned.
pub async fn close(pool: MySqlPool) {
    pool.close().await;
    tracing::info!("Database pool closed.");
}
