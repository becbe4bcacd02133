use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Database operation failed: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("The requested data was not found in the database.")]
    NotFound,
}
