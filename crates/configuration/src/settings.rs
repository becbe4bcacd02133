use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub log: LogSettings,
}

/// Connection parameters for the MySQL database.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// The schema name (e.g., "todo_db").
    pub name: String,
    /// Upper bound on pooled connections. Requests beyond it wait for a free connection.
    pub max_connections: u32,
    /// How long a request waits for a pooled connection before giving up.
    pub acquire_timeout_secs: u64,
}

/// Parameters for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Deployment environment name (e.g., "development", "production").
    pub environment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Default filter directive, used when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs go to a daily rolling file in this directory instead of stdout.
    #[serde(default)]
    pub directory: Option<String>,
}
