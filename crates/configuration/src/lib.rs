use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{Config, DatabaseSettings, LogSettings, ServerSettings};

#[cfg(feature = "clap")]
pub use overrides::ConfigOverrides;

/// Built-in defaults, applied before any file or environment source.
const DEFAULTS: &[(&str, &str)] = &[
    ("database.host", "localhost"),
    ("database.port", "3306"),
    ("database.user", "root"),
    ("database.password", "password"),
    ("database.name", "todo_db"),
    ("database.max_connections", "10"),
    ("database.acquire_timeout_secs", "30"),
    ("server.host", "0.0.0.0"),
    ("server.port", "3000"),
    ("server.environment", "development"),
    ("log.level", "info"),
];

/// Environment variable name -> configuration key.
const ENV_BINDINGS: &[(&str, &str)] = &[
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_NAME", "database.name"),
    ("DB_POOL_SIZE", "database.max_connections"),
    ("DB_ACQUIRE_TIMEOUT_SECS", "database.acquire_timeout_secs"),
    ("SERVER_HOST", "server.host"),
    ("PORT", "server.port"),
    ("APP_ENV", "server.environment"),
    ("LOG_LEVEL", "log.level"),
    ("LOG_DIR", "log.directory"),
];

/// Loads the application configuration from defaults, an optional `config.toml`,
/// and the process environment (after reading an optional `.env` file).
pub fn load_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    load_config_from(|key| std::env::var(key).ok())
}

/// Same as [`load_config`], but environment variables are resolved through `lookup`.
pub fn load_config_from<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    load_layered(config::File::with_name("config").required(false), lookup)
}

/// Defaults, then `file`, then the environment; later layers win.
fn load_layered<S, F>(file: S, lookup: F) -> Result<Config, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    let mut builder = config::Config::builder();
    for (key, value) in DEFAULTS {
        builder = builder.set_default(*key, *value)?;
    }

    builder = builder.add_source(file);

    for (var, key) in ENV_BINDINGS {
        let value = lookup(var).filter(|v| !v.is_empty());
        builder = builder.set_override_option(*key, value)?;
    }

    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Rejects settings that would leave the service unable to run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.database.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.name must not be empty".to_string(),
            ));
        }
        if self.database.user.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.user must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "clap")]
mod overrides {
    use crate::settings::Config;
    use clap::Args;

    /// Command-line flags that take precedence over file and environment settings.
    #[derive(Debug, Clone, Default, Args)]
    pub struct ConfigOverrides {
        /// The port the HTTP server listens on.
        #[arg(long)]
        pub port: Option<u16>,

        /// The address the HTTP server binds to.
        #[arg(long)]
        pub host: Option<String>,

        /// Deployment environment name.
        #[arg(long = "env")]
        pub environment: Option<String>,
    }

    impl ConfigOverrides {
        pub fn apply(self, config: &mut Config) {
            if let Some(port) = self.port {
                config.server.port = port;
            }
            if let Some(host) = self.host {
                config.server.host = host;
            }
            if let Some(environment) = self.environment {
                config.server.environment = environment;
            }
        }
    }
}
