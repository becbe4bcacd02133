use clap::{Parser, Subcommand};
use configuration::{ConfigOverrides, init_tracing, load_config};
use std::process::ExitCode;

/// The main entry point for the todo API service.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load .env and environment variables into the typed configuration.
    let mut config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_tracing(&config.log);

    let command = cli.command.unwrap_or(Commands::Serve(ConfigOverrides::default()));
    let result = match command {
        Commands::Serve(overrides) => {
            overrides.apply(&mut config);
            web_server::run_server(&config).await
        }
        Commands::InitDb => handle_init_db(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "Command failed.");
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A small JSON API for managing todos, backed by MySQL.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (the default when no command is given).
    Serve(ConfigOverrides),
    /// Create the todos table if it does not exist, then exit.
    InitDb,
}

/// Bootstraps the schema without starting the server.
async fn handle_init_db(config: &configuration::settings::Config) -> anyhow::Result<()> {
    let pool = database::connect(&config.database).await?;
    let result = database::ensure_schema(&pool).await;
    database::close(pool).await;
    result?;
    Ok(())
}
