use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use configuration::settings::Config;
use database::{MySqlTodoRepository, TodoRepository};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowOrigin, Any as AnyCors, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod extract;
pub mod handlers;

use error::{INTERNAL_SERVER_ERROR, ROUTE_NOT_FOUND};

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<dyn TodoRepository>,
}

impl AppState {
    pub fn new(todos: impl TodoRepository + 'static) -> Self {
        Self {
            todos: Arc::new(todos),
        }
    }
}

/// Builds the request pipeline: body decoding happens in the handlers' extractors,
/// unmatched routes get a JSON 404, and panics become a JSON 500.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(AnyCors)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(handlers::health).fallback(not_found))
        .route(
            "/api/todos",
            get(handlers::list_todos)
                .post(handlers::create_todo)
                .fallback(not_found),
        )
        .route(
            "/api/todos/:id",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo)
                .fallback(not_found),
        )
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(DefaultBodyLimit::max(1024 * 1024))
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": ROUTE_NOT_FOUND })),
    )
        .into_response()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "Request handler panicked.");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_SERVER_ERROR })),
    )
        .into_response()
}

/// Connects to the database, bootstraps the schema, and serves HTTP until a
/// shutdown signal arrives. The pool is closed after the server has drained.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = database::connect(&config.database).await?;
    database::ensure_schema(&pool).await?;

    let app_state = Arc::new(AppState::new(MySqlTodoRepository::new(pool.clone())));
    let app = build_router(app_state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Server running on port {}",
        config.server.port
    );
    tracing::info!("Environment: {}", config.server.environment);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    database::close(pool).await;
    served?;
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down gracefully...");
}
