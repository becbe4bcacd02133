use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use database::InMemoryTodoRepository;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use web_server::{AppState, build_router};

use failing::FailingRepository;
use panicking::PanickingRepository;

fn app() -> Router {
    build_router(Arc::new(AppState::new(InMemoryTodoRepository::new())))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, todo) = send(app, Method::POST, "/api/todos", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    todo
}

#[tokio::test]
async fn test_create_todo() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/todos",
        Some(json!({
            "title": "Integration Test Todo",
            "description": "Created during integration test",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Integration Test Todo");
    assert_eq!(body["description"], "Created during integration test");
    assert_eq!(body["completed"], false);
    assert!(body["id"].is_i64());
    assert!(body["createdAt"].is_string());
    assert!(body["updatedAt"].is_string());
}

#[tokio::test]
async fn test_create_todo_without_description() {
    let app = app();
    let body = create(&app, json!({ "title": "Todo without description" })).await;

    assert_eq!(body["title"], "Todo without description");
    assert_eq!(body["description"], "");
}

#[tokio::test]
async fn test_create_rejects_missing_or_blank_title() {
    let app = app();
    let bodies = [
        json!({ "description": "No title" }),
        json!({ "title": "" }),
        json!({ "title": "   ", "description": "whitespace" }),
        json!({ "title": null }),
    ];

    for body in bodies {
        let (status, response) = send(&app, Method::POST, "/api/todos", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Title is required");
    }

    let (status, response) = send(&app, Method::POST, "/api/todos", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Title is required");

    let (_, todos) = send(&app, Method::GET, "/api/todos", None).await;
    assert_eq!(todos, json!([]));
}

#[tokio::test]
async fn test_create_accepts_form_bodies() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/todos")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("title=Buy+milk&description=semi-skimmed"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["title"], "Buy milk");
    assert_eq!(body["description"], "semi-skimmed");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/todos")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_is_empty_initially() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/todos", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_list_returns_remaining_todos_newest_first() {
    let app = app();
    let mut ids = Vec::new();
    for title in ["first", "second", "third"] {
        ids.push(create(&app, json!({ "title": title })).await["id"].clone());
    }
    let (status, _) = send(&app, Method::DELETE, &format!("/api/todos/{}", ids[0]), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/todos", None).await;
    assert_eq!(status, StatusCode::OK);

    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "second"]);
}

#[tokio::test]
async fn test_get_todo_by_id() {
    let app = app();
    let created = create(&app, json!({ "title": "Get Me", "description": "Find me by ID" })).await;

    let (status, body) = send(&app, Method::GET, &format!("/api/todos/{}", created["id"]), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);
}

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let app = app();
    let cases = [
        (Method::GET, "/api/todos/99999", None),
        (Method::PUT, "/api/todos/99999", Some(json!({ "title": "Updated" }))),
        (Method::DELETE, "/api/todos/99999", None),
        (Method::GET, "/api/todos/not-a-number", None),
    ];

    for (method, uri, body) in cases {
        let (status, response) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(response["error"], "Todo not found");
    }
}

#[tokio::test]
async fn test_update_changes_only_supplied_fields() {
    let app = app();
    let created = create(&app, json!({ "title": "Buy milk", "description": "2 litres" })).await;
    let uri = format!("/api/todos/{}", created["id"]);

    let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({ "completed": true }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["title"], "Buy milk");
    assert_eq!(updated["description"], "2 litres");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (_, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_update_with_no_fields_returns_todo_unchanged() {
    let app = app();
    let created = create(&app, json!({ "title": "Buy milk" })).await;
    let uri = format!("/api/todos/{}", created["id"]);

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);

    let (status, body) = send(&app, Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);
}

#[tokio::test]
async fn test_update_rejects_blank_title() {
    let app = app();
    let created = create(&app, json!({ "title": "Buy milk" })).await;
    let uri = format!("/api/todos/{}", created["id"]);

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "title": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title cannot be empty");

    let (_, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched["title"], "Buy milk");
}

#[tokio::test]
async fn test_delete_twice() {
    let app = app();
    let created = create(&app, json!({ "title": "Buy milk" })).await;
    let uri = format!("/api/todos/{}", created["id"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Todo deleted successfully" }));

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Todo not found");
}

#[tokio::test]
async fn test_lifecycle_scenario() {
    let app = app();

    let created = create(&app, json!({ "title": "Buy milk" })).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["title"], "Buy milk");
    assert_eq!(created["description"], "");
    assert_eq!(created["completed"], false);

    let (status, fetched) = send(&app, Method::GET, "/api/todos/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) =
        send(&app, Method::PUT, "/api/todos/1", Some(json!({ "completed": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], created["title"]);
    assert_eq!(updated["description"], created["description"]);

    let (status, _) = send(&app, Method::DELETE, "/api/todos/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/todos/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Todo not found" }));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_health_does_not_depend_on_storage() {
    let app = build_router(Arc::new(AppState::new(FailingRepository)));
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_routes_return_json_404() {
    let app = app();
    for (method, uri) in [
        (Method::GET, "/unknown/route"),
        (Method::GET, "/api/nonexistent"),
        (Method::PATCH, "/api/todos/1"),
        (Method::POST, "/api/health"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, json!({ "error": "Not found" }));
    }
}

#[tokio::test]
async fn test_storage_failures_are_generic_500s() {
    let app = build_router(Arc::new(AppState::new(FailingRepository)));
    let cases = [
        (Method::POST, "/api/todos", Some(json!({ "title": "Buy milk" })), "Failed to create todo"),
        (Method::GET, "/api/todos", None, "Failed to fetch todos"),
        (Method::GET, "/api/todos/1", None, "Failed to fetch todo"),
        (Method::PUT, "/api/todos/1", Some(json!({ "completed": true })), "Failed to update todo"),
        (Method::DELETE, "/api/todos/1", None, "Failed to delete todo"),
    ];

    for (method, uri, body, message) in cases {
        let (status, response) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(response, json!({ "error": message }));
    }
}

#[tokio::test]
async fn test_validation_runs_before_storage() {
    let app = build_router(Arc::new(AppState::new(FailingRepository)));
    let (status, body) = send(&app, Method::POST, "/api/todos", Some(json!({ "title": "" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");
}

#[tokio::test]
async fn test_undecodable_ids_are_not_found() {
    let app = app();
    create(&app, json!({ "title": "Buy milk" })).await;

    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let (status, body) = send(&app, method, "/api/todos/%FF", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Todo not found" }));
    }
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = app();
    let title = "a".repeat(1024 * 1024);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/todos")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "title": title }).to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "Request body too large" }));

    let (_, todos) = send(&app, Method::GET, "/api/todos", None).await;
    assert_eq!(todos, json!([]));
}

#[tokio::test]
async fn test_handler_panic_is_a_json_500() {
    let app = build_router(Arc::new(AppState::new(PanickingRepository)));
    let (status, body) = send(&app, Method::GET, "/api/todos", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));

    let (status, _) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

mod failing {
    use async_trait::async_trait;
    use core_types::{NewTodo, Todo, TodoUpdate};
    use database::{DbError, TodoRepository};

    /// A repository whose storage is always unreachable.
    pub struct FailingRepository;

    fn unavailable() -> DbError {
        DbError::Unavailable("connection refused".to_string())
    }

    #[async_trait]
    impl TodoRepository for FailingRepository {
        async fn create(&self, _new_todo: NewTodo) -> Result<Todo, DbError> {
            Err(unavailable())
        }

        async fn find_all(&self) -> Result<Vec<Todo>, DbError> {
            Err(unavailable())
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<Todo>, DbError> {
            Err(unavailable())
        }

        async fn update(&self, _id: i64, _update: TodoUpdate) -> Result<Option<Todo>, DbError> {
            Err(unavailable())
        }

        async fn delete(&self, _id: i64) -> Result<bool, DbError> {
            Err(unavailable())
        }

        async fn delete_all(&self) -> Result<(), DbError> {
            Err(unavailable())
        }
    }
}

mod panicking {
    use async_trait::async_trait;
    use core_types::{NewTodo, Todo, TodoUpdate};
    use database::{DbError, TodoRepository};

    /// A repository with a bug: every call panics.
    pub struct PanickingRepository;

    #[async_trait]
    impl TodoRepository for PanickingRepository {
        async fn create(&self, _new_todo: NewTodo) -> Result<Todo, DbError> {
            panic!("create is broken")
        }

        async fn find_all(&self) -> Result<Vec<Todo>, DbError> {
            panic!("find_all is broken")
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<Todo>, DbError> {
            panic!("find_by_id is broken")
        }

        async fn update(&self, _id: i64, _update: TodoUpdate) -> Result<Option<Todo>, DbError> {
            panic!("update is broken")
        }

        async fn delete(&self, _id: i64) -> Result<bool, DbError> {
            panic!("delete is broken")
        }

        async fn delete_all(&self) -> Result<(), DbError> {
            panic!("delete_all is broken")
        }
    }
}
