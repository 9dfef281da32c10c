use crate::db::Db;
use crate::error::panic_response;
use crate::handlers;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

// Users only expose create and list over HTTP.
fn user_routes() -> Router<Db> {
    Router::new().route("/", post(handlers::create_user).get(handlers::list_users))
}

fn video_routes() -> Router<Db> {
    Router::new()
        .route("/", post(handlers::create_video).get(handlers::list_videos))
        .route(
            "/:id",
            get(handlers::get_video)
                .put(handlers::update_video)
                .delete(handlers::delete_video),
        )
}

pub fn build_app(db: Db) -> Router {
    Router::new()
        .nest("/api/users", user_routes())
        .nest("/api/videos", video_routes())
        .route("/health", get(handlers::health))
        .fallback(handlers::route_not_found)
        .with_state(db)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_in_memory, Executor, Row, SqliteExecutor};
    use crate::error::StorageError;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct UnavailableExecutor;

    #[async_trait]
    impl Executor for UnavailableExecutor {
        async fn execute(
            &self,
            _sql: &str,
            _params: Vec<rusqlite::types::Value>,
        ) -> Result<Vec<Row>, StorageError> {
            Err(StorageError::Sqlite(rusqlite::Error::InvalidQuery))
        }
    }

    fn app() -> Router {
        build_app(Arc::new(SqliteExecutor::new(establish_in_memory().unwrap())))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create_video(app: &Router, title: &str) -> Value {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/videos",
            Some(json!({ "title": title, "url": format!("https://videos.test/{title}") })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn create_user_returns_record_with_id() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/users",
            Some(json!({ "name": "Ada", "email": "ada@example.com" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["id"].is_i64());
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn create_user_without_name_is_rejected() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/users",
            Some(json!({ "email": "a@b.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Name and email are required" }));

        let (_, users) = send(&app, Method::GET, "/api/users", None).await;
        assert_eq!(users, json!([]));
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let app = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/videos")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn users_are_listed_newest_first() {
        let app = app();
        for (name, email) in [("A", "a@example.com"), ("B", "b@example.com")] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/users",
                Some(json!({ "name": name, "email": email })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, users) = send(&app, Method::GET, "/api/users", None).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = users
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[tokio::test]
    async fn user_item_routes_are_not_exposed() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/users",
            Some(json!({ "name": "Ada", "email": "ada@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, Method::GET, "/api/users/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Route not found" }));
    }

    #[tokio::test]
    async fn unknown_video_is_not_found() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/videos/12345", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Video not found" }));

        let (status, _) = send(&app, Method::GET, "/api/videos/not-a-number", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_video_without_url_is_rejected() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/videos",
            Some(json!({ "title": "Intro" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Title and url are required" }));
    }

    #[tokio::test]
    async fn deleted_video_is_gone() {
        let app = app();
        let video = create_video(&app, "intro").await;
        let uri = format!("/api/videos/{}", video["id"]);

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Video deleted successfully" }));

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn updated_video_is_visible_on_read() {
        let app = app();
        let video = create_video(&app, "draft").await;
        let uri = format!("/api/videos/{}", video["id"]);

        let (status, updated) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "title": "final", "url": "https://videos.test/final", "description": "cut 2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], video["id"]);

        let (status, read) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read["title"], "final");
        assert_eq!(read["url"], "https://videos.test/final");
        assert_eq!(read["description"], "cut 2");
    }

    #[tokio::test]
    async fn updating_missing_video_does_not_insert() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/videos/77",
            Some(json!({ "title": "ghost", "url": "https://videos.test/ghost" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, videos) = send(&app, Method::GET, "/api/videos", None).await;
        assert_eq!(videos, json!([]));
    }

    #[tokio::test]
    async fn update_video_requires_fields() {
        let app = app();
        let video = create_video(&app, "keep").await;
        let uri = format!("/api/videos/{}", video["id"]);

        let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "title": "only" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, read) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(read["title"], "keep");
    }

    #[tokio::test]
    async fn videos_are_listed_newest_first() {
        let app = app();
        create_video(&app, "first").await;
        create_video(&app, "second").await;

        let (_, videos) = send(&app, Method::GET, "/api/videos", None).await;
        assert_eq!(videos[0]["title"], "second");
        assert_eq!(videos[1]["title"], "first");
    }

    #[tokio::test]
    async fn health_ignores_storage() {
        let app = build_app(Arc::new(UnavailableExecutor));
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "UP" }));
    }

    #[tokio::test]
    async fn storage_failures_are_generic_500s() {
        let app = build_app(Arc::new(UnavailableExecutor));
        let (status, body) = send(&app, Method::GET, "/api/videos", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn cors_is_permissive() {
        let app = app();
        let request = Request::builder()
            .method(Method::GET)
            .uri("/health")
            .header(header::ORIGIN, "https://elsewhere.test")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
