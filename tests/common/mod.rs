#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

/// Fresh in-memory database with the schema applied.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = test_pool().await;
        let router = flashdeck::build_app(pool.clone(), "test");
        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: &Value) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method("DELETE")
            .body(Body::empty())
            .unwrap();
        self.request(req).await
    }

    /// Create a card through the API and return its JSON representation.
    pub async fn create_card(&self, title: &str, tags: &[&str]) -> Value {
        let body = serde_json::json!({
            "title": title,
            "content": format!("Content for {title}"),
            "tags": tags,
        });
        let resp = self.send_json("POST", "/v1/cards", &body).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await["card"].clone()
    }

    /// Insert a card directly with fixed dates, bypassing the scheduler.
    pub async fn insert_card_on(
        &self,
        title: &str,
        created_at: &str,
        next_review_date: NaiveDate,
    ) -> i64 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO cards (title, content, tags, next_review_date, created_at) VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(title)
        .bind("content")
        .bind(r#"["seed"]"#)
        .bind(next_review_date)
        .bind(created_at)
        .fetch_one(&self.db)
        .await
        .expect("Failed to insert test card");
        id
    }
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> Value {
    let text = body_string(resp).await;
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("invalid JSON {text:?}: {e}"))
}
