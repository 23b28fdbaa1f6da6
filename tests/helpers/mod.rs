#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use eyesonasset::settings::Settings;
use eyesonasset::tokens::TokenSigner;
use eyesonasset::web::{self, AppState};
use http_body_util::BodyExt;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

/// In-process application under test: the real router over a temporary
/// sqlite database, driven one request at a time.
pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub settings: Settings,
    _temp_file: NamedTempFile,
}

impl TestApp {
    pub async fn new() -> Self {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_str().expect("Invalid temp file path");
        let db_url = format!("sqlite://{}?mode=rwc", db_path);

        let db = Database::connect(&db_url)
            .await
            .expect("Failed to connect to test database");

        migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        let settings = Settings::default();
        let tokens = TokenSigner::new(settings.auth.clone());

        let state = AppState {
            settings: Arc::new(settings.clone()),
            db: db.clone(),
            tokens,
        };

        Self {
            router: web::router(state),
            db,
            settings,
            _temp_file: temp_file,
        }
    }

    /// Send one request through the router and decode the JSON body
    /// (Null for empty bodies such as 204 responses).
    pub async fn send(
        &self,
        method: &str,
        path: &str,
        authorization: Option<&str>,
        body: Option<(&str, String)>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(auth) = authorization {
            builder = builder.header(header::AUTHORIZATION, auth);
        }

        let request = match body {
            Some((content_type, payload)) => builder
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(payload))
                .expect("Failed to build request"),
            None => builder.body(Body::empty()).expect("Failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            // Most responses are JSON, but some framework-level rejections
            // (e.g. a missing field caught by the `Json` extractor) return a
            // plain-text body. Keep the raw text instead of panicking so tests
            // that only assert on the status code can still run.
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, json)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("GET", path, token.map(bearer).as_deref(), None)
            .await
    }

    pub async fn post_json(
        &self,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.send(
            "POST",
            path,
            token.map(bearer).as_deref(),
            Some(("application/json", body.to_string())),
        )
        .await
    }

    pub async fn put_json(
        &self,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.send(
            "PUT",
            path,
            token.map(bearer).as_deref(),
            Some(("application/json", body.to_string())),
        )
        .await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("DELETE", path, token.map(bearer).as_deref(), None)
            .await
    }

    pub async fn post_form(&self, path: &str, form: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            path,
            None,
            Some(("application/x-www-form-urlencoded", form.to_string())),
        )
        .await
    }

    /// Log in with the configured fixed credentials and return a token.
    pub async fn login(&self) -> String {
        let (status, body) = self
            .post_form(
                "/integrations/auth",
                "login=eyesonasset&password=eyesonasset",
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        body["access_token"]
            .as_str()
            .expect("No access_token in login response")
            .to_string()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Create an owner through the API and return its JSON representation.
pub async fn seed_owner(app: &TestApp, token: &str, email: &str) -> Value {
    let (status, body) = app
        .post_json(
            "/integrations/owner",
            Some(token),
            serde_json::json!({
                "name": "João da Silva",
                "email": email,
                "phone": "+55 11 98765-4321"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "seed owner failed: {}", body);
    body
}

/// Create an asset through the API and return its JSON representation.
pub async fn seed_asset(app: &TestApp, token: &str, owner_id: &str) -> Value {
    let (status, body) = app
        .post_json(
            "/integrations/asset",
            Some(token),
            serde_json::json!({
                "name": "Aeronave Boeing 737",
                "category": "Aeronave",
                "owner": owner_id
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "seed asset failed: {}", body);
    body
}
