use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::database::MemoryStore;
use crate::{app, AppState};

const BOUNDARY: &str = "blog-test-boundary-7MA4YWxkTrZu0gW";

/// Router over an in-memory store with a throwaway uploads directory
pub struct TestApp {
    router: Router,
    uploads: tempfile::TempDir,
}

/// Status, headers and raw body of a response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Test app whose config is adjusted by `customize` before the router is built
    pub fn with_config(customize: impl FnOnce(&mut AppConfig)) -> Self {
        let uploads = tempfile::tempdir().expect("failed to create uploads dir");

        let mut config = AppConfig::development();
        config.security.jwt_secret = "router-test-secret".to_string();
        config.security.bcrypt_cost = 4;
        config.api.uploads_dir = uploads.path().to_path_buf();
        customize(&mut config);

        let state = AppState::new(config, Arc::new(MemoryStore::new()));
        Self {
            router: app(state),
            uploads,
        }
    }

    pub fn uploads_dir(&self) -> &std::path::Path {
        self.uploads.path()
    }

    /// Number of files currently in the uploads directory
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.uploads.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");

        TestResponse { status, headers, bytes }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a multipart form; `authorization` is the raw header value
    pub async fn send_form(
        &self,
        method: Method,
        path: &str,
        authorization: Option<&str>,
        form: MultipartForm,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY));
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        self.send(builder.body(Body::from(form.finish())).unwrap()).await
    }

    /// Register and log in, returning `(user id, token)`
    pub async fn signup(&self, username: &str, password: &str) -> (String, String) {
        let credentials = json!({ "username": username, "password": password });

        let registered = self.post_json("/register", credentials.clone()).await;
        assert_eq!(registered.status, StatusCode::OK, "register failed: {}", registered.json());

        let login = self.post_json("/login", credentials).await;
        assert_eq!(login.status, StatusCode::OK, "login failed: {}", login.json());

        let body = login.json();
        (
            body["id"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
        )
    }
}

/// Hand-built multipart/form-data body
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, contents: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(contents);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
