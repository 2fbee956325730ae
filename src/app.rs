use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::services::upload_service::PUBLIC_PREFIX;
use crate::state::AppState;

/// Build the full HTTP surface around `state`
pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.api.uploads_dir);
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(public::root::root))
        .route("/health", get(public::root::health))
        .merge(auth_public_routes())
        .merge(post_routes())
        // Protected
        .route("/profile", get(protected::profile::profile_get))
        // Uploaded covers
        .nest_service(&format!("/{}", PUBLIC_PREFIX), uploads)
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/register", post(auth::register_post))
        .route("/login", post(auth::login_post))
}

fn post_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/post",
            post(protected::posts::post_create).put(protected::posts::post_update),
        )
        .route("/post/:id", get(public::posts::post_get))
        .route("/posts", get(public::posts::posts_list))
}

/// Restricted CORS when origins are configured, permissive otherwise.
/// The `Authorization` header is always exposed so browsers can read the
/// token returned by login.
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::AUTHORIZATION])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use axum::http::{header, Method, StatusCode};
    use serde_json::json;

    use crate::testing::{bearer, MultipartForm, TestApp};

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

    fn post_form(title: &str) -> MultipartForm {
        MultipartForm::new()
            .text("title", title)
            .text("summary", "A summary")
            .text("content", "Body text")
    }

    #[tokio::test]
    async fn root_reports_working() {
        let app = TestApp::new();
        let res = app.get("/", None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json()["message"], "Api is working");

        let health = app.get("/health", None).await;
        assert_eq!(health.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn register_returns_username_and_id() {
        let app = TestApp::new();
        let res = app
            .post_json("/register", json!({ "username": "alice", "password": "secret1" }))
            .await;

        assert_eq!(res.status, StatusCode::OK);
        let body = res.json();
        assert_eq!(body["username"], "alice");
        assert!(body["id"].as_str().is_some());
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn register_twice_fails() {
        let app = TestApp::new();
        let credentials = json!({ "username": "alice", "password": "secret1" });
        assert_eq!(app.post_json("/register", credentials.clone()).await.status, StatusCode::OK);

        let second = app.post_json("/register", credentials).await;
        assert_eq!(second.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(second.json()["message"].as_str().unwrap().contains("alice"));
    }

    #[tokio::test]
    async fn register_rejects_missing_or_invalid_fields() {
        let app = TestApp::new();

        let missing = app.post_json("/register", json!({ "username": "alice" })).await;
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert_eq!(missing.json()["message"], "Username and password are required.");

        let short = app.post_json("/register", json!({ "username": "al", "password": "pw" })).await;
        assert_eq!(short.status, StatusCode::BAD_REQUEST);

        let symbols = app
            .post_json("/register", json!({ "username": "al-ice!", "password": "pw" }))
            .await;
        assert_eq!(symbols.status, StatusCode::BAD_REQUEST);

        let padded = app
            .post_json("/register", json!({ "username": " alice ", "password": "pw" }))
            .await;
        assert_eq!(padded.status, StatusCode::BAD_REQUEST);

        let not_json = app
            .send(
                axum::http::Request::builder()
                    .method(Method::POST)
                    .uri("/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from("{oops"))
                    .unwrap(),
            )
            .await;
        assert_eq!(not_json.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_outcomes() {
        let app = TestApp::new();
        app.post_json("/register", json!({ "username": "alice", "password": "secret1" }))
            .await;

        let unknown = app
            .post_json("/login", json!({ "username": "nobody", "password": "secret1" }))
            .await;
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);

        let wrong = app
            .post_json("/login", json!({ "username": "alice", "password": "nope" }))
            .await;
        assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

        let missing = app.post_json("/login", json!({ "password": "secret1" })).await;
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);

        let ok = app
            .post_json("/login", json!({ "username": "alice", "password": "secret1" }))
            .await;
        assert_eq!(ok.status, StatusCode::OK);
        let body = ok.json();
        let token = body["token"].as_str().unwrap();
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["username"], "alice");
        assert_eq!(
            ok.headers.get(header::AUTHORIZATION).unwrap().to_str().unwrap(),
            format!("Bearer {}", token)
        );
    }

    #[tokio::test]
    async fn profile_returns_token_claims() {
        let app = TestApp::new();
        let (id, token) = app.signup("alice", "secret1").await;

        let res = app.get("/profile", Some(&token)).await;
        assert_eq!(res.status, StatusCode::OK);
        let body = res.json();
        assert_eq!(body["message"], "Profile fetched successfully");
        assert_eq!(body["user"]["username"], "alice");
        assert_eq!(body["user"]["id"], id.as_str());
    }

    #[tokio::test]
    async fn profile_rejects_missing_and_invalid_tokens() {
        let app = TestApp::new();
        assert_eq!(app.get("/profile", None).await.status, StatusCode::UNAUTHORIZED);
        assert_eq!(app.get("/profile", Some("forged.token.value")).await.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn create_post_requires_token_and_file() {
        let app = TestApp::new();
        let (_, token) = app.signup("alice", "secret1").await;

        let no_header = app
            .send_form(Method::POST, "/post", None, post_form("Hello").file("file", "a.png", PNG))
            .await;
        assert_eq!(no_header.status, StatusCode::UNAUTHORIZED);

        let bad_token = app
            .send_form(
                Method::POST,
                "/post",
                Some("Bearer not-a-token"),
                post_form("Hello").file("file", "a.png", PNG),
            )
            .await;
        assert_eq!(bad_token.status, StatusCode::FORBIDDEN);

        let no_file = app
            .send_form(Method::POST, "/post", Some(&bearer(&token)), post_form("Hello"))
            .await;
        assert_eq!(no_file.status, StatusCode::BAD_REQUEST);

        let two_files = app
            .send_form(
                Method::POST,
                "/post",
                Some(&bearer(&token)),
                post_form("Hello").file("file", "a.png", PNG).file("file", "b.png", PNG),
            )
            .await;
        assert_eq!(two_files.status, StatusCode::BAD_REQUEST);

        let wrong_field = app
            .send_form(
                Method::POST,
                "/post",
                Some(&bearer(&token)),
                post_form("Hello").file("image", "a.png", PNG),
            )
            .await;
        assert_eq!(wrong_field.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn created_cover_is_served() {
        let app = TestApp::new();
        let (id, token) = app.signup("alice", "secret1").await;

        let res = app
            .send_form(
                Method::POST,
                "/post",
                Some(&bearer(&token)),
                post_form("Hello").file("file", "a.png", PNG),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);

        let post = res.json();
        assert_eq!(post["title"], "Hello");
        assert_eq!(post["author"], id.as_str());
        let cover = post["cover"].as_str().unwrap();
        assert!(cover.starts_with("uploads/") && cover.ends_with(".png"));
        assert!(app.uploads_dir().join(cover.trim_start_matches("uploads/")).exists());

        let served = app.get(&format!("/{}", cover), None).await;
        assert_eq!(served.status, StatusCode::OK);
        assert_eq!(&served.bytes[..], PNG);
    }

    #[tokio::test]
    async fn update_enforces_authorship() {
        let app = TestApp::new();
        let (_, alice) = app.signup("alice", "secret1").await;
        let (_, mallory) = app.signup("mallory", "secret2").await;

        let created = app
            .send_form(
                Method::POST,
                "/post",
                Some(&bearer(&alice)),
                post_form("Hello").file("file", "a.png", PNG),
            )
            .await
            .json();
        let post_id = created["id"].as_str().unwrap().to_string();

        let hijack = app
            .send_form(
                Method::PUT,
                "/post",
                Some(&bearer(&mallory)),
                MultipartForm::new().text("id", &post_id).text("title", "Hijacked"),
            )
            .await;
        assert_eq!(hijack.status, StatusCode::BAD_REQUEST);
        assert_eq!(hijack.json()["message"], "You are not the author");

        let edit = app
            .send_form(
                Method::PUT,
                "/post",
                Some(&bearer(&alice)),
                MultipartForm::new()
                    .text("id", &post_id)
                    .text("title", "Hello again")
                    .text("summary", "New summary")
                    .text("content", "New body"),
            )
            .await;
        assert_eq!(edit.status, StatusCode::OK);
        assert_eq!(edit.json()["cover"], created["cover"]);

        let fetched = app.get(&format!("/post/{}", post_id), None).await;
        assert_eq!(fetched.status, StatusCode::OK);
        let fetched = fetched.json();
        assert_eq!(fetched["title"], "Hello again");
        assert_eq!(fetched["summary"], "New summary");
        assert_eq!(fetched["content"], "New body");
        assert_eq!(fetched["author"]["username"], "alice");
    }

    #[tokio::test]
    async fn non_author_update_leaves_uploads_untouched() {
        let app = TestApp::new();
        let (_, alice) = app.signup("alice", "secret1").await;
        let (_, mallory) = app.signup("mallory", "secret2").await;

        let created = app
            .send_form(
                Method::POST,
                "/post",
                Some(&bearer(&alice)),
                post_form("Hello").file("file", "a.png", PNG),
            )
            .await
            .json();
        let post_id = created["id"].as_str().unwrap().to_string();
        assert_eq!(app.stored_files(), 1);

        let hijack = app
            .send_form(
                Method::PUT,
                "/post",
                Some(&bearer(&mallory)),
                MultipartForm::new()
                    .text("id", &post_id)
                    .file("file", "evil.png", PNG),
            )
            .await;
        assert_eq!(hijack.status, StatusCode::BAD_REQUEST);
        assert_eq!(app.stored_files(), 1);

        let fetched = app.get(&format!("/post/{}", post_id), None).await.json();
        assert_eq!(fetched["cover"], created["cover"]);
    }

    #[tokio::test]
    async fn restricted_cors_exposes_authorization() {
        let app = TestApp::with_config(|config| {
            config.security.cors_origins = vec!["https://blog.example.test".to_string()];
        });

        let res = app
            .send(
                axum::http::Request::builder()
                    .method(Method::GET)
                    .uri("/")
                    .header(header::ORIGIN, "https://blog.example.test")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);

        let value = |name: header::HeaderName| {
            res.headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_ascii_lowercase()
        };
        assert_eq!(value(header::ACCESS_CONTROL_ALLOW_ORIGIN), "https://blog.example.test");
        assert_eq!(value(header::ACCESS_CONTROL_ALLOW_CREDENTIALS), "true");
        assert!(value(header::ACCESS_CONTROL_EXPOSE_HEADERS).contains("authorization"));

        let preflight = app
            .send(
                axum::http::Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/post")
                    .header(header::ORIGIN, "https://blog.example.test")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(preflight.status, StatusCode::OK);
        let allowed = preflight
            .headers
            .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        assert!(allowed.contains("authorization"));

        let foreign = app
            .send(
                axum::http::Request::builder()
                    .method(Method::GET)
                    .uri("/")
                    .header(header::ORIGIN, "https://elsewhere.test")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;
        assert!(foreign.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn signed_token_for_missing_user_leaves_no_upload() {
        let app = TestApp::new();
        let claims = crate::auth::Claims::new("ghost_user".into(), uuid::Uuid::new_v4(), None).unwrap();
        let mut security = crate::config::AppConfig::development().security;
        security.jwt_secret = "router-test-secret".to_string();
        let token = crate::auth::generate_jwt(&claims, &security).unwrap();

        let res = app
            .send_form(
                Method::POST,
                "/post",
                Some(&bearer(&token)),
                post_form("Orphan").file("file", "a.png", PNG),
            )
            .await;
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app.stored_files(), 0);
    }

    #[tokio::test]
    async fn update_error_statuses() {
        let app = TestApp::new();
        let (_, token) = app.signup("alice", "secret1").await;
        let unknown = uuid::Uuid::new_v4().to_string();

        let no_header = app
            .send_form(Method::PUT, "/post", None, MultipartForm::new().text("id", &unknown))
            .await;
        assert_eq!(no_header.status, StatusCode::UNAUTHORIZED);

        let bad_token = app
            .send_form(
                Method::PUT,
                "/post",
                Some("Bearer forged"),
                MultipartForm::new().text("id", &unknown),
            )
            .await;
        assert_eq!(bad_token.status, StatusCode::UNAUTHORIZED);

        let not_found = app
            .send_form(
                Method::PUT,
                "/post",
                Some(&bearer(&token)),
                MultipartForm::new().text("id", &unknown),
            )
            .await;
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let missing_id = app
            .send_form(
                Method::PUT,
                "/post",
                Some(&bearer(&token)),
                MultipartForm::new().text("title", "x"),
            )
            .await;
        assert_eq!(missing_id.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_is_newest_first_with_author_username() {
        let app = TestApp::new();
        let (_, token) = app.signup("alice", "secret1").await;

        for title in ["one", "two", "three"] {
            let res = app
                .send_form(
                    Method::POST,
                    "/post",
                    Some(&bearer(&token)),
                    post_form(title).file("file", "a.png", PNG),
                )
                .await;
            assert_eq!(res.status, StatusCode::OK);
        }

        let res = app.get("/posts", None).await;
        assert_eq!(res.status, StatusCode::OK);
        let posts = res.json();
        let posts = posts.as_array().unwrap();
        let titles: Vec<&str> = posts.iter().map(|p| p["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["three", "two", "one"]);
        assert!(posts.iter().all(|p| p["author"]["username"] == "alice"));
    }

    #[tokio::test]
    async fn unknown_post_is_not_found() {
        let app = TestApp::new();
        assert_eq!(app.get("/post/not-a-uuid", None).await.status, StatusCode::NOT_FOUND);
        let missing = format!("/post/{}", uuid::Uuid::new_v4());
        assert_eq!(app.get(&missing, None).await.status, StatusCode::NOT_FOUND);
    }
}
