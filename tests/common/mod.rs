#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub uploads: tempfile::TempDir,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let uploads = tempfile::tempdir().context("failed to create uploads dir")?;

        // Empty DATABASE_URL keeps the server on the in-memory store
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_blog-api-rust"));
        cmd.env("APP_ENV", "development")
            .env("BLOG_API_HOST", "127.0.0.1")
            .env("BLOG_API_PORT", port.to_string())
            .env("DATABASE_URL", "")
            .env("SECRET_KEY", "integration-test-secret")
            .env("SECURITY_BCRYPT_COST", "4")
            .env("API_UPLOADS_DIR", uploads.path())
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, uploads, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Username unique to this run, since every test shares one server
pub fn unique_username(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..12])
}

/// Register then log in, returning the login body
pub async fn signup(server: &TestServer, username: &str, password: &str) -> Result<Value> {
    let client = reqwest::Client::new();
    let credentials = json!({ "username": username, "password": password });

    let res = client.post(server.url("/register")).json(&credentials).send().await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "register failed: {}", res.text().await?);

    let res = client.post(server.url("/login")).json(&credentials).send().await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.text().await?);

    Ok(res.json().await?)
}
