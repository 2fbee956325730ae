use anyhow::{anyhow, bail, Context};
use reqwest::{multipart::Form, Method, Response};
use serde_json::Value;

/// Thin HTTP client for the Blog API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn bearer(&self) -> anyhow::Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| anyhow!("No token available: pass --token or set BLOG_TOKEN (see `blog auth login`)"))
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        let res = self
            .http
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("GET {} failed", path))?;
        Self::decode(res).await
    }

    pub async fn get_authorized(&self, path: &str) -> anyhow::Result<Value> {
        let res = self
            .http
            .get(self.url(path))
            .bearer_auth(self.bearer()?)
            .send()
            .await
            .with_context(|| format!("GET {} failed", path))?;
        Self::decode(res).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        let res = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", path))?;
        Self::decode(res).await
    }

    /// Send a multipart form with the bearer token attached
    pub async fn send_form(&self, method: Method, path: &str, form: Form) -> anyhow::Result<Value> {
        let res = self
            .http
            .request(method.clone(), self.url(path))
            .bearer_auth(self.bearer()?)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("{} {} failed", method, path))?;
        Self::decode(res).await
    }

    async fn decode(res: Response) -> anyhow::Result<Value> {
        let status = res.status();
        let text = res.text().await.context("failed to read response body")?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string());
            bail!("server returned {}: {}", status, message);
        }

        Ok(body)
    }
}
