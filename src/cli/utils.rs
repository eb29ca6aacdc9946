use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Shared HTTP context for CLI commands hitting the API server.
pub struct CliContext {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl CliContext {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        let response = self
            .request(reqwest::Method::GET, path)
            .send()
            .await
            .with_context(|| format!("GET {} failed", path))?;
        Self::decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        let response = self
            .request(reqwest::Method::DELETE, path)
            .send()
            .await
            .with_context(|| format!("DELETE {} failed", path))?;
        Self::decode(response).await
    }

    async fn decode(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body: Value = response.json().await.context("response was not JSON")?;
        if !status.is_success() {
            bail!("server returned {}: {}", status, body);
        }
        Ok(body)
    }
}
