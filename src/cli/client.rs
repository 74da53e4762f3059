use anyhow::{bail, Context, Result};
use reqwest::multipart;
use serde_json::Value;
use std::path::Path;

/// Thin HTTP client over the Datadock API, shared by all CLI commands.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    pub async fn health(&self) -> Result<Value> {
        let req = self.http.get(self.url("/health"));
        self.send(req).await
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Value> {
        let req = self
            .http
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({ "username": username, "password": password }));
        self.send(req).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Value> {
        let req = self
            .http
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }));
        self.send(req).await
    }

    pub async fn upload(&self, file: &Path, record_type: &str) -> Result<Value> {
        let filename = file
            .file_name()
            .and_then(|n| n.to_str())
            .context("upload path has no filename")?
            .to_string();

        let bytes = tokio::fs::read(file)
            .await
            .with_context(|| format!("failed to read {}", file.display()))?;

        let form = multipart::Form::new()
            .part("datafile", multipart::Part::bytes(bytes).file_name(filename))
            .text("recordType", record_type.to_string());

        let req = self
            .http
            .post(self.url("/api/data/upload"))
            .multipart(form);
        self.send(self.authed(req)?).await
    }

    pub async fn record_types(&self) -> Result<Value> {
        let req = self.http.get(self.url("/api/data/types"));
        self.send(self.authed(req)?).await
    }

    pub async fn fields(&self, record_type: &str) -> Result<Value> {
        let req = self
            .http
            .get(self.url("/api/data/fields"))
            .query(&[("recordType", record_type)]);
        self.send(self.authed(req)?).await
    }

    pub async fn aggregate(&self, record_type: &str, field: &str, op: &str) -> Result<Value> {
        let req = self
            .http
            .get(self.url("/api/data/aggregate"))
            .query(&[("recordType", record_type), ("field", field), ("op", op)]);
        self.send(self.authed(req)?).await
    }

    pub async fn user_data(&self, from: Option<&str>, to: Option<&str>) -> Result<Value> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(from) = from {
            query.push(("from", from));
        }
        if let Some(to) = to {
            query.push(("to", to));
        }

        let req = self.http.get(self.url("/api/data")).query(&query);
        self.send(self.authed(req)?).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .context("no session token; pass --token or set DATADOCK_TOKEN (see `datadock login`)")?;
        Ok(req.bearer_auth(token))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Value> {
        let response = req.send().await.context("request failed")?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("non-JSON response (status {})", status))?;

        if !status.is_success() {
            let message = body
                .get("message")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("request rejected");
            bail!("{}: {}", status, message);
        }

        Ok(body)
    }
}
