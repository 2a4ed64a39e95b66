//! Transport collaborator.
//!
//! The signing layer hands a fully signed field set to a [`Transport`] and
//! gets back the decoded JSON response. Connection handling, TLS, and body
//! encoding live behind this trait; [`HttpTransport`] is the `reqwest`-backed
//! implementation, and tests substitute an in-memory one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::debug;

/// HTTP verb for dispatched requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A field value as it goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    Text(String),
    /// Sent as a binary multipart part read from this path.
    File(PathBuf),
}

impl WireValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::File(_) => None,
        }
    }
}

/// Sends a signed field set and decodes the response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatch `fields` to `url` and return the decoded JSON body.
    async fn send(&self, method: HttpMethod, url: &str, fields: &[(String, WireValue)]) -> Result<Value>;
}

/// `reqwest`-backed transport.
///
/// POST bodies are form-urlencoded, switching to multipart when any field is a
/// [`WireValue::File`]; GET fields go into the query string.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: HttpMethod, url: &str, fields: &[(String, WireValue)]) -> Result<Value> {
        let has_files = fields.iter().any(|(_, v)| matches!(v, WireValue::File(_)));
        debug!(method = method.as_str(), url, multipart = has_files, "sending request");

        let request = match method {
            HttpMethod::Get if has_files => bail!("GET request to {url} cannot carry file parts"),
            HttpMethod::Get => self.http.get(url).query(&text_pairs(fields)),
            HttpMethod::Post if has_files => self.http.post(url).multipart(multipart_form(fields).await?),
            HttpMethod::Post => self.http.post(url).form(&text_pairs(fields)),
        };

        let body: Value = request
            .send()
            .await
            .with_context(|| format!("{} {url} failed", method.as_str()))?
            .error_for_status()
            .with_context(|| format!("{} {url} HTTP error", method.as_str()))?
            .json()
            .await
            .with_context(|| format!("{} {url} returned a non-JSON body", method.as_str()))?;
        Ok(body)
    }
}

fn text_pairs(fields: &[(String, WireValue)]) -> Vec<(&str, &str)> {
    fields
        .iter()
        .filter_map(|(k, v)| v.as_text().map(|t| (k.as_str(), t)))
        .collect()
}

async fn multipart_form(fields: &[(String, WireValue)]) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = match value {
            WireValue::Text(text) => form.text(name.clone(), text.clone()),
            WireValue::File(path) => form.part(name.clone(), file_part(path).await?),
        };
    }
    Ok(form)
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read upload {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".into());
    Ok(Part::bytes(bytes).file_name(file_name))
}
