use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::config::Config;

pub mod model;

/// Makes `url` usable as a join base: without a trailing `/`, `Url::join`
/// would drop the last path segment.
pub fn as_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Resolves `target` below `base`, keeping any path prefix of `base`.
pub fn join_below(base: &Url, target: &str) -> Result<Url> {
    Ok(as_base(base.clone()).join(target.trim_start_matches('/'))?)
}

/// A request against the console backend, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub target: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(target: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            target: target.into(),
            body: None,
        }
    }

    pub fn with_body(method: Method, target: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            target: target.into(),
            body,
        }
    }
}

/// Raw status and body; decoding is left to the collection layer.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Errors are reserved for transport failures. Non-2xx statuses come
    /// back as ordinary responses.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[derive(Clone)]
pub struct HttpClient {
    http: Client,
    base_url: Url,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn with_base_url(base_url: Url, user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .no_proxy()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: as_base(base_url),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let base_url = cfg.base_url().context("invalid backend base URL")?;
        Self::with_base_url(base_url, &cfg.backend.user_agent)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn build_request(&self, request: &ApiRequest) -> Result<reqwest::Request> {
        let endpoint = join_below(&self.base_url, &request.target)
            .with_context(|| format!("invalid request target {}", request.target))?;
        let mut builder = self
            .http
            .request(request.method.clone(), endpoint)
            .header(ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").json(body);
        }
        builder.build().context("failed to build backend request")
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let built = self.build_request(&request)?;
        debug!(method = %built.method(), url = %built.url(), "sending backend request");
        let res = self
            .http
            .execute(built)
            .await
            .with_context(|| format!("failed to reach backend for {}", request.target))?;
        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("failed to read response body of {}", request.target))?;
        debug!(%status, target = %request.target, "backend responded");
        Ok(ApiResponse { status, body })
    }
}
