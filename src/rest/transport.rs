use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client as HttpClient, header};
use serde::{Deserialize, Serialize};

use crate::rest::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    pub fn is_read_only(self) -> bool {
        matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One raw HTTP exchange as seen by a [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the API base, query string included.
    pub endpoint: String,
    pub body: Option<Vec<u8>>,
    pub content_type: Option<&'static str>,
    pub headers: Vec<(String, String)>,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: HttpClient,
    base_url: String,
    auth_header: Option<String>,
    request_timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(
        base_url: impl Into<String>,
        auth_header: Option<String>,
        user_agent: &str,
        request_timeout: Duration,
        pool_idle_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = HttpClient::builder()
            .pool_idle_timeout(pool_idle_timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|err| TransportError::new("failed to build http client").with_source(err))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header,
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.endpoint);
        let mut builder = self
            .client
            .request(request.method.into(), url)
            .timeout(self.request_timeout)
            .header("x-request-id", request.request_id);

        if let Some(auth_header) = &self.auth_header {
            builder = builder.header(header::AUTHORIZATION, auth_header);
        }
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            if let Some(content_type) = request.content_type {
                builder = builder.header(header::CONTENT_TYPE, content_type);
            }
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    let timed_out = err.is_timeout();
    TransportError::new(format!("http request failed: {err}"))
        .with_timed_out(timed_out)
        .with_source(err)
}
