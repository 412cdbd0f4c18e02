use std::{sync::Arc, time::Duration};

use serde::{Serialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;

use crate::rest::{
    cache::{CacheKey, RegistryTag},
    error::RestError,
    transport::{HttpRequest, Method},
};

pub const AUDIT_LOG_REASON_HEADER: &str = "X-Audit-Log-Reason";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Where a pipeline result is read from and committed to. Without a key
/// the read step is skipped and the key comes from [`Hooks::cache_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheTarget {
    pub tag: RegistryTag,
    pub key: Option<CacheKey>,
}

impl CacheTarget {
    pub fn new(tag: RegistryTag, key: CacheKey) -> Self {
        Self {
            tag,
            key: Some(key),
        }
    }

    pub fn derived(tag: RegistryTag) -> Self {
        Self { tag, key: None }
    }
}

/// Description of one outbound call. Built once, then handed to
/// [`Pipeline::execute`](crate::rest::pipeline::Pipeline::execute).
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Vec<u8>>,
    pub content_type: Option<&'static str>,
    pub headers: Vec<(String, String)>,
    pub expected_status: u16,
    pub cache: Option<CacheTarget>,
    pub ignore_cache: bool,
    pub cancel: Option<CancellationToken>,
    pub deadline: Option<Duration>,
}

impl RestRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            content_type: None,
            headers: Vec::new(),
            expected_status: 200,
            cache: None,
            ignore_cache: false,
            cancel: None,
            deadline: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Post, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Patch, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Delete, endpoint)
    }

    pub fn with_json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, RestError> {
        let encoded = serde_json::to_vec(body).map_err(|source| RestError::Encode { source })?;
        self.body = Some(encoded);
        self.content_type = Some(CONTENT_TYPE_JSON);
        Ok(self)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attaches the audit-log reason. Blank reasons are dropped.
    pub fn with_reason(self, reason: Option<&str>) -> Self {
        match reason.map(str::trim).filter(|reason| !reason.is_empty()) {
            Some(reason) => self.with_header(AUDIT_LOG_REASON_HEADER, reason),
            None => self,
        }
    }

    pub fn with_expected_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    pub fn with_cache(mut self, tag: RegistryTag, key: CacheKey) -> Self {
        self.cache = Some(CacheTarget::new(tag, key));
        self
    }

    /// Commits under a key derived from the decoded value, for calls whose
    /// target id is assigned by the server.
    pub fn with_cache_tag(mut self, tag: RegistryTag) -> Self {
        self.cache = Some(CacheTarget::derived(tag));
        self
    }

    /// Always perform the remote call, even when a cached entry exists.
    /// The result is still committed to the cache.
    pub fn ignore_cache(mut self) -> Self {
        self.ignore_cache = true;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn reason(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(AUDIT_LOG_REASON_HEADER))
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn to_http(&self, request_id: &str) -> HttpRequest {
        HttpRequest {
            method: self.method,
            endpoint: self.endpoint.clone(),
            body: self.body.clone(),
            content_type: self.content_type,
            headers: self.headers.clone(),
            request_id: request_id.to_string(),
        }
    }
}

pub type DecodeFn<T> = Arc<dyn Fn(&[u8]) -> Result<T, serde_json::Error> + Send + Sync>;
pub type BeforeCacheWriteFn<T> = Arc<dyn Fn(&mut T) + Send + Sync>;
pub type OnCacheWriteFn<T> = Arc<dyn Fn(&mut T, Option<&RestError>) + Send + Sync>;
pub type CacheKeyFn<T> = Arc<dyn Fn(&T) -> CacheKey + Send + Sync>;

/// Optional callbacks applied by the pipeline around decoding and caching.
pub struct Hooks<T> {
    /// Replaces the default `serde_json` decoding of the response body.
    pub decode: Option<DecodeFn<T>>,
    /// Restores relational fields the wire payload omits. Runs before the
    /// cache write, and also when nothing is cached.
    pub before_cache_write: Option<BeforeCacheWriteFn<T>>,
    /// Observes the commit outcome: the cached value and the write error, if any.
    pub on_cache_write: Option<OnCacheWriteFn<T>>,
    /// Derives the cache key once the value is decoded and repaired.
    pub cache_key: Option<CacheKeyFn<T>>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            decode: None,
            before_cache_write: None,
            on_cache_write: None,
            cache_key: None,
        }
    }
}

impl<T> Clone for Hooks<T> {
    fn clone(&self) -> Self {
        Self {
            decode: self.decode.clone(),
            before_cache_write: self.before_cache_write.clone(),
            on_cache_write: self.on_cache_write.clone(),
            cache_key: self.cache_key.clone(),
        }
    }
}

impl<T> Hooks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decoder<F>(mut self, decode: F) -> Self
    where
        F: Fn(&[u8]) -> Result<T, serde_json::Error> + Send + Sync + 'static,
    {
        self.decode = Some(Arc::new(decode));
        self
    }

    pub fn before_cache_write<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.before_cache_write = Some(Arc::new(hook));
        self
    }

    pub fn on_cache_write<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut T, Option<&RestError>) + Send + Sync + 'static,
    {
        self.on_cache_write = Some(Arc::new(hook));
        self
    }

    pub fn cache_key<F>(mut self, derive: F) -> Self
    where
        F: Fn(&T) -> CacheKey + Send + Sync + 'static,
    {
        self.cache_key = Some(Arc::new(derive));
        self
    }
}

impl<T: DeserializeOwned> Hooks<T> {
    pub(crate) fn decode_body(&self, body: &[u8]) -> Result<T, RestError> {
        let decoded = match &self.decode {
            Some(decode) => decode(body),
            None => serde_json::from_slice(body),
        };
        decoded.map_err(|source| RestError::Decode { source })
    }
}
