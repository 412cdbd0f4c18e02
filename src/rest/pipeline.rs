use std::{sync::Arc, time::Instant};

use serde::de::DeserializeOwned;
use tracing::Instrument;
use uuid::Uuid;

use crate::rest::{
    cache::{CacheKey, CacheRegistry},
    error::{RestError, missing_identifier},
    request::{Hooks, RestRequest},
    resource::Cacheable,
    transport::{HttpResponse, Method, Transport},
};

/// Result of a successful execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Executed<T> {
    Resource(T),
    /// The call succeeded with an expected `204 No Content`.
    NoContent,
}

impl<T> Executed<T> {
    pub fn into_resource(self) -> Result<T, RestError> {
        match self {
            Executed::Resource(value) => Ok(value),
            Executed::NoContent => Err(RestError::Decode {
                source: serde::de::Error::custom("response carried no content"),
            }),
        }
    }

    pub fn is_no_content(&self) -> bool {
        matches!(self, Executed::NoContent)
    }
}

/// Runs a [`RestRequest`] against the transport and keeps the cache registry
/// consistent with the outcome.
#[derive(Clone)]
pub struct Pipeline {
    transport: Arc<dyn Transport>,
    cache: Arc<CacheRegistry>,
}

impl Pipeline {
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<CacheRegistry>) -> Self {
        Self { transport, cache }
    }

    pub fn cache(&self) -> &Arc<CacheRegistry> {
        &self.cache
    }

    pub async fn execute<T>(
        &self,
        request: RestRequest,
        hooks: Hooks<T>,
    ) -> Result<Executed<T>, RestError>
    where
        T: DeserializeOwned + Cacheable,
    {
        let request_id = Uuid::now_v7().to_string();
        let registry = request
            .cache
            .as_ref()
            .map(|target| target.tag.to_string())
            .unwrap_or_else(|| "-".to_string());
        let span = tracing::debug_span!(
            target: "rest",
            "rest_request",
            request_id = %request_id,
            method = %request.method,
            endpoint = %request.endpoint,
            registry = %registry,
        );

        self.execute_inner(request, hooks, request_id)
            .instrument(span)
            .await
    }

    async fn execute_inner<T>(
        &self,
        request: RestRequest,
        hooks: Hooks<T>,
        request_id: String,
    ) -> Result<Executed<T>, RestError>
    where
        T: DeserializeOwned + Cacheable,
    {
        if !request.ignore_cache
            && request.method.is_read_only()
            && let Some(target) = &request.cache
            && let Some(key) = &target.key
            && let Some(cached) = self.cache.get::<T>(target.tag, key)?
        {
            tracing::debug!(target: "rest", key = %key, "cache_hit");
            return Ok(Executed::Resource(cached));
        }

        let started_at = Instant::now();
        let response = self.send(&request, &request_id).await?;
        tracing::debug!(
            target: "rest",
            status = response.status,
            body_bytes = response.body.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "remote_completed"
        );

        if response.status != request.expected_status {
            return Err(RestError::StatusMismatch {
                expected: request.expected_status,
                status: response.status,
                body: response.body_text(),
            });
        }

        if response.body.is_empty() && request.expected_status == 204 {
            self.evict_deleted(&request);
            return Ok(Executed::NoContent);
        }

        let mut value = hooks.decode_body(&response.body)?;
        if let Some(hook) = &hooks.before_cache_write {
            hook(&mut value);
        }

        let Some(target) = &request.cache else {
            return Ok(Executed::Resource(value));
        };

        if request.method == Method::Delete {
            self.evict_deleted(&request);
            return Ok(Executed::Resource(value));
        }

        let key = target
            .key
            .clone()
            .or_else(|| hooks.cache_key.as_ref().map(|derive| derive(&value)));
        let written = match &key {
            Some(key) => self.cache.put(target.tag, key, &value),
            None => Err(missing_identifier(format!(
                "no {} cache key for {}",
                target.tag, request.endpoint
            ))),
        };
        if let Some(hook) = &hooks.on_cache_write {
            hook(&mut value, written.as_ref().err());
        }

        match written {
            Ok(()) => {
                tracing::debug!(
                    target: "rest",
                    key = %key.as_ref().map(CacheKey::as_str).unwrap_or("-"),
                    "cache_written"
                );
                Ok(Executed::Resource(value))
            }
            Err(err) => {
                tracing::warn!(
                    target: "rest",
                    registry = %target.tag,
                    error = %err,
                    "cache_write_failed_after_remote_success"
                );
                Err(err)
            }
        }
    }

    async fn send(
        &self,
        request: &RestRequest,
        request_id: &str,
    ) -> Result<HttpResponse, RestError> {
        let call = async {
            let pending = self.transport.send(request.to_http(request_id));
            match request.deadline {
                Some(deadline) => match tokio::time::timeout(deadline, pending).await {
                    Ok(result) => result.map_err(RestError::from),
                    Err(_) => {
                        tracing::debug!(
                            target: "rest",
                            deadline_ms = deadline.as_millis() as u64,
                            "deadline_exceeded"
                        );
                        Err(RestError::Canceled)
                    }
                },
                None => pending.await.map_err(RestError::from),
            }
        };

        let Some(token) = &request.cancel else {
            return call.await;
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(target: "rest", "request_canceled");
                Err(RestError::Canceled)
            }
            result = call => result,
        }
    }

    fn evict_deleted(&self, request: &RestRequest) {
        if request.method != Method::Delete {
            return;
        }
        if let Some(target) = &request.cache
            && let Some(key) = &target.key
            && self.cache.delete(target.tag, key)
        {
            tracing::debug!(target: "rest", key = %key, "cache_evicted");
        }
    }
}

