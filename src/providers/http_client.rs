//! Rate-Limited HTTP Client for the fulfillment API
//!
//! Wraps `reqwest::Client` with a governor quota so bursts of catalog reads and
//! poll requests stay under the provider's per-minute limit. Idempotent reads
//! can opt into retries with exponential backoff; writes never retry here.

use governor::{Quota, RateLimiter, state::NotKeyed, clock::DefaultClock, middleware::NoOpMiddleware};
use nonzero_ext::nonzero;
use reqwest::{Client, RequestBuilder, Response};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::providers::traits::ProviderError;

/// Rate-limited HTTP client for API requests
pub struct RateLimitedClient {
    /// Inner HTTP client
    client: Client,

    /// Rate limiter (requests per minute)
    limiter: RateLimiter<NotKeyed, governor::state::InMemoryState, DefaultClock, NoOpMiddleware>,

    /// Configured rate limit
    rate_limit_per_minute: u32,

    /// Remaining requests (from API response headers)
    remaining_requests: AtomicU32,
}

impl RateLimitedClient {
    /// Create a new rate-limited client
    ///
    /// # Arguments
    /// * `rate_limit_per_minute` - Maximum requests allowed per minute
    /// * `timeout` - Per-request timeout
    pub fn new(rate_limit_per_minute: u32, timeout: Duration) -> Result<Self, ProviderError> {
        let rate = NonZeroU32::new(rate_limit_per_minute).unwrap_or(nonzero!(1u32));
        let limiter = RateLimiter::direct(Quota::per_minute(rate));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("automerch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(RateLimitedClient {
            client,
            limiter,
            rate_limit_per_minute: rate.get(),
            remaining_requests: AtomicU32::new(rate.get()),
        })
    }

    /// Get remaining requests in current rate limit window
    pub fn remaining_requests(&self) -> Option<u32> {
        let remaining = self.remaining_requests.load(Ordering::Relaxed);
        if remaining > 0 {
            Some(remaining)
        } else {
            None
        }
    }

    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Build a GET request
    pub fn get(&self, url: &str) -> RateLimitedRequestBuilder<'_> {
        self.wrap(self.client.get(url))
    }

    /// Build a POST request
    pub fn post(&self, url: &str) -> RateLimitedRequestBuilder<'_> {
        self.wrap(self.client.post(url))
    }

    /// Build a PUT request
    pub fn put(&self, url: &str) -> RateLimitedRequestBuilder<'_> {
        self.wrap(self.client.put(url))
    }

    /// Build a DELETE request
    pub fn delete(&self, url: &str) -> RateLimitedRequestBuilder<'_> {
        self.wrap(self.client.delete(url))
    }

    fn wrap(&self, builder: RequestBuilder) -> RateLimitedRequestBuilder<'_> {
        RateLimitedRequestBuilder { client: self, builder }
    }

    /// Wait for rate limit and execute request
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ProviderError> {
        self.limiter.until_ready().await;

        debug!("Executing rate-limited request");

        let response = builder.send().await?;

        if let Some(remaining) = response
            .headers()
            .get("X-RateLimit-Remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
        {
            self.remaining_requests.store(remaining, Ordering::Relaxed);
        }

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            warn!(retry_after_secs = retry_after, "Rate limited by provider");

            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        Ok(response)
    }

    /// Execute request with retries and exponential backoff
    pub async fn execute_with_retry(
        &self,
        builder: RequestBuilder,
        max_retries: u32,
    ) -> Result<Response, ProviderError> {
        let mut last_error = None;
        let mut backoff = Duration::from_millis(500);

        for attempt in 0..=max_retries {
            if attempt > 0 {
                debug!(attempt, backoff_ms = backoff.as_millis() as u64, "Retrying request");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(Duration::from_secs(30));
            }

            // Streaming bodies cannot be cloned, send them once
            let Some(request) = builder.try_clone() else {
                return self.execute(builder).await;
            };

            match self.execute(request).await {
                Ok(response) if response.status().is_server_error() && attempt < max_retries => {
                    last_error = Some(ProviderError::ApiError {
                        status: response.status().as_u16(),
                        message: "server error".to_string(),
                    });
                }
                Ok(response) => return Ok(response),
                Err(ProviderError::RateLimited { retry_after_secs }) => {
                    if attempt < max_retries {
                        tokio::time::sleep(Duration::from_secs(retry_after_secs)).await;
                    }
                    last_error = Some(ProviderError::RateLimited { retry_after_secs });
                }
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::ParseError("retry loop produced no result".to_string())))
    }
}

/// Request builder wrapper that enforces rate limiting
pub struct RateLimitedRequestBuilder<'a> {
    client: &'a RateLimitedClient,
    builder: RequestBuilder,
}

impl<'a> RateLimitedRequestBuilder<'a> {
    /// Add JSON body to the request
    pub fn json<T: serde::Serialize + ?Sized>(mut self, json: &T) -> Self {
        self.builder = self.builder.json(json);
        self
    }

    /// Add a bearer token header
    pub fn bearer_auth(mut self, token: &str) -> Self {
        self.builder = self.builder.bearer_auth(token);
        self
    }

    /// Send the request (waits for rate limit)
    pub async fn send(self) -> Result<Response, ProviderError> {
        self.client.execute(self.builder).await
    }

    /// Send with retries
    pub async fn send_with_retry(self, max_retries: u32) -> Result<Response, ProviderError> {
        self.client.execute_with_retry(self.builder, max_retries).await
    }
}
