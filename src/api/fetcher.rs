use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::metrics;
use crate::utils::{Cache, RateLimiter};

/// Response cache shared by every upstream client.
pub type ScanCache = Cache<Value>;

/// Single funnel for outbound GET requests: answers from the cache when it
/// can, otherwise waits for its upstream's spacing slot and sends.
#[derive(Debug, Clone)]
pub struct RateLimitedFetcher {
    client: Client,
    cache: ScanCache,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl RateLimitedFetcher {
    pub fn new(timeout: Duration, cache_ttl: Duration, spacing: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bounce-scanner/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, cache_ttl, spacing))
    }

    pub fn with_client(client: Client, cache_ttl: Duration, spacing: Duration) -> Self {
        Self {
            client,
            cache: Cache::new(cache_ttl),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(spacing))),
        }
    }

    pub fn cache(&self) -> &ScanCache {
        &self.cache
    }

    pub async fn get_json(
        &self,
        upstream: &str,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<Value> {
        let key = cache_key(url, params);
        if let Some(cached) = self.cache.get(&key).await {
            debug!("Cache hit: {}", key);
            metrics::CACHE_HITS.inc();
            return Ok(cached);
        }

        self.acquire_slot(upstream).await;

        let mut request = self.client.get(url).query(params);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        metrics::API_CALLS.inc();
        let started = Instant::now();
        let outcome = self.send(upstream, request).await;
        metrics::API_LATENCY.observe(started.elapsed().as_secs_f64());

        match outcome {
            Ok(body) => {
                self.cache.set(key, body.clone()).await;
                Ok(body)
            }
            Err(e) => {
                metrics::API_ERRORS.inc();
                if e.is_transient() {
                    warn!("{} request to {} failed, may succeed later: {}", upstream, url, e);
                } else {
                    error!("{} request to {} failed: {}", upstream, url, e);
                }
                Err(e)
            }
        }
    }

    /// Waits for `upstream`'s spacing slot and claims it. The limiter lock is
    /// released while sleeping so other upstreams are not held up.
    pub async fn acquire_slot(&self, upstream: &str) {
        loop {
            let wait = {
                let mut limiter = self.rate_limiter.lock().await;
                if limiter.check(upstream) {
                    return;
                }
                limiter.remaining(upstream)
            };
            debug!("Rate limiter: waiting {}ms for {}", wait.as_millis(), upstream);
            tokio::time::sleep(wait).await;
        }
    }

    async fn send(&self, upstream: &str, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                Error::NetworkError(format!("{}: {}", upstream, e))
            } else {
                Error::HttpError(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(upstream, status));
        }

        response.json::<Value>().await.map_err(|e| {
            warn!("Undecodable {} response: {}", upstream, e);
            Error::ApiInvalidFormat(format!("{}: failed to parse response: {}", upstream, e))
        })
    }
}

/// URL plus query parameters sorted by name, so parameter order does not
/// split cache entries.
pub fn cache_key(url: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort();
    let query = sorted
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", url, query)
}

pub fn status_error(upstream: &str, status: StatusCode) -> Error {
    match status.as_u16() {
        401 => Error::ApiAuthFailed(format!("{}: authentication failed", upstream)),
        403 => Error::ApiQuotaExceeded(format!("{}: API quota exceeded", upstream)),
        429 => Error::RateLimitExceeded(format!("{}: rate limit exceeded", upstream)),
        _ => Error::ApiError(format!("{}: request failed with status {}", upstream, status)),
    }
}
