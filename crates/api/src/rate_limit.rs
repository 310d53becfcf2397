//! API rate limiting middleware.
//!
//! Fixed-window limiting keyed by client IP.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use agora_common::{AppError, config::RateLimitSettings};
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::{sync::RwLock, task::JoinHandle};

/// Rate limit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Time window duration in seconds.
    pub window_secs: u64,
    /// Key on `x-forwarded-for` / `x-real-ip` before the peer address.
    pub trust_proxy: bool,
}

impl RateLimitConfig {
    /// Create a new rate limit config keyed on the peer address.
    #[must_use]
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            trust_proxy: false,
        }
    }

    /// Honour forwarding headers set by a reverse proxy.
    #[must_use]
    pub const fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self::new(settings.max_requests, settings.window_secs)
            .with_trust_proxy(settings.trust_proxy)
    }
}

/// Rate limit state for a single key.
#[derive(Debug, Clone)]
struct RateLimitState {
    count: u32,
    window_start: Instant,
}

impl RateLimitState {
    fn new() -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
        }
    }
}

/// Rate limit check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed.
    Allowed {
        /// Remaining requests in window.
        remaining: u32,
        /// Total limit.
        limit: u32,
        /// Seconds until window reset.
        reset: u64,
    },
    /// Request is rate limited.
    Limited {
        /// Seconds until the window resets.
        retry_after: u64,
        /// Total limit.
        limit: u32,
    },
}

/// API rate limiter.
#[derive(Clone)]
pub struct ApiRateLimiter {
    config: RateLimitConfig,
    states: Arc<RwLock<HashMap<String, RateLimitState>>>,
}

impl ApiRateLimiter {
    /// Create a new rate limiter.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            states: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The limits this limiter enforces.
    #[must_use]
    pub const fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Check if a request is allowed and record it.
    pub async fn check(&self, key: &str) -> RateLimitResult {
        let mut states = self.states.write().await;
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_secs);

        let state = states
            .entry(key.to_string())
            .or_insert_with(RateLimitState::new);

        if now.duration_since(state.window_start) >= window {
            state.count = 0;
            state.window_start = now;
        }

        let reset = window
            .saturating_sub(now.duration_since(state.window_start))
            .as_secs();

        if state.count >= self.config.max_requests {
            return RateLimitResult::Limited {
                retry_after: reset.max(1),
                limit: self.config.max_requests,
            };
        }

        state.count += 1;

        RateLimitResult::Allowed {
            remaining: self.config.max_requests.saturating_sub(state.count),
            limit: self.config.max_requests,
            reset,
        }
    }

    /// Drop entries whose window ended.
    pub async fn cleanup(&self) {
        let mut states = self.states.write().await;
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_secs);

        states.retain(|_, state| now.duration_since(state.window_start) < window);
    }

    /// Get the number of tracked keys.
    pub async fn key_count(&self) -> usize {
        self.states.read().await.len()
    }

    /// Run [`ApiRateLimiter::cleanup`] once per window in the background.
    pub fn spawn_cleanup(&self) -> JoinHandle<()> {
        let limiter = self.clone();
        let period = Duration::from_secs(self.config.window_secs.max(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                limiter.cleanup().await;
                let keys = limiter.key_count().await;
                tracing::debug!(keys, "Pruned rate limit entries");
            }
        })
    }
}

/// Rate limit error response.
#[derive(Debug)]
pub struct RateLimitError {
    /// Seconds until the client may retry.
    pub retry_after: u64,
    /// Total limit.
    pub limit: u32,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let mut response = AppError::RateLimited.into_response();
        let headers = response.headers_mut();
        headers.insert("Retry-After", HeaderValue::from(self.retry_after));
        set_rate_limit_headers(headers, self.limit, 0, self.retry_after);
        response
    }
}

fn set_rate_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset: u64) {
    headers.insert("X-RateLimit-Limit", limit.into());
    headers.insert("X-RateLimit-Remaining", remaining.into());
    headers.insert("X-RateLimit-Reset", reset.into());
}

/// Extract client IP from forwarding headers.
fn forwarded_ip(req: &Request<Body>) -> Option<IpAddr> {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| {
        req.headers()
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<IpAddr>().ok())
    })
}

/// Resolve the client IP: forwarding headers when trusted, then the socket peer.
fn extract_client_ip(req: &Request<Body>, trust_proxy: bool) -> Option<IpAddr> {
    let forwarded = if trust_proxy { forwarded_ip(req) } else { None };

    forwarded.or_else(|| {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(limiter): State<ApiRateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, RateLimitError> {
    let key = extract_client_ip(&req, limiter.config().trust_proxy)
        .map_or_else(|| "unknown".to_string(), |ip| format!("ip:{ip}"));

    match limiter.check(&key).await {
        RateLimitResult::Allowed {
            remaining,
            limit,
            reset,
        } => {
            let mut response = next.run(req).await;
            set_rate_limit_headers(response.headers_mut(), limit, remaining, reset);
            Ok(response)
        }
        RateLimitResult::Limited { retry_after, limit } => {
            tracing::debug!(key = %key, retry_after, "Rate limited");
            Err(RateLimitError { retry_after, limit })
        }
    }
}
