use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::json;

/// Shared atomic counter backend. The increment must be a single atomic
/// operation at the store so concurrent requests cannot both pass at the
/// boundary count.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increments the counter at `key`, creating it with `ttl` on first
    /// use, and returns the post-increment value.
    async fn increment(&self, key: &str, ttl: Duration) -> anyhow::Result<u64>;
}

pub struct RedisCounterStore {
    manager: ConnectionManager,
}

impl RedisCounterStore {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> anyhow::Result<u64> {
        let mut conn = self.manager.clone();
        let count: u64 = conn.incr(key, 1).await?;
        if count == 1 {
            let _: () = conn.expire(key, ttl.as_secs() as i64).await?;
        }
        Ok(count)
    }
}

/// Process-local backend for tests and single-instance development runs.
#[derive(Default)]
pub struct MemoryCounterStore {
    counters: Mutex<HashMap<String, (u64, Instant)>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &str, ttl: Duration) -> anyhow::Result<u64> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| anyhow::anyhow!("counter mutex poisoned"))?;
        let now = Instant::now();
        counters.retain(|_, (_, deadline)| *deadline > now);
        let entry = counters.entry(key.to_string()).or_insert((0, now + ttl));
        entry.0 += 1;
        Ok(entry.0)
    }
}

/// One budget per protected operation. The scope keeps counters of
/// different endpoints apart even for the same client.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitRule {
    pub max_requests: u64,
    pub window: Duration,
    pub scope: &'static str,
}

impl RateLimitRule {
    pub const fn per_second(max_requests: u64, scope: &'static str) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(1),
            scope,
        }
    }
}

#[derive(Clone)]
pub struct RateLimitState {
    store: Arc<dyn CounterStore>,
    rule: RateLimitRule,
}

impl RateLimitState {
    pub fn new(store: Arc<dyn CounterStore>, rule: RateLimitRule) -> Self {
        Self { store, rule }
    }

    pub async fn allow(&self, client_key: &str) -> bool {
        let now_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.allow_at(client_key, now_secs).await
    }

    async fn allow_at(&self, client_key: &str, now_secs: u64) -> bool {
        let window_start = aligned_window_start(now_secs, self.rule.window);
        let key = format!(
            "throttle:{}:{}:{}",
            client_key, self.rule.scope, window_start
        );
        match self.store.increment(&key, self.rule.window).await {
            Ok(count) => count <= self.rule.max_requests,
            Err(err) => {
                // Counter store outages must not take the API down with
                // them: fail open.
                tracing::warn!(error = ?err, scope = self.rule.scope, "rate limit store unavailable, allowing request");
                true
            }
        }
    }
}

/// All requests arriving within the same aligned window share one counter.
fn aligned_window_start(now_secs: u64, window: Duration) -> u64 {
    let window_secs = window.as_secs().max(1);
    now_secs - now_secs % window_secs
}

/// The client key for anonymous callers is the first hop of the
/// forwarded-for chain. The header is trusted as-is, which a spoofing
/// client can abuse to rotate its key; see DESIGN.md.
fn client_key(req: &Request<Body>) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = client_key(&req);
    if !state.allow(&client).await {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"error": "rate_limit_exceeded"})),
        )
            .into_response();
    }
    next.run(req).await
}
