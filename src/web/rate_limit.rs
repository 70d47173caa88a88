//! Fixed-window request limiting per client address.
//!
//! Each client gets `requests` admissions per `window`; the window starts at
//! the client's first request and resets once it has fully elapsed.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::web::api::error::ApiError;
use crate::web::config::RateLimitConfig;

const PRUNE_EVERY: u64 = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: DashMap<String, Window>,
    checks: AtomicU64,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            limit: config.requests,
            window: config.window,
            windows: DashMap::new(),
            checks: AtomicU64::new(0),
        }
    }

    /// Admit one request from `client`, or return how long until it may retry.
    pub fn check(&self, client: &str) -> Result<(), Duration> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> Result<(), Duration> {
        let outcome = {
            let mut entry = self.windows.entry(client.to_string()).or_insert(Window {
                started: now,
                count: 0,
            });
            let elapsed = now.saturating_duration_since(entry.started);
            if elapsed >= self.window {
                entry.started = now;
                entry.count = 0;
            }

            if entry.count >= self.limit {
                Err(self.window - now.saturating_duration_since(entry.started))
            } else {
                entry.count += 1;
                Ok(())
            }
        };

        // entry guard must be released before touching other shards
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune(now);
        }

        outcome
    }

    fn prune(&self, now: Instant) {
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(&request);
    match limiter.check(&client) {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            log::warn!("Rate limit exceeded for {} on {}", client, request.uri().path());
            ApiError::RateLimited {
                retry_after_secs: retry_after_secs(retry_after),
            }
            .into_response()
        }
    }
}

/// Peer address when the server exposes it, else the first `X-Forwarded-For` hop.
fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn retry_after_secs(remaining: Duration) -> u64 {
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::test_utils::TestApp;

    fn limiter(requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            requests,
            window: Duration::from_secs(window_secs),
        })
    }

    #[test]
    fn admits_up_to_limit_then_rejects() {
        let limiter = limiter(2, 60);
        let now = Instant::now();

        assert!(limiter.check_at("10.0.0.1", now).is_ok());
        assert!(limiter.check_at("10.0.0.1", now).is_ok());
        let retry = limiter
            .check_at("10.0.0.1", now + Duration::from_secs(15))
            .unwrap_err();
        assert_eq!(retry, Duration::from_secs(45));
    }

    #[test]
    fn window_rollover_admits_again() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.check_at("10.0.0.1", now).is_ok());
        assert!(limiter.check_at("10.0.0.1", now + Duration::from_secs(59)).is_err());
        assert!(limiter.check_at("10.0.0.1", now + Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn clients_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.check_at("10.0.0.1", now).is_ok());
        assert!(limiter.check_at("10.0.0.2", now).is_ok());
        assert!(limiter.check_at("10.0.0.1", now).is_err());
    }

    #[test]
    fn stale_windows_are_pruned() {
        let limiter = limiter(5, 1);
        let now = Instant::now();
        limiter.check_at("old", now).unwrap();

        let later = now + Duration::from_secs(5);
        for i in 0..PRUNE_EVERY {
            let _ = limiter.check_at(&format!("client-{}", i % 8), later);
        }
        assert_eq!(limiter.tracked_clients(), 8);
    }

    #[test]
    fn retry_after_rounds_up() {
        assert_eq!(retry_after_secs(Duration::from_millis(1500)), 2);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }

    #[tokio::test]
    async fn prediction_routes_are_limited_per_client() {
        let server = TestApp::new("unused")
            .with_rate_limit(RateLimitConfig {
                requests: 2,
                window: Duration::from_secs(60),
            })
            .server();

        for _ in 0..2 {
            server
                .get("/soc-test-predict/")
                .add_header("x-forwarded-for", "203.0.113.7")
                .await
                .assert_status_ok();
        }

        let response = server
            .get("/soh-test-predict/")
            .add_header("x-forwarded-for", "203.0.113.7")
            .await;
        response.assert_status(StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));
        assert_eq!(response.json::<Value>()["error"], "rate_limited");

        server
            .get("/soc-test-predict/")
            .add_header("x-forwarded-for", "198.51.100.1")
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn health_is_never_limited() {
        let server = TestApp::new("unused")
            .with_rate_limit(RateLimitConfig {
                requests: 1,
                window: Duration::from_secs(60),
            })
            .server();

        for _ in 0..5 {
            server.get("/health").await.assert_status_ok();
        }
    }
}
