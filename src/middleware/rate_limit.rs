//! Rate limiting middleware.
//!
//! Simple in-memory rate limiting per IP address using a sliding window.
//! The auth routes allow 10 requests per 15 minutes per client.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

pub const AUTH_RATE_LIMIT: u32 = 10;
pub const AUTH_RATE_WINDOW: Duration = Duration::from_secs(15 * 60);

const LIMIT_MESSAGE: &str = "Too many attempts, please try again after 15 minutes";

/// Rate limiter state tracking requests per IP.
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    state: Arc<Mutex<HashMap<IpAddr, WindowEntry>>>,
}

struct WindowEntry {
    count: u32,
    window_start: Instant,
}

enum RateLimitResult {
    Allowed,
    Exceeded { retry_after: Duration },
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check if a request from this IP should be allowed.
    fn check(&self, ip: IpAddr) -> RateLimitResult {
        let mut state = self.state.lock();
        let now = Instant::now();

        // Drop expired windows so the map does not grow with the number of
        // distinct client IPs ever seen.
        state.retain(|_, entry| now.duration_since(entry.window_start) < self.window);

        let entry = state.entry(ip).or_insert(WindowEntry {
            count: 0,
            window_start: now,
        });

        entry.count += 1;

        if entry.count > self.max_requests {
            let reset_at = entry.window_start + self.window;
            RateLimitResult::Exceeded {
                retry_after: reset_at.duration_since(now),
            }
        } else {
            RateLimitResult::Allowed
        }
    }
}

/// Rate limiting middleware function.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limiter.check(ip) {
        RateLimitResult::Allowed => next.run(request).await,
        RateLimitResult::Exceeded { retry_after } => {
            warn!(
                ip = %ip,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );

            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after.as_secs().to_string())],
                Html(format!("<p>{LIMIT_MESSAGE}</p>")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_allows_under_limit() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        for _ in 0..10 {
            match limiter.check(ip) {
                RateLimitResult::Allowed => {}
                _ => panic!("Should be allowed"),
            }
        }
    }

    #[test]
    fn test_rate_limit_rejects_over_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        for _ in 0..3 {
            match limiter.check(ip) {
                RateLimitResult::Allowed => {}
                _ => panic!("Should be allowed"),
            }
        }

        match limiter.check(ip) {
            RateLimitResult::Exceeded { retry_after } => {
                assert!(retry_after <= Duration::from_secs(60));
            }
            _ => panic!("Should be exceeded"),
        }
    }

    #[test]
    fn test_rate_limit_tracks_ips_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(matches!(limiter.check(a), RateLimitResult::Allowed));
        assert!(matches!(limiter.check(a), RateLimitResult::Exceeded { .. }));
        assert!(matches!(limiter.check(b), RateLimitResult::Allowed));
    }

    #[test]
    fn test_expired_entries_are_pruned() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));
        for i in 0..50 {
            let ip: IpAddr = format!("10.1.0.{i}").parse().unwrap();
            limiter.check(ip);
        }
        assert_eq!(limiter.state.lock().len(), 50);

        std::thread::sleep(Duration::from_millis(25));
        limiter.check("192.168.0.1".parse().unwrap());

        // Only the live window survives.
        assert_eq!(limiter.state.lock().len(), 1);
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        assert!(matches!(limiter.check(ip), RateLimitResult::Allowed));
        assert!(matches!(limiter.check(ip), RateLimitResult::Exceeded { .. }));

        std::thread::sleep(Duration::from_millis(25));
        assert!(matches!(limiter.check(ip), RateLimitResult::Allowed));
    }
}
