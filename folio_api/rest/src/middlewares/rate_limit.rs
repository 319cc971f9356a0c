use std::{
    collections::HashMap,
    net::IpAddr,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{middlewares::client_ip::ClientIp, routes::error};

const HEADER_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const HEADER_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const HEADER_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

pub const RATE_LIMITED_MESSAGE: &str =
    "Too many contact requests from this IP, please try again later.";

/// Keyed fixed-window request counter: one window per client address, reset
/// once it has fully elapsed. Constructed at startup and passed into the
/// server as a dependency, so a multi-instance deployment can swap it for a
/// shared store.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Decision {
    allowed: bool,
    remaining: u32,
    reset_after: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn check(&self, client: IpAddr) -> Decision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> Decision {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");

        let window = windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        let reset_after = self
            .window
            .saturating_sub(now.duration_since(window.started));

        if window.count >= self.max_requests {
            return Decision {
                allowed: false,
                remaining: 0,
                reset_after,
            };
        }

        window.count += 1;

        Decision {
            allowed: true,
            remaining: self.max_requests - window.count,
            reset_after,
        }
    }
}

pub async fn middleware(
    State(rate_limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request.extensions().get::<ClientIp>().unwrap().0;
    let decision = rate_limiter.check(client);

    if !decision.allowed {
        warn!(%client, "rate limit exceeded");
        let mut response = error(StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED_MESSAGE);
        attach_headers(&mut response, rate_limiter.max_requests, &decision);
        response
            .headers_mut()
            .insert(RETRY_AFTER, number(reset_seconds(decision.reset_after)));
        return response;
    }

    let mut response = next.run(request).await;
    attach_headers(&mut response, rate_limiter.max_requests, &decision);
    response
}

fn attach_headers(response: &mut Response, limit: u32, decision: &Decision) {
    let headers = response.headers_mut();
    headers.insert(HEADER_LIMIT, number(limit.into()));
    headers.insert(HEADER_REMAINING, number(decision.remaining.into()));
    headers.insert(HEADER_RESET, number(reset_seconds(decision.reset_after)));
}

fn reset_seconds(reset_after: Duration) -> u64 {
    let secs = reset_after.as_secs() + u64::from(reset_after.subsec_nanos() > 0);
    secs.max(1)
}

fn number(value: u64) -> HeaderValue {
    HeaderValue::from_str(&value.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0"))
}
