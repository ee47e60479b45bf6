//! Per-client rate limiting backed by keyed `governor` limiters
//!
//! Every configured rule gets its own keyed limiter. A request has to be
//! admitted by all of them; the longest wait among the rejecting rules is
//! reported in `Retry-After`.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use governor::{clock::Clock, DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::config::{RateLimitConfig, RateLimitRule};
use crate::error::{Error, Result};

const UNKNOWN_CLIENT: &str = "unknown";

struct RuleLimiter {
    rule: RateLimitRule,
    limiter: DefaultKeyedRateLimiter<String>,
}

/// Rate limiting middleware state
#[derive(Clone)]
pub struct RateLimit {
    enabled: bool,
    limiters: Arc<Vec<RuleLimiter>>,
}

impl std::fmt::Debug for RateLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rules: Vec<_> = self.limiters.iter().map(|l| l.rule).collect();
        f.debug_struct("RateLimit")
            .field("enabled", &self.enabled)
            .field("rules", &rules)
            .finish()
    }
}

fn quota_for(rule: &RateLimitRule) -> Result<Quota> {
    let burst = NonZeroU32::new(rule.requests)
        .ok_or_else(|| Error::Internal("Rate limit rule allows zero requests".to_string()))?;
    // One cell replenishes every period / requests; the whole budget is available at once
    Quota::with_period(rule.period() / rule.requests)
        .map(|quota| quota.allow_burst(burst))
        .ok_or_else(|| Error::Internal(format!("Rate limit rule has no period: {:?}", rule)))
}

impl RateLimit {
    /// Build one keyed limiter per configured rule
    pub fn new(config: &RateLimitConfig) -> Result<Self> {
        let limiters = config
            .rules
            .iter()
            .map(|rule| {
                Ok(RuleLimiter {
                    rule: *rule,
                    limiter: RateLimiter::keyed(quota_for(rule)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            enabled: config.enabled,
            limiters: Arc::new(limiters),
        })
    }

    /// A limiter that admits everything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            limiters: Arc::new(Vec::new()),
        }
    }

    /// Count one request for `client` against every rule
    pub fn check(&self, client: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let key = client.to_string();
        let mut retry_after: Option<Duration> = None;
        for entry in self.limiters.iter() {
            if let Err(not_until) = entry.limiter.check_key(&key) {
                let wait = not_until.wait_time_from(entry.limiter.clock().now());
                tracing::warn!(
                    client = %client,
                    requests = entry.rule.requests,
                    period_secs = entry.rule.period_secs,
                    "Rate limit exceeded"
                );
                retry_after = Some(retry_after.map_or(wait, |current| current.max(wait)));
            }
        }

        match retry_after {
            Some(retry_after) => Err(Error::RateLimited { retry_after }),
            None => Ok(()),
        }
    }

    /// Drop per-client state that has fully replenished
    pub fn retain_recent(&self) {
        for entry in self.limiters.iter() {
            entry.limiter.retain_recent();
            entry.limiter.shrink_to_fit();
        }
    }

    /// Middleware function enforcing every rule for the calling client
    pub async fn middleware(
        State(rate_limit): State<Self>,
        request: Request<Body>,
        next: Next,
    ) -> std::result::Result<Response, Error> {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let client = client_key(request.headers(), peer);
        rate_limit.check(&client)?;
        Ok(next.run(request).await)
    }
}

/// Client identity: first `X-Forwarded-For` entry, else the peer IP
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config(rules: Vec<RateLimitRule>) -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            rules,
        }
    }

    #[test]
    fn test_rejects_after_budget_is_spent() {
        let limit = RateLimit::new(&config(vec![RateLimitRule {
            requests: 2,
            period_secs: 60,
        }]))
        .unwrap();

        assert!(limit.check("10.0.0.1").is_ok());
        assert!(limit.check("10.0.0.1").is_ok());
        match limit.check("10.0.0.1") {
            Err(Error::RateLimited { retry_after }) => {
                assert!(retry_after > Duration::ZERO);
                assert!(retry_after <= Duration::from_secs(30));
            }
            other => panic!("expected rate limit error, got {:?}", other),
        }
    }

    #[test]
    fn test_clients_have_separate_budgets() {
        let limit = RateLimit::new(&config(vec![RateLimitRule {
            requests: 1,
            period_secs: 60,
        }]))
        .unwrap();

        assert!(limit.check("10.0.0.1").is_ok());
        assert!(limit.check("10.0.0.2").is_ok());
        assert!(limit.check("10.0.0.1").is_err());
    }

    #[test]
    fn test_strictest_rule_wins() {
        let limit = RateLimit::new(&config(vec![
            RateLimitRule {
                requests: 100,
                period_secs: 60,
            },
            RateLimitRule {
                requests: 1,
                period_secs: 10,
            },
        ]))
        .unwrap();

        assert!(limit.check("client").is_ok());
        assert!(limit.check("client").is_err());
    }

    #[test]
    fn test_disabled_admits_everything() {
        let limit = RateLimit::disabled();
        for _ in 0..1000 {
            assert!(limit.check("client").is_ok());
        }
    }

    #[test]
    fn test_zero_request_rule_is_rejected() {
        let result = RateLimit::new(&config(vec![RateLimitRule {
            requests: 0,
            period_secs: 10,
        }]));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_key_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        assert_eq!(client_key(&headers, Some(peer)), "203.0.113.9");
        assert_eq!(client_key(&HeaderMap::new(), Some(peer)), "127.0.0.1");
        assert_eq!(client_key(&HeaderMap::new(), None), "unknown");
    }
}
