//! Bearer-token access for the CRM API.
//!
//! Refresh mechanics are out of scope here; the adapters only need a
//! "valid bearer token" capability. [`CachedToken`] wraps an inner
//! source with an expiry buffer and an injected clock so tests can
//! simulate expiry without real time passing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use lf_domain::{Error, Result};

#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer(&self) -> Result<String>;
}

/// A fixed token, typically loaded from config.
pub struct StaticToken(pub String);

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn bearer(&self) -> Result<String> {
        if self.0.is_empty() {
            return Err(Error::AuthRequired("no access token configured".into()));
        }
        Ok(self.0.clone())
    }
}

/// Caches the inner source's token for a fixed lifetime, minus a
/// safety buffer. The clock is injected so expiry is testable.
pub struct CachedToken {
    inner: Arc<dyn TokenSource>,
    lifetime: Duration,
    buffer: Duration,
    clock: Box<dyn Fn() -> Instant + Send + Sync>,
    cached: Mutex<Option<(String, Instant)>>,
}

impl CachedToken {
    pub fn new(inner: Arc<dyn TokenSource>, lifetime: Duration) -> Self {
        Self::with_clock(inner, lifetime, Instant::now)
    }

    pub fn with_clock(
        inner: Arc<dyn TokenSource>,
        lifetime: Duration,
        clock: impl Fn() -> Instant + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner,
            lifetime,
            buffer: Duration::from_secs(300),
            clock: Box::new(clock),
            cached: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl TokenSource for CachedToken {
    async fn bearer(&self) -> Result<String> {
        let now = (self.clock)();
        if let Some((token, fetched_at)) = self.cached.lock().clone() {
            let age = now.saturating_duration_since(fetched_at);
            if age + self.buffer < self.lifetime {
                return Ok(token);
            }
        }
        let token = self.inner.bearer().await?;
        *self.cached.lock() = Some((token.clone(), now));
        Ok(token)
    }
}
