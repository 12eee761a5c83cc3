//! Mutex-guarded IAM token cache
//!
//! A single cached credential refreshed lazily: callers take the slot's
//! mutex, refresh only when less than the safety margin remains before
//! expiry, and otherwise reuse the cached value. Because every caller
//! blocks on the same mutex, at most one refresh is ever outstanding and
//! each caller observes a non-expired token or an error.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use nimbus_core::Result;
use tokio::sync::Mutex;

/// An issued credential with its expiry deadline.
#[derive(Debug, Clone)]
pub struct IamToken {
    /// The opaque token value
    pub value: String,
    /// When the token stops being accepted
    pub expires_at: Instant,
}

impl IamToken {
    /// A token valid for `ttl` starting now.
    pub fn valid_for(value: impl Into<String>, ttl: Duration) -> Self {
        Self {
            value: value.into(),
            expires_at: Instant::now() + ttl,
        }
    }
}

/// Issues fresh credentials; implemented by the concrete auth client.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Issue a new token.
    async fn issue(&self) -> Result<IamToken>;
}

/// Default safety margin before expiry at which a refresh is forced.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Lazily refreshed, mutex-guarded token cache.
pub struct TokenCache<S> {
    source: S,
    margin: Duration,
    slot: Mutex<Option<IamToken>>,
}

impl<S: TokenSource> TokenCache<S> {
    /// Cache over `source` with the default one-minute refresh margin.
    pub fn new(source: S) -> Self {
        Self {
            source,
            margin: REFRESH_MARGIN,
            slot: Mutex::new(None),
        }
    }

    /// Override the refresh safety margin.
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.margin = margin;
        self
    }

    /// A token guaranteed to outlive the refresh margin at return time.
    pub async fn token(&self) -> Result<String> {
        let mut slot = self.slot.lock().await;
        match slot.as_ref() {
            Some(token) if token.expires_at > Instant::now() + self.margin => {
                Ok(token.value.clone())
            }
            _ => {
                // refresh happens under the lock: concurrent callers wait
                // here instead of issuing duplicate refreshes
                let token = self.source.issue().await?;
                let value = token.value.clone();
                *slot = Some(token);
                Ok(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        issued: AtomicUsize,
        ttl: Duration,
    }

    impl CountingSource {
        fn new(ttl: Duration) -> Self {
            Self {
                issued: AtomicUsize::new(0),
                ttl,
            }
        }
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn issue(&self) -> Result<IamToken> {
            let n = self.issued.fetch_add(1, Ordering::SeqCst);
            Ok(IamToken::valid_for(format!("token-{n}"), self.ttl))
        }
    }

    #[tokio::test]
    async fn cached_token_is_reused_until_margin() {
        let cache = TokenCache::new(CountingSource::new(Duration::from_secs(3600)))
            .with_refresh_margin(Duration::from_secs(60));
        assert_eq!(cache.token().await.unwrap(), "token-0");
        assert_eq!(cache.token().await.unwrap(), "token-0");
        assert_eq!(cache.source.issued.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expiring_token_is_refreshed() {
        // ttl smaller than the margin: every call refreshes
        let cache = TokenCache::new(CountingSource::new(Duration::from_millis(10)))
            .with_refresh_margin(Duration::from_secs(60));
        assert_eq!(cache.token().await.unwrap(), "token-0");
        assert_eq!(cache.token().await.unwrap(), "token-1");
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let cache = Arc::new(
            TokenCache::new(CountingSource::new(Duration::from_secs(3600)))
                .with_refresh_margin(Duration::from_secs(60)),
        );
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            tasks.push(tokio::spawn(async move { cache.token().await.unwrap() }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), "token-0");
        }
        assert_eq!(cache.source.issued.load(Ordering::SeqCst), 1);
    }
}
