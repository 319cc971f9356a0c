use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use folio_core_health_contracts::{HealthService, HealthStatus};
use folio_email_contracts::EmailService;
use tokio::sync::RwLock;
use tracing::error;

#[derive(Debug, Clone)]
pub struct HealthServiceImpl<Email> {
    email: Option<Email>,
    config: HealthServiceConfig,
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct HealthServiceConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug, Default)]
struct State {
    cache: RwLock<Option<CachedStatus>>,
}

#[derive(Debug)]
struct CachedStatus {
    status: HealthStatus,
    checked_at: Instant,
}

impl<Email> HealthServiceImpl<Email> {
    pub fn new(email: Option<Email>, config: HealthServiceConfig) -> Self {
        Self {
            email,
            config,
            state: Default::default(),
        }
    }
}

impl<Email> HealthService for HealthServiceImpl<Email>
where
    Email: EmailService,
{
    async fn get_status(&self) -> HealthStatus {
        let now = Instant::now();
        let cache_guard = self.state.cache.read().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| now < c.checked_at + self.config.cache_ttl)
        {
            return cached.status;
        }
        drop(cache_guard);

        let mut cache_guard = self.state.cache.write().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| now < c.checked_at + self.config.cache_ttl)
        {
            return cached.status;
        }

        let email = match &self.email {
            Some(email) => email
                .ping()
                .await
                .inspect_err(|err| error!("Failed to ping smtp server: {err}"))
                .is_ok(),
            None => false,
        };

        let status = HealthStatus { email };

        cache_guard
            .insert(CachedStatus {
                status,
                checked_at: now,
            })
            .status
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use folio_email_contracts::MockEmailService;

    use super::*;

    #[tokio::test]
    async fn reachable() {
        // Arrange
        let email = MockEmailService::new().with_ping(Ok(()));
        let sut = HealthServiceImpl::new(Some(email), config(Duration::from_secs(60)));

        // Act
        let status = sut.get_status().await;

        // Assert
        assert_eq!(status, HealthStatus { email: true });
    }

    #[tokio::test]
    async fn unreachable() {
        // Arrange
        let email = MockEmailService::new().with_ping(Err(anyhow!("connection refused")));
        let sut = HealthServiceImpl::new(Some(email), config(Duration::from_secs(60)));

        // Act
        let status = sut.get_status().await;

        // Assert
        assert_eq!(status, HealthStatus { email: false });
    }

    #[tokio::test]
    async fn unconfigured() {
        // Arrange
        let sut =
            HealthServiceImpl::<MockEmailService>::new(None, config(Duration::from_secs(60)));

        // Act
        let status = sut.get_status().await;

        // Assert
        assert_eq!(status, HealthStatus { email: false });
    }

    #[tokio::test]
    async fn cached_within_ttl() {
        // Arrange
        let email = MockEmailService::new().with_ping(Ok(()));
        let sut = HealthServiceImpl::new(Some(email), config(Duration::from_secs(60)));

        // Act
        let first = sut.get_status().await;
        let second = sut.get_status().await;

        // Assert: the mock only allows a single ping.
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn probed_again_after_ttl() {
        // Arrange
        let mut email = MockEmailService::new();
        email
            .expect_ping()
            .times(2)
            .returning(|| Box::pin(std::future::ready(Ok(()))));
        let sut = HealthServiceImpl::new(Some(email), config(Duration::ZERO));

        // Act + Assert
        assert_eq!(sut.get_status().await, HealthStatus { email: true });
        assert_eq!(sut.get_status().await, HealthStatus { email: true });
    }

    fn config(cache_ttl: Duration) -> HealthServiceConfig {
        HealthServiceConfig { cache_ttl }
    }
}
