//! Queue pacing and identity configuration.

use std::env;
use std::time::Duration;

use steamprice_store::Settings;
use uuid::Uuid;

/// How the queue paces itself and identifies itself to other processes.
///
/// Delays are read once, when the config is built. A settings change made
/// while a queue is running takes effect the next time a queue is
/// constructed, not mid-drain.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Wait after a completed network call before the next job.
    pub success_delay: Duration,
    /// Wait after a failed job before trying the next one.
    pub failure_delay: Duration,
    /// Attempts after which a job is dropped without its callback firing.
    pub retry_limit: u32,
    /// How long another process's ledger claim is honored.
    pub ledger_freshness: Duration,
    /// Name this queue writes into the shared ledger.
    pub location: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            success_delay: Duration::from_millis(steamprice_store::defaults::SUCCESS_DELAY_MS),
            failure_delay: Duration::from_millis(steamprice_store::defaults::FAILURE_DELAY_MS),
            retry_limit: 5,
            ledger_freshness: Duration::from_secs(10),
            location: format!("queue-{}", Uuid::new_v4()),
        }
    }
}

impl QueueConfig {
    /// Builds a config from persisted settings, falling back to defaults
    /// for anything missing.
    pub async fn for_settings(settings: &Settings) -> Self {
        Self {
            success_delay: settings.success_delay().await,
            failure_delay: settings.failure_delay().await,
            ..Self::default()
        }
    }

    /// Builds a config from the environment.
    ///
    /// - `STEAMPRICE_SUCCESS_DELAY_MS`
    /// - `STEAMPRICE_FAILURE_DELAY_MS`
    /// - `STEAMPRICE_RETRY_LIMIT`
    /// - `STEAMPRICE_QUEUE_LOCATION`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(delay) = env_ms("STEAMPRICE_SUCCESS_DELAY_MS") {
            config.success_delay = delay;
        }
        if let Some(delay) = env_ms("STEAMPRICE_FAILURE_DELAY_MS") {
            config.failure_delay = delay;
        }
        if let Ok(limit) = env::var("STEAMPRICE_RETRY_LIMIT") {
            if let Ok(limit) = limit.parse() {
                config.retry_limit = limit;
            }
        }
        if let Ok(location) = env::var("STEAMPRICE_QUEUE_LOCATION") {
            config.location = location;
        }

        config
    }
}

fn env_ms(key: &str) -> Option<Duration> {
    env::var(key).ok()?.parse().ok().map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use steamprice_store::{keys, MemoryStore, SharedStore, StoreExt};

    use super::*;

    #[test]
    fn default_location_is_unique_per_queue() {
        let a = QueueConfig::default();
        let b = QueueConfig::default();
        assert_ne!(a.location, b.location);
        assert!(a.location.starts_with("queue-"));
    }

    #[tokio::test]
    async fn settings_override_the_default_delays() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(keys::SUCCESS_DELAY_MS, &500u64)
            .await
            .expect("seed success delay");
        store
            .set(keys::FAILURE_DELAY_MS, &700u64)
            .await
            .expect("seed failure delay");

        let settings = Settings::new(store as Arc<dyn SharedStore>);
        let config = QueueConfig::for_settings(&settings).await;
        assert_eq!(config.success_delay, Duration::from_millis(500));
        assert_eq!(config.failure_delay, Duration::from_millis(700));
        assert_eq!(config.retry_limit, 5);
    }

    #[tokio::test]
    async fn missing_settings_leave_the_defaults() {
        let store = Arc::new(MemoryStore::new());
        let settings = Settings::new(store as Arc<dyn SharedStore>);
        let config = QueueConfig::for_settings(&settings).await;
        assert_eq!(config.success_delay, Duration::from_millis(3000));
        assert_eq!(config.failure_delay, Duration::from_millis(15000));
    }
}
