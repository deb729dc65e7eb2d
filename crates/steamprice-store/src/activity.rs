//! Cross-process queue activity ledger
//!
//! Queues in different processes sharing one store use an advisory record
//! to avoid hitting the market endpoints at the same time. The record says
//! which queue dispatched last and when. A queue may dispatch when the
//! record is missing, stale, or its own. Read and write are separate store
//! calls, so two processes can still interleave within a tick; the window
//! relieves rate pressure, it is not mutual exclusion.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::{SharedStore, StoreError, StoreExt};
use crate::settings::keys;

/// Which queue used the shared request budget last, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Wall-clock time of the last dispatch, epoch milliseconds on the wire
    #[serde(rename = "lastUsed", with = "chrono::serde::ts_milliseconds")]
    pub last_used: DateTime<Utc>,
    /// Identity of the queue that dispatched
    #[serde(rename = "usedAt")]
    pub used_at: String,
}

/// A record blocks only while it is fresh and belongs to someone else.
/// Records dated in the future count as fresh.
pub fn claim_is_free(
    record: &ActivityRecord,
    now: DateTime<Utc>,
    location: &str,
    freshness: Duration,
) -> bool {
    if record.used_at == location {
        return true;
    }
    match now.signed_duration_since(record.last_used).to_std() {
        Ok(age) => age > freshness,
        Err(_) => false,
    }
}

/// Advisory claim over the shared request budget.
#[derive(Debug, Clone)]
pub struct ActivityLedger {
    store: Arc<dyn SharedStore>,
    location: String,
    freshness: Duration,
}

impl ActivityLedger {
    /// How long a foreign record blocks dispatch
    pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(10);

    pub fn new(store: Arc<dyn SharedStore>, location: impl Into<String>) -> Self {
        Self::with_freshness(store, location, Self::DEFAULT_FRESHNESS)
    }

    pub fn with_freshness(
        store: Arc<dyn SharedStore>,
        location: impl Into<String>,
        freshness: Duration,
    ) -> Self {
        Self {
            store,
            location: location.into(),
            freshness,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// True when this queue may dispatch now. Missing and unreadable
    /// records never block.
    pub async fn may_run(&self) -> bool {
        let record = match self.store.get::<ActivityRecord>(keys::QUEUE_ACTIVITY).await {
            Ok(record) => record,
            Err(error) => {
                warn!(%error, "activity record unreadable, treating as free");
                return true;
            }
        };
        match record {
            None => true,
            Some(record) => {
                let now = Utc::now();
                let free = claim_is_free(&record, now, &self.location, self.freshness);
                if !free {
                    debug!(
                        used_at = %record.used_at,
                        age_secs = now.signed_duration_since(record.last_used).num_seconds(),
                        "another queue holds the request budget"
                    );
                }
                free
            }
        }
    }

    /// Record a dispatch by this queue. Write failures are logged and
    /// swallowed, they must not fail the job that triggered them.
    pub async fn touch(&self) {
        let record = ActivityRecord {
            last_used: Utc::now(),
            used_at: self.location.clone(),
        };
        if let Err(error) = self.store.set(keys::QUEUE_ACTIVITY, &record).await {
            warn!(%error, "failed to write activity record");
        }
    }

    /// Current raw record, for status displays.
    pub async fn current(&self) -> Result<Option<ActivityRecord>, StoreError> {
        self.store.get(keys::QUEUE_ACTIVITY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use chrono::TimeDelta;

    const WINDOW: Duration = Duration::from_secs(10);

    fn record(age_secs: i64, used_at: &str) -> (ActivityRecord, DateTime<Utc>) {
        let now = Utc::now();
        let record = ActivityRecord {
            last_used: now - TimeDelta::seconds(age_secs),
            used_at: used_at.to_string(),
        };
        (record, now)
    }

    #[test]
    fn own_record_is_always_free() {
        let (record, now) = record(0, "queue-a");
        assert!(claim_is_free(&record, now, "queue-a", WINDOW));
    }

    #[test]
    fn fresh_foreign_record_blocks() {
        let (record, now) = record(3, "queue-b");
        assert!(!claim_is_free(&record, now, "queue-a", WINDOW));
    }

    #[test]
    fn stale_foreign_record_is_free() {
        let (record, now) = record(11, "queue-b");
        assert!(claim_is_free(&record, now, "queue-a", WINDOW));
    }

    #[test]
    fn future_dated_foreign_record_blocks() {
        let (record, now) = record(-30, "queue-b");
        assert!(!claim_is_free(&record, now, "queue-a", WINDOW));
    }

    #[test]
    fn wire_format_matches_older_frontends() {
        let record = ActivityRecord {
            last_used: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            used_at: "queue-a".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"lastUsed": 1_700_000_000_000i64, "usedAt": "queue-a"})
        );
    }

    #[tokio::test]
    async fn missing_record_never_blocks() {
        let ledger = ActivityLedger::new(Arc::new(MemoryStore::new()), "queue-a");
        assert!(ledger.may_run().await);
    }

    #[tokio::test]
    async fn touch_then_read_back() {
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        let ledger = ActivityLedger::new(store, "queue-a");

        ledger.touch().await;

        let record = ledger.current().await.unwrap().unwrap();
        assert_eq!(record.used_at, "queue-a");
        assert!(ledger.may_run().await);
    }

    #[tokio::test]
    async fn foreign_fresh_record_blocks_and_expires() {
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        let ours = ActivityLedger::new(Arc::clone(&store), "queue-a");

        let fresh = ActivityRecord {
            last_used: Utc::now(),
            used_at: "queue-b".to_string(),
        };
        store.set(keys::QUEUE_ACTIVITY, &fresh).await.unwrap();
        assert!(!ours.may_run().await);

        let stale = ActivityRecord {
            last_used: Utc::now() - TimeDelta::seconds(11),
            used_at: "queue-b".to_string(),
        };
        store.set(keys::QUEUE_ACTIVITY, &stale).await.unwrap();
        assert!(ours.may_run().await);
    }

    #[tokio::test]
    async fn malformed_record_is_treated_as_free() {
        let store: Arc<dyn SharedStore> = Arc::new(MemoryStore::new());
        store
            .set_value(keys::QUEUE_ACTIVITY, serde_json::json!({"bogus": true}))
            .await
            .unwrap();

        let ledger = ActivityLedger::new(store, "queue-a");
        assert!(ledger.may_run().await);
    }
}
