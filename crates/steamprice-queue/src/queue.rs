//! The serialized drain loop driving price lookups.
//!
//! One job is in flight at a time. A completed network call reschedules
//! the next drain after the success delay, a failed job goes back to the
//! tail and the queue retries after the failure delay, and the shared
//! activity ledger keeps queues in other processes from hitting the
//! market in the same window.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use steamprice_market::{FetchError, PriceSource};
use steamprice_store::{ActivityLedger, SharedStore};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time;
use tracing::{debug, warn};

use crate::cache::{CacheKey, PriceCache};
use crate::config::QueueConfig;
use crate::job::{Job, SourceOp};

/// Callback fired once, the next time the queue runs dry.
pub type DrainedCallback = Box<dyn FnOnce() + Send + 'static>;

/// Why a dequeued job did not complete on this attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailReason {
    /// A queue in another process holds the shared request budget.
    #[error("other_active_pricequeue")]
    OtherQueueActive,
    /// The market call itself failed.
    #[error(transparent)]
    Source(FetchError),
}

struct PendingJob {
    job: Job,
    retries: u32,
}

struct QueueState {
    active: bool,
    pending: VecDeque<PendingJob>,
    cache: PriceCache,
    on_drained: Option<DrainedCallback>,
}

enum Step {
    Drained(Option<DrainedCallback>),
    Busy,
    Run(PendingJob),
}

struct QueueInner {
    config: QueueConfig,
    source: Arc<dyn PriceSource>,
    ledger: ActivityLedger,
    state: Mutex<QueueState>,
}

/// Serialized price lookup queue.
///
/// Jobs run strictly one at a time in arrival order. Callbacks fire on
/// success only; a job that keeps failing is retried a few times and then
/// dropped without a word, matching a UI that simply stops refreshing a
/// price it cannot get. Clones share the same queue.
#[derive(Clone)]
pub struct PriceQueue {
    inner: Arc<QueueInner>,
}

impl PriceQueue {
    pub fn new(
        source: Arc<dyn PriceSource>,
        store: Arc<dyn SharedStore>,
        config: QueueConfig,
    ) -> Self {
        let ledger =
            ActivityLedger::with_freshness(store, config.location.clone(), config.ledger_freshness);
        Self {
            inner: Arc::new(QueueInner {
                config,
                source,
                ledger,
                state: Mutex::new(QueueState {
                    active: false,
                    pending: VecDeque::new(),
                    cache: PriceCache::new(),
                    on_drained: None,
                }),
            }),
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.inner.config
    }

    /// Appends a job at the tail. Draining does not start by itself, call
    /// [`drain`](Self::drain) once the batch is queued.
    pub async fn enqueue(&self, job: Job) {
        let mut state = self.inner.state.lock().await;
        debug!(
            kind = %job.kind(),
            item = %job.item(),
            pending = state.pending.len() + 1,
            "job queued"
        );
        state.pending.push_back(PendingJob { job, retries: 0 });
    }

    pub async fn pending_len(&self) -> usize {
        self.inner.state.lock().await.pending.len()
    }

    /// Whether a job is in flight right now.
    pub async fn is_active(&self) -> bool {
        self.inner.state.lock().await.active
    }

    /// Number of prices resolved and cached so far.
    pub async fn cache_len(&self) -> usize {
        self.inner.state.lock().await.cache.len()
    }

    /// Registers a callback for the next time the queue runs dry. Replaces
    /// any callback registered earlier.
    pub async fn on_drained(&self, callback: impl FnOnce() + Send + 'static) {
        self.inner.state.lock().await.on_drained = Some(Box::new(callback));
    }

    /// Starts or continues draining. Safe to call at any time from inside
    /// a Tokio runtime; a queue already working on a job ignores the nudge.
    pub fn drain(&self) {
        let queue = self.clone();
        tokio::spawn(async move { queue.tick().await });
    }

    /// Drains and waits until the queue reports empty.
    pub async fn run_until_drained(&self) {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.on_drained(move || {
            tx.send(()).ok();
        })
        .await;
        self.drain();
        rx.await.ok();
    }

    async fn tick(&self) {
        let step = {
            let mut state = self.inner.state.lock().await;
            if state.pending.is_empty() {
                state.active = false;
                Step::Drained(state.on_drained.take())
            } else if state.active {
                Step::Busy
            } else if let Some(pending) = state.pending.pop_front() {
                state.active = true;
                Step::Run(pending)
            } else {
                Step::Busy
            }
        };

        match step {
            Step::Drained(callback) => {
                if let Some(callback) = callback {
                    callback();
                }
            }
            Step::Busy => {}
            Step::Run(pending) => self.process(pending).await,
        }
    }

    async fn process(&self, pending: PendingJob) {
        let PendingJob { job, retries } = pending;

        // The ledger is consulted before the retry budget. A job blocked
        // by another process keeps circulating until that claim goes
        // stale, and only then is its retry count judged.
        if !self.inner.ledger.may_run().await {
            self.fail(job, retries, FailReason::OtherQueueActive).await;
            return;
        }

        if retries >= self.inner.config.retry_limit {
            warn!(
                kind = %job.kind(),
                item = %job.item(),
                retries,
                "job dropped after repeated failures"
            );
            self.release_and_tick().await;
            return;
        }

        let key = CacheKey::for_job(&job);
        let cached = {
            let state = self.inner.state.lock().await;
            state.cache.get(&key)
        };
        if let Some(price) = cached {
            debug!(item = %key.item, kind = %key.kind, price, "cache hit");
            job.complete(price);
            self.release_and_tick().await;
            return;
        }

        let fetched = match job.kind().operation() {
            SourceOp::HighestBuyOrder => self.inner.source.highest_buy_order(job.item()).await,
            SourceOp::LowestListing => self.inner.source.lowest_listing_price(job.item()).await,
        };

        match fetched {
            Ok(price) => {
                debug!(item = %job.item(), kind = %job.kind(), price, "price resolved");
                {
                    let mut state = self.inner.state.lock().await;
                    state.cache.insert(key, price);
                }
                job.complete(price);
                self.inner.ledger.touch().await;
                self.reschedule(self.inner.config.success_delay);
            }
            Err(reason) if reason.is_empty_market() => {
                // A market with nothing for sale answered properly, so the
                // job is finished. There is no price to cache and nothing
                // to tell the callback.
                debug!(item = %job.item(), kind = %job.kind(), %reason, "no listings for item");
                self.inner.ledger.touch().await;
                self.reschedule(self.inner.config.success_delay);
            }
            Err(reason) => self.fail(job, retries, FailReason::Source(reason)).await,
        }
    }

    async fn fail(&self, job: Job, retries: u32, reason: FailReason) {
        warn!(
            kind = %job.kind(),
            item = %job.item(),
            retries,
            %reason,
            "job failed, requeued at the tail"
        );
        {
            let mut state = self.inner.state.lock().await;
            state.pending.push_back(PendingJob {
                job,
                retries: retries + 1,
            });
        }
        self.reschedule(self.inner.config.failure_delay);
    }

    /// Clears the active flag and ticks again after the delay.
    fn reschedule(&self, delay: Duration) {
        let queue = self.clone();
        tokio::spawn(async move {
            time::sleep(delay).await;
            queue.inner.state.lock().await.active = false;
            queue.tick().await;
        });
    }

    /// Clears the active flag and ticks again right away. Used where no
    /// network call happened and the pacing delay would be wasted waiting.
    async fn release_and_tick(&self) {
        self.inner.state.lock().await.active = false;
        self.drain();
    }
}

impl fmt::Debug for PriceQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceQueue")
            .field("location", &self.inner.config.location)
            .field("source", &self.inner.source.name())
            .finish_non_exhaustive()
    }
}
