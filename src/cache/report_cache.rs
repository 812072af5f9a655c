use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::auth::RowScope;
use crate::reporting::ReportSummary;
use crate::types::DateRange;

const DEFAULT_CAPACITY: u64 = 1024;
const DEFAULT_TIME_TO_LIVE: Duration = Duration::from_secs(300);
const EVENT_BUFFER: usize = 64;

/// Identity of a report: who may see which rows, over which window.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ReportKey {
    pub scope: RowScope,
    pub range: Option<DateRange>
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CacheEvent {
    Invalidated(ReportKey),
    InvalidatedAll
}

/// A report together with the generation that was current when its
/// computation started.
#[derive(Clone)]
struct CachedReport {
    generation: u64,
    report: Arc<ReportSummary>
}

/// Read-through cache of computed reports with explicit invalidation.
///
/// Every [`invalidate_all`](ReportCache::invalidate_all) starts a new
/// generation. A report whose computation started in an older generation may
/// have read records from before the change, so it is never served again,
/// even when moka stores it after the invalidation ran.
///
/// Views that render a report can [`subscribe`](ReportCache::subscribe) and
/// recompute when they see an event for their key.
pub struct ReportCache {
    reports: Cache<ReportKey, CachedReport>,
    generation: AtomicU64,
    events: broadcast::Sender<CacheEvent>,
    capacity: u64,
    time_to_live: Duration
}

impl ReportCache {
    pub fn new(capacity: u64, time_to_live: Duration) -> Self {
        let reports = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(time_to_live)
            .build();

        let (events, _) = broadcast::channel(EVENT_BUFFER);

        Self {
            reports,
            generation: AtomicU64::new(0),
            events,
            capacity,
            time_to_live
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn time_to_live(&self) -> Duration {
        self.time_to_live
    }

    /// Returns the cached report for `key` if it was computed in the current
    /// generation. An outdated entry is dropped on sight.
    pub async fn get(&self, key: &ReportKey) -> Option<Arc<ReportSummary>> {
        let generation = self.generation.load(Ordering::SeqCst);

        match self.reports.get(key).await {
            Some(cached) if cached.generation >= generation => {
                trace!("Report cache hit for {key:?}");
                Some(cached.report)
            }
            Some(_) => {
                debug!("Dropping report for {key:?} computed before the last invalidation");
                self.invalidate(key).await;
                None
            }
            None => {
                trace!("Report cache miss for {key:?}");
                None
            }
        }
    }

    /// Returns the cached report or computes, stores and returns it.
    ///
    /// Concurrent callers for the same key share a single computation, unless
    /// that computation started before the last invalidation: then the caller
    /// computes again so it never sees records older than its own request.
    pub async fn get_or_compute<F>(&self, key: ReportKey, compute: F) -> Arc<ReportSummary>
    where
        F: Fn() -> ReportSummary,
    {
        let requested_in = self.generation.load(Ordering::SeqCst);

        if let Some(report) = self.get(&key).await {
            return report;
        }

        let shared = self.reports.get_with(key.clone(), async {
            debug!("Computing report for cache miss");
            self.stamp(&compute)
        }).await;

        if shared.generation >= requested_in {
            return shared.report;
        }

        debug!("Shared computation for {key:?} predates the last invalidation, recomputing");

        let fresh = self.stamp(&compute);
        self.reports.insert(key, fresh.clone()).await;

        fresh.report
    }

    /// Drops one entry. Computations already in flight are only fenced by
    /// [`invalidate_all`](ReportCache::invalidate_all).
    pub async fn invalidate(&self, key: &ReportKey) {
        self.reports.invalidate(key).await;
        self.publish(CacheEvent::Invalidated(key.clone()));
    }

    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.reports.invalidate_all();
        self.publish(CacheEvent::InvalidatedAll);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    fn stamp<F>(&self, compute: &F) -> CachedReport
    where
        F: Fn() -> ReportSummary,
    {
        //NOTE: Read before the records so a concurrent invalidate_all is never missed
        let generation = self.generation.load(Ordering::SeqCst);

        CachedReport {
            generation,
            report: Arc::new(compute())
        }
    }

    fn publish(&self, event: CacheEvent) {
        if self.events.send(event).is_err() {
            trace!("No cache subscribers to notify");
        }
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TIME_TO_LIVE)
    }
}
