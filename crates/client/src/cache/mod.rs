//! Query/mutation orchestration: a stale-while-revalidate cache keyed by
//! [`QueryKey`].
//!
//! The cache is the only writer of its entries; consumers read through
//! [`QueryCache::fetch`] and trigger [`QueryCache::mutate`], never touching
//! entries directly. Guarantees:
//!
//! - at most one entry per key, at most one in-flight fetch per key —
//!   concurrent callers of the same key join the same flight and all see its
//!   result;
//! - per-key generation counters discard completions that lost a race to a
//!   newer fetch, so an old slow response never overwrites fresher data;
//! - a fetch that raced an invalidation lands already-stale;
//! - failed fetches leave previously cached data in place;
//! - mutations apply their invalidation plan only after the mutation itself
//!   settles, and never wait for the subsequent refetch.

mod key;
mod retry;

pub use key::QueryKey;
pub use retry::RetryPolicy;

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::time::Instant;
use tracing::debug;

use crate::error::ApiError;

/// Per-query behavior knobs.
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    /// A disabled query never fetches and yields no data.
    pub enabled: bool,
    /// How long a successful result counts as fresh. Zero means a read
    /// always revalidates.
    pub stale_time: Duration,
    /// Retry policy applied before an error becomes terminal.
    pub retry: RetryPolicy,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            stale_time: Duration::ZERO,
            retry: RetryPolicy::default(),
        }
    }
}

impl QueryOptions {
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub const fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    #[must_use]
    pub const fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub const fn no_retry(self) -> Self {
        self.retry(RetryPolicy::none())
    }
}

/// What a mutation does to the cache once it settles successfully.
#[derive(Debug, Clone, Default)]
pub struct MutationPlan {
    invalidates: Vec<QueryKey>,
    removes: Vec<QueryKey>,
}

impl MutationPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every entry under `prefix` stale; the next read revalidates.
    #[must_use]
    pub fn invalidate(mut self, prefix: QueryKey) -> Self {
        self.invalidates.push(prefix);
        self
    }

    /// Drop every entry under `prefix` outright (deletions, where even
    /// stale data must not be served).
    #[must_use]
    pub fn remove(mut self, prefix: QueryKey) -> Self {
        self.removes.push(prefix);
        self
    }
}

/// Change notifications for subscribed readers.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A fetch landed new data for the key.
    Updated(QueryKey),
    /// Entries under the prefix were marked stale.
    Invalidated(QueryKey),
    /// The entry was dropped.
    Removed(QueryKey),
    /// The whole cache was reset.
    Cleared,
}

/// Result of an in-flight fetch, fanned out to every de-duplicated waiter.
#[derive(Clone)]
enum FlightState {
    Pending,
    Done(Result<Arc<dyn Any + Send + Sync>, ApiError>),
}

struct Inflight {
    generation: u64,
    rx: watch::Receiver<FlightState>,
}

struct CacheEntry {
    data: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
    stale: bool,
    generation: u64,
}

impl CacheEntry {
    fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.data).downcast::<T>().ok()
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, CacheEntry>,
    inflight: HashMap<QueryKey, Inflight>,
    /// Monotonic fetch counter; each started fetch takes the next value.
    seq: u64,
    /// Completions with a generation below the barrier are discarded
    /// entirely (the key was removed or the cache cleared since they
    /// started).
    barrier: HashMap<QueryKey, u64>,
    /// Completions with a generation below this landed after an
    /// invalidation and are stored already-stale.
    invalid_after: HashMap<QueryKey, u64>,
}

impl CacheState {
    /// Apply a completed fetch, honoring the out-of-order and removal
    /// guards. Returns whether the entry was written.
    fn apply_fetch(
        &mut self,
        key: &QueryKey,
        generation: u64,
        data: Arc<dyn Any + Send + Sync>,
    ) -> bool {
        if generation < self.barrier.get(key).copied().unwrap_or(0) {
            debug!(key = %key, generation, "discarding fetch result for removed key");
            return false;
        }
        if self
            .entries
            .get(key)
            .is_some_and(|entry| entry.generation > generation)
        {
            debug!(key = %key, generation, "discarding stale out-of-order fetch result");
            return false;
        }
        let stale = generation < self.invalid_after.get(key).copied().unwrap_or(0);
        self.entries.insert(
            key.clone(),
            CacheEntry {
                data,
                fetched_at: Instant::now(),
                stale,
                generation,
            },
        );
        true
    }
}

/// The shared client cache. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    state: Mutex<CacheState>,
    events: broadcast::Sender<CacheEvent>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(CacheInner {
                state: Mutex::new(CacheState::default()),
                events,
            }),
        }
    }

    /// Observe cache changes. Receivers that fall behind miss events, not
    /// data; a re-read always sees current state.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Fetch a resource through the cache.
    ///
    /// Returns `Ok(None)` without network access when the query is
    /// disabled. A fresh cached value is returned directly; otherwise the
    /// caller either starts the key's single in-flight fetch or joins the
    /// one already running.
    ///
    /// # Errors
    ///
    /// The terminal error of the flight, after `options.retry` is
    /// exhausted. Previously cached data is left untouched on failure.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetch_fn: F,
    ) -> Result<Option<Arc<T>>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send,
        Fut: Future<Output = Result<T, ApiError>> + Send,
    {
        if !options.enabled {
            return Ok(None);
        }

        let (generation, tx) = {
            let mut state = self.inner.state.lock().await;

            if let Some(entry) = state.entries.get(&key)
                && !entry.stale
                && entry.fetched_at.elapsed() < options.stale_time
                && let Some(data) = entry.downcast::<T>()
            {
                return Ok(Some(data));
            }

            if let Some(flight) = state.inflight.get(&key) {
                if flight.rx.has_changed().is_ok() {
                    let rx = flight.rx.clone();
                    drop(state);
                    return Self::await_flight::<T>(rx).await.map(Some);
                }
                // The leader was cancelled before settling; take over.
                state.inflight.remove(&key);
            }

            self.begin_flight(&mut state, &key)
        };

        self.lead_flight(&key, generation, &options, tx, fetch_fn)
            .await
            .map(Some)
    }

    /// Like [`Self::fetch`], but a `NotFound` from the fetch function is a
    /// normal, cacheable empty result rather than an error. Used for
    /// lookups where absence is data, e.g. "has this user rated this store
    /// yet".
    ///
    /// Returns `Ok(None)` when the lookup found nothing (or the query is
    /// disabled); every other failure is a real error.
    ///
    /// # Errors
    ///
    /// Any terminal error other than not-found.
    pub async fn fetch_optional<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetch_fn: F,
    ) -> Result<Option<Arc<T>>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, ApiError>> + Send,
    {
        let stored = self
            .fetch::<OptionalEntry<T>, _, _>(key, options, || {
                let fut = fetch_fn();
                async move {
                    match fut.await {
                        Ok(value) => Ok(OptionalEntry(Some(Arc::new(value)))),
                        Err(error) if error.is_not_found() => Ok(OptionalEntry(None)),
                        Err(error) => Err(error),
                    }
                }
            })
            .await?;

        Ok(stored.and_then(|entry| entry.0.clone()))
    }

    /// Start a fresh fetch for the key regardless of cached freshness,
    /// superseding any flight already running (whose late result will then
    /// be discarded by the generation guard).
    ///
    /// # Errors
    ///
    /// The terminal error of the new flight.
    pub async fn refetch<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetch_fn: F,
    ) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send,
        Fut: Future<Output = Result<T, ApiError>> + Send,
    {
        let (generation, tx) = {
            let mut state = self.inner.state.lock().await;
            self.begin_flight(&mut state, &key)
        };

        self.lead_flight(&key, generation, &options, tx, fetch_fn)
            .await
    }

    /// Run a mutation, applying its plan only after it settles
    /// successfully. A failed mutation leaves the cache untouched.
    ///
    /// # Errors
    ///
    /// The mutation's own error, unmodified.
    pub async fn mutate<T, Fut>(&self, plan: MutationPlan, op: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let value = op.await?;
        for prefix in &plan.invalidates {
            self.invalidate(prefix).await;
        }
        for prefix in &plan.removes {
            self.remove(prefix).await;
        }
        Ok(value)
    }

    /// Mark every entry under `prefix` stale. No eager refetch happens;
    /// the next read of a matching key revalidates. A prefix matching
    /// nothing is a no-op.
    pub async fn invalidate(&self, prefix: &QueryKey) {
        let mut state = self.inner.state.lock().await;
        let threshold = state.seq + 1;
        let mut matched = false;

        for (key, entry) in &mut state.entries {
            if key.starts_with(prefix) {
                entry.stale = true;
                matched = true;
            }
        }
        let inflight_keys: Vec<QueryKey> = state
            .inflight
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        for key in inflight_keys {
            state.invalid_after.insert(key, threshold);
            matched = true;
        }

        if matched {
            let _ = self.inner.events.send(CacheEvent::Invalidated(prefix.clone()));
        }
    }

    /// Drop every entry under `prefix`. In-flight fetches for dropped keys
    /// are discarded when they complete, so removed data cannot
    /// resurrect.
    pub async fn remove(&self, prefix: &QueryKey) {
        let mut state = self.inner.state.lock().await;
        let threshold = state.seq + 1;

        let removed: Vec<QueryKey> = state
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        for key in &removed {
            state.entries.remove(key);
            state.barrier.insert(key.clone(), threshold);
        }
        let inflight_keys: Vec<QueryKey> = state
            .inflight
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        for key in inflight_keys {
            state.barrier.insert(key, threshold);
        }

        drop(state);
        for key in removed {
            let _ = self.inner.events.send(CacheEvent::Removed(key));
        }
    }

    /// Full reset. Paired with clearing the session so no per-user data
    /// leaks into the next login.
    pub async fn clear(&self) {
        let mut state = self.inner.state.lock().await;
        let threshold = state.seq + 1;

        state.entries.clear();
        state.invalid_after.clear();
        let inflight_keys: Vec<QueryKey> = state.inflight.keys().cloned().collect();
        state.barrier.clear();
        for key in inflight_keys {
            state.barrier.insert(key, threshold);
        }

        drop(state);
        let _ = self.inner.events.send(CacheEvent::Cleared);
    }

    /// Read-only view of whatever is cached for the key, fresh or stale.
    /// Never fetches. Lets the UI keep showing last-known-good data next
    /// to an error indicator.
    pub async fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let state = self.inner.state.lock().await;
        state.entries.get(key).and_then(CacheEntry::downcast)
    }

    fn begin_flight(
        &self,
        state: &mut CacheState,
        key: &QueryKey,
    ) -> (u64, watch::Sender<FlightState>) {
        state.seq += 1;
        let generation = state.seq;
        let (tx, rx) = watch::channel(FlightState::Pending);
        state.inflight.insert(key.clone(), Inflight { generation, rx });
        (generation, tx)
    }

    /// Drive the fetch we lead: retry loop, settlement, waiter fan-out.
    async fn lead_flight<T, F, Fut>(
        &self,
        key: &QueryKey,
        generation: u64,
        options: &QueryOptions,
        tx: watch::Sender<FlightState>,
        fetch_fn: F,
    ) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send,
        Fut: Future<Output = Result<T, ApiError>> + Send,
    {
        let mut attempt = 0u32;
        let result = loop {
            match fetch_fn().await {
                Ok(value) => break Ok(Arc::new(value)),
                Err(error) => {
                    if options.retry.should_retry(attempt, &error) {
                        attempt += 1;
                        debug!(key = %key, attempt, error = %error, "retrying query");
                        tokio::time::sleep(options.retry.delay).await;
                    } else {
                        break Err(error);
                    }
                }
            }
        };

        let mut state = self.inner.state.lock().await;
        if state
            .inflight
            .get(key)
            .is_some_and(|flight| flight.generation == generation)
        {
            state.inflight.remove(key);
        }

        let (out, flight_state) = match result {
            Ok(data) => {
                let erased: Arc<dyn Any + Send + Sync> = data.clone();
                let applied = state.apply_fetch(key, generation, Arc::clone(&erased));
                drop(state);
                if applied {
                    let _ = self.inner.events.send(CacheEvent::Updated(key.clone()));
                }
                (Ok(data), FlightState::Done(Ok(erased)))
            }
            Err(error) => {
                // Prior cached data stays in place on failure.
                drop(state);
                (Err(error.clone()), FlightState::Done(Err(error)))
            }
        };

        let _ = tx.send(flight_state);
        out
    }

    async fn await_flight<T: Send + Sync + 'static>(
        mut rx: watch::Receiver<FlightState>,
    ) -> Result<Arc<T>, ApiError> {
        loop {
            let flight = rx.borrow().clone();
            if let FlightState::Done(result) = flight {
                return result?.downcast::<T>().map_err(|_| {
                    ApiError::Internal("cache type mismatch for shared fetch".to_string())
                });
            }
            if rx.changed().await.is_err() {
                return Err(ApiError::Internal("fetch interrupted".to_string()));
            }
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage wrapper that lets [`QueryCache::fetch_optional`] cache "nothing
/// here" as a first-class value.
struct OptionalEntry<T>(Option<Arc<T>>);

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Notify;

    fn key(segments: &[&str]) -> QueryKey {
        QueryKey::new(segments.iter().copied())
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_hit_skips_network() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::default().stale_time(Duration::from_secs(60));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let data = cache
                .fetch(key(&["public", "stores"]), options, move || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, ApiError>(vec!["corner bakery".to_string()])
                    }
                })
                .await
                .expect("fetch")
                .expect("enabled");
            assert_eq!(data.first().map(String::as_str), Some("corner bakery"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_revalidates() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::default().stale_time(Duration::from_secs(60));

        let fetch = |cache: &QueryCache, calls: &Arc<AtomicUsize>| {
            let cache = cache.clone();
            let calls = Arc::clone(calls);
            async move {
                cache
                    .fetch(key(&["admin", "dashboard"]), options, move || {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, ApiError>(7_u64)
                        }
                    })
                    .await
            }
        };

        fetch(&cache, &calls).await.expect("first");
        tokio::time::advance(Duration::from_secs(61)).await;
        fetch(&cache, &calls).await.expect("second");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_query_never_fetches() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = Arc::clone(&calls);

        let result: Option<Arc<u64>> = cache
            .fetch(
                key(&["auth", "me"]),
                QueryOptions::default().enabled(false),
                move || {
                    let calls = Arc::clone(&calls_in);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, ApiError>(1_u64)
                    }
                },
            )
            .await
            .expect("fetch");

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_fetches_deduplicate() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::default().stale_time(Duration::from_secs(60));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .fetch(key(&["public", "stores"]), options, move || {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Ok::<_, ApiError>("page one".to_string())
                        }
                    })
                    .await
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(
                handle
                    .await
                    .expect("join")
                    .expect("fetch")
                    .expect("enabled"),
            );
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for pair in results.windows(2) {
            assert!(Arc::ptr_eq(&pair[0], &pair[1]));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deduplicated_callers_share_terminal_error() {
        let cache = QueryCache::new();
        let options = QueryOptions::default().no_retry();

        let mut handles = Vec::new();
        for _ in 0..3 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .fetch::<String, _, _>(key(&["owner", "dashboard"]), options, || async {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Err(ApiError::Api {
                            status: 500,
                            message: "boom".to_string(),
                        })
                    })
                    .await
            }));
        }

        for handle in handles {
            let result = handle.await.expect("join");
            assert_eq!(
                result,
                Err(ApiError::Api {
                    status: 500,
                    message: "boom".to_string()
                })
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_policy_bounds_attempts() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = Arc::clone(&calls);

        // Fails twice with a retryable error, then succeeds.
        let result = cache
            .fetch(
                key(&["public", "stores"]),
                QueryOptions::default().retry(RetryPolicy::new(3, Duration::from_millis(100))),
                move || {
                    let calls = Arc::clone(&calls_in);
                    async move {
                        let attempt = calls.fetch_add(1, Ordering::SeqCst);
                        if attempt < 2 {
                            Err(ApiError::Transport("connection reset".to_string()))
                        } else {
                            Ok("recovered".to_string())
                        }
                    }
                },
            )
            .await
            .expect("fetch")
            .expect("enabled");

        assert_eq!(*result, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_errors_are_not_retried() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = Arc::clone(&calls);

        let result: Result<Option<Arc<String>>, ApiError> = cache
            .fetch(
                key(&["admin", "users"]),
                QueryOptions::default().retry(RetryPolicy::new(3, Duration::from_millis(100))),
                move || {
                    let calls = Arc::clone(&calls_in);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err(ApiError::Api {
                            status: 403,
                            message: "forbidden".to_string(),
                        })
                    }
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_revalidation_keeps_cached_data() {
        let cache = QueryCache::new();
        let k = key(&["public", "store", "3"]);

        let first: Option<Arc<String>> = cache
            .fetch(k.clone(), QueryOptions::default().no_retry(), || async {
                Ok("last known good".to_string())
            })
            .await
            .expect("first fetch");
        assert!(first.is_some());

        cache.invalidate(&key(&["public", "store"])).await;

        let second: Result<Option<Arc<String>>, ApiError> = cache
            .fetch(k.clone(), QueryOptions::default().no_retry(), || async {
                Err(ApiError::Transport("offline".to_string()))
            })
            .await;
        assert!(second.is_err());

        // The UI can still show the stale value alongside the error.
        let peeked: Option<Arc<String>> = cache.peek(&k).await;
        assert_eq!(peeked.as_deref().map(String::as_str), Some("last known good"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_prefix_forces_refetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::default().stale_time(Duration::from_secs(300));

        let fetch = |k: QueryKey| {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            async move {
                cache
                    .fetch(k, options, move || {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, ApiError>(0_u8)
                        }
                    })
                    .await
                    .expect("fetch")
            }
        };

        fetch(key(&["public", "stores", "page1"])).await;
        fetch(key(&["public", "stores", "page2"])).await;
        fetch(key(&["owner", "dashboard"])).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        cache.invalidate(&key(&["public", "stores"])).await;

        fetch(key(&["public", "stores", "page1"])).await;
        fetch(key(&["public", "stores", "page2"])).await;
        fetch(key(&["owner", "dashboard"])).await;
        // Both store pages refetched; the unrelated dashboard did not.
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutation_applies_plan_only_on_success() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::default().stale_time(Duration::from_secs(300));

        let fetch = || {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            async move {
                cache
                    .fetch(key(&["public", "stores"]), options, move || {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, ApiError>(())
                        }
                    })
                    .await
                    .expect("fetch")
            }
        };

        fetch().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Failed mutation: cache untouched, error propagated.
        let failed: Result<(), ApiError> = cache
            .mutate(
                MutationPlan::new().invalidate(key(&["public", "stores"])),
                async {
                    Err(ApiError::Api {
                        status: 400,
                        message: "Rating must be between 1 and 5".to_string(),
                    })
                },
            )
            .await;
        assert!(failed.is_err());
        fetch().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Successful mutation: next read revalidates.
        cache
            .mutate(
                MutationPlan::new().invalidate(key(&["public", "stores"])),
                async { Ok::<_, ApiError>(()) },
            )
            .await
            .expect("mutation");
        fetch().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_drops_entry_entirely() {
        let cache = QueryCache::new();
        let k = key(&["user", "store-rating", "3"]);
        let options = QueryOptions::default().stale_time(Duration::from_secs(300));

        let stored: Option<Arc<String>> = cache
            .fetch(k.clone(), options, || async { Ok("4 stars".to_string()) })
            .await
            .expect("fetch");
        assert!(stored.is_some());

        cache.remove(&k).await;
        let peeked: Option<Arc<String>> = cache.peek(&k).await;
        assert!(peeked.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_cached_as_empty() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::default()
            .stale_time(Duration::from_secs(300))
            .no_retry();

        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            let rating: Option<Arc<String>> = cache
                .fetch_optional(key(&["user", "store-rating", "9"]), options, move || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err(ApiError::NotFound("no rating".to_string()))
                    }
                })
                .await
                .expect("lookup");
            assert!(rating.is_none());
        }

        // "No rating" was cached like any other value.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_optional_distinguishes_real_errors() {
        let cache = QueryCache::new();

        let result: Result<Option<Arc<String>>, ApiError> = cache
            .fetch_optional(
                key(&["user", "store-rating", "9"]),
                QueryOptions::default().no_retry(),
                || async {
                    Err(ApiError::Api {
                        status: 500,
                        message: "database unavailable".to_string(),
                    })
                },
            )
            .await;

        assert!(matches!(result, Err(ApiError::Api { status: 500, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_completion_is_discarded() {
        let cache = QueryCache::new();
        let k = key(&["public", "store", "3"]);
        let release_old = Arc::new(Notify::new());

        // Old fetch: starts first, finishes last.
        let old = {
            let cache = cache.clone();
            let k = k.clone();
            let release = Arc::clone(&release_old);
            tokio::spawn(async move {
                cache
                    .fetch(k, QueryOptions::default(), move || {
                        let release = Arc::clone(&release);
                        async move {
                            release.notified().await;
                            Ok("old average 3.0".to_string())
                        }
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;

        // Newer fetch supersedes the flight and completes immediately.
        let newer: Arc<String> = cache
            .refetch(k.clone(), QueryOptions::default(), || async {
                Ok("new average 4.0".to_string())
            })
            .await
            .expect("refetch");
        assert_eq!(*newer, "new average 4.0");

        // Now let the old fetch complete; its result must not win.
        release_old.notify_waiters();
        let old_result = old.await.expect("join").expect("fetch").expect("data");
        assert_eq!(*old_result, "old average 3.0");

        let cached: Option<Arc<String>> = cache.peek(&k).await;
        assert_eq!(
            cached.as_deref().map(String::as_str),
            Some("new average 4.0")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_racing_invalidation_lands_stale() {
        let cache = QueryCache::new();
        let k = key(&["public", "stores"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let options = QueryOptions::default().stale_time(Duration::from_secs(300));

        let flight = {
            let cache = cache.clone();
            let k = k.clone();
            let gate = Arc::clone(&gate);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .fetch(k, options, move || {
                        let gate = Arc::clone(&gate);
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            gate.notified().await;
                            Ok("pre-invalidation listing".to_string())
                        }
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;

        // A mutation settles while the fetch is still in flight.
        cache.invalidate(&k).await;
        gate.notify_waiters();
        flight.await.expect("join").expect("fetch");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // The landed entry is already stale, so the next read revalidates.
        let second: Option<Arc<String>> = cache
            .fetch(k, options, {
                let calls = Arc::clone(&calls);
                move || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok("post-invalidation listing".to_string())
                    }
                }
            })
            .await
            .expect("fetch");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            second.as_deref().map(String::as_str),
            Some("post-invalidation listing")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_resets_everything() {
        let cache = QueryCache::new();
        let options = QueryOptions::default().stale_time(Duration::from_secs(300));
        let mut events = cache.subscribe();

        let _: Option<Arc<String>> = cache
            .fetch(key(&["auth", "me"]), options, || async {
                Ok("alice's profile".to_string())
            })
            .await
            .expect("fetch");

        cache.clear().await;

        let peeked: Option<Arc<String>> = cache.peek(&key(&["auth", "me"])).await;
        assert!(peeked.is_none());

        // Updated then Cleared.
        assert!(matches!(events.recv().await, Ok(CacheEvent::Updated(_))));
        assert!(matches!(events.recv().await, Ok(CacheEvent::Cleared)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_updates_and_invalidations() {
        let cache = QueryCache::new();
        let mut events = cache.subscribe();
        let k = key(&["admin", "users"]);

        let _: Option<Arc<u8>> = cache
            .fetch(k.clone(), QueryOptions::default(), || async { Ok(1_u8) })
            .await
            .expect("fetch");
        cache.invalidate(&k).await;

        match events.recv().await {
            Ok(CacheEvent::Updated(updated)) => assert_eq!(updated, k),
            other => panic!("expected update event, got {other:?}"),
        }
        match events.recv().await {
            Ok(CacheEvent::Invalidated(prefix)) => assert_eq!(prefix, k),
            other => panic!("expected invalidation event, got {other:?}"),
        }
    }
}
