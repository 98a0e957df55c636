//! Read-through sample cache.
//!
//! `get_or_compute` never fails. A store error on read skips the write
//! entirely; a store error on write is logged. Either way the freshly computed
//! sample is returned.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use super::connection::CacheDb;
use crate::{ArtifactSample, Error};

/// TTL key/value store for samples.
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Return the live entry for `key`, or `None` on miss or expiry.
    async fn load(&self, key: &str) -> Result<Option<ArtifactSample>, Error>;

    /// Replace the entry for `key`, expiring `ttl` from now.
    async fn save(&self, key: &str, sample: &ArtifactSample, ttl: Duration) -> Result<(), Error>;

    /// Drop the entry for `key`. Returns the number of entries removed.
    async fn remove(&self, key: &str) -> Result<u64, Error>;

    /// Drop every expired entry. Returns the number of entries removed.
    async fn purge_expired(&self) -> Result<u64, Error>;
}

#[async_trait]
impl SampleStore for CacheDb {
    async fn load(&self, key: &str) -> Result<Option<ArtifactSample>, Error> {
        self.get_fresh_sample(key).await
    }

    async fn save(&self, key: &str, sample: &ArtifactSample, ttl: Duration) -> Result<(), Error> {
        self.put_sample(key, sample, ttl).await
    }

    async fn remove(&self, key: &str) -> Result<u64, Error> {
        self.purge_sample(key).await
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        self.purge_expired_samples().await
    }
}

/// Store used when the database could not be opened. Every call fails.
#[derive(Debug, Clone, Default)]
pub struct Unavailable {
    reason: String,
}

impl Unavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl SampleStore for Unavailable {
    async fn load(&self, _key: &str) -> Result<Option<ArtifactSample>, Error> {
        Err(Error::CacheUnavailable(self.reason.clone()))
    }

    async fn save(&self, _key: &str, _sample: &ArtifactSample, _ttl: Duration) -> Result<(), Error> {
        Err(Error::CacheUnavailable(self.reason.clone()))
    }

    async fn remove(&self, _key: &str) -> Result<u64, Error> {
        Err(Error::CacheUnavailable(self.reason.clone()))
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        Err(Error::CacheUnavailable(self.reason.clone()))
    }
}

/// Return the live sample for `key`, computing and storing it on a miss.
pub async fn get_or_compute<S, F, Fut>(store: &S, key: &str, ttl: Duration, compute: F) -> ArtifactSample
where
    S: SampleStore + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ArtifactSample>,
{
    get_or_compute_if(store, key, ttl, compute, |_| true).await
}

/// Like [`get_or_compute`], but a computed sample is stored only when
/// `persist` accepts it.
///
/// When the lookup itself fails the store is treated as unreachable: the
/// sample is computed and returned without a write.
pub async fn get_or_compute_if<S, F, Fut, P>(
    store: &S, key: &str, ttl: Duration, compute: F, persist: P,
) -> ArtifactSample
where
    S: SampleStore + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ArtifactSample>,
    P: FnOnce(&ArtifactSample) -> bool,
{
    match store.load(key).await {
        Ok(Some(sample)) => {
            tracing::debug!(key, items = sample.len(), "sample cache hit");
            sample
        }
        Ok(None) => {
            tracing::debug!(key, "sample cache miss");
            recompute(store, key, ttl, compute, persist).await
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "sample cache read failed; computing without caching");
            compute().await
        }
    }
}

/// Compute a sample and store it if `persist` accepts it, skipping the lookup.
pub async fn recompute<S, F, Fut, P>(store: &S, key: &str, ttl: Duration, compute: F, persist: P) -> ArtifactSample
where
    S: SampleStore + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ArtifactSample>,
    P: FnOnce(&ArtifactSample) -> bool,
{
    let sample = compute().await;

    if !persist(&sample) {
        tracing::debug!(key, items = sample.len(), "sample not persisted");
        return sample;
    }

    if let Err(e) = store.save(key, &sample, ttl).await {
        tracing::warn!(key, error = %e, "failed to cache sample");
    }

    sample
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArtifactRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_of(ids: &[u64]) -> ArtifactSample {
        let records = ids
            .iter()
            .map(|&id| ArtifactRecord::new(id).with_title("T").with_image("https://img").with_date("1600"))
            .collect();
        ArtifactSample::new(records, 20)
    }

    /// Counts invocations and hands out a different sample each time.
    struct Counter(AtomicUsize);

    impl Counter {
        fn new() -> Self {
            Self(AtomicUsize::new(0))
        }

        async fn compute(&self) -> ArtifactSample {
            let n = self.0.fetch_add(1, Ordering::SeqCst) as u64;
            sample_of(&[n * 10 + 1, n * 10 + 2])
        }

        fn calls(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_is_served_from_cache() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let counter = Counter::new();

        let first = get_or_compute(&db, "k", Duration::from_secs(60), || counter.compute()).await;
        let second = get_or_compute(&db, "k", Duration::from_secs(60), || counter.compute()).await;

        assert_eq!(first, second);
        assert_eq!(counter.calls(), 1);
    }

    #[tokio::test]
    async fn test_call_after_expiry_recomputes() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let counter = Counter::new();

        let first = get_or_compute(&db, "k", Duration::from_secs(1), || counter.compute()).await;
        tokio::time::sleep(tokio::time::Duration::from_millis(1100)).await;
        let second = get_or_compute(&db, "k", Duration::from_secs(1), || counter.compute()).await;

        assert_eq!(counter.calls(), 2);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let counter = Counter::new();

        get_or_compute(&db, "a", Duration::from_secs(60), || counter.compute()).await;
        get_or_compute(&db, "b", Duration::from_secs(60), || counter.compute()).await;

        assert_eq!(counter.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_result_is_cached() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let compute = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            ArtifactSample::default()
        };

        let first = get_or_compute(&db, "k", Duration::from_secs(60), compute).await;
        let second = get_or_compute(&db, "k", Duration::from_secs(60), compute).await;

        assert!(first.is_empty() && second.is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades_to_compute() {
        let store = Unavailable::new("disk gone");
        let counter = Counter::new();

        let first = get_or_compute(&store, "k", Duration::from_secs(60), || counter.compute()).await;
        let second = get_or_compute(&store, "k", Duration::from_secs(60), || counter.compute()).await;

        assert_eq!(first.ids(), vec![1, 2]);
        assert_eq!(second.ids(), vec![11, 12]);
        assert_eq!(counter.calls(), 2);
    }

    #[tokio::test]
    async fn test_recompute_overwrites_live_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let counter = Counter::new();

        get_or_compute(&db, "k", Duration::from_secs(60), || counter.compute()).await;
        let fresh = recompute(&db, "k", Duration::from_secs(60), || counter.compute(), |_| true).await;
        let cached = get_or_compute(&db, "k", Duration::from_secs(60), || counter.compute()).await;

        assert_eq!(fresh, cached);
        assert_eq!(counter.calls(), 2);
    }

    #[tokio::test]
    async fn test_works_through_trait_object() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let store: std::sync::Arc<dyn SampleStore> = std::sync::Arc::new(db);
        let counter = Counter::new();

        get_or_compute(store.as_ref(), "k", Duration::from_secs(60), || counter.compute()).await;
        get_or_compute(store.as_ref(), "k", Duration::from_secs(60), || counter.compute()).await;

        assert_eq!(counter.calls(), 1);

        assert_eq!(store.remove("k").await.unwrap(), 1);
        get_or_compute(store.as_ref(), "k", Duration::from_secs(60), || counter.compute()).await;
        assert_eq!(counter.calls(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_store_rejects_maintenance() {
        let store = Unavailable::new("disk gone");
        assert!(matches!(store.remove("k").await, Err(Error::CacheUnavailable(_))));
        assert!(matches!(store.purge_expired().await, Err(Error::CacheUnavailable(_))));
    }

    /// Load always fails, save succeeds and is counted.
    #[derive(Default)]
    struct ReadFails {
        saves: AtomicUsize,
    }

    #[async_trait]
    impl SampleStore for ReadFails {
        async fn load(&self, _key: &str) -> Result<Option<ArtifactSample>, Error> {
            Err(Error::CacheUnavailable("read path down".into()))
        }

        async fn save(&self, _key: &str, _sample: &ArtifactSample, _ttl: Duration) -> Result<(), Error> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn remove(&self, _key: &str) -> Result<u64, Error> {
            Ok(0)
        }

        async fn purge_expired(&self) -> Result<u64, Error> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_read_error_skips_write() {
        let store = ReadFails::default();
        let counter = Counter::new();

        let sample = get_or_compute(&store, "k", Duration::from_secs(60), || counter.compute()).await;

        assert_eq!(sample.ids(), vec![1, 2]);
        assert_eq!(counter.calls(), 1);
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_sample_is_not_stored() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let counter = Counter::new();

        let first = get_or_compute_if(&db, "k", Duration::from_secs(60), || counter.compute(), |_| false).await;
        assert_eq!(first.ids(), vec![1, 2]);
        assert!(db.get_fresh_sample("k").await.unwrap().is_none());

        recompute(&db, "k", Duration::from_secs(60), || counter.compute(), |s| s.len() > 5).await;
        assert!(db.get_fresh_sample("k").await.unwrap().is_none());
        assert_eq!(counter.calls(), 2);
    }
}
