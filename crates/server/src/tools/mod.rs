//! MCP tool implementations.
//!
//! This module contains all tools exposed by the curio server. Each tool
//! returns its output as pretty-printed JSON text.

pub mod cache;
pub mod favorites;
pub mod highlights_sample;
pub mod history_sample;
pub mod movement_list;
pub mod movement_sample;

pub use cache::{CachePurgeParams, purge_impl};
pub use favorites::{
    FavoriteAddParams, FavoriteListParams, FavoriteRemoveParams, FavoriteUpdateNotesParams, add_impl,
    list_favorites_impl, remove_impl, update_notes_impl,
};
pub use highlights_sample::{HighlightsSampleParams, highlights_impl};
pub use history_sample::{HistorySampleParams, history_impl};
pub use movement_list::list_impl;
pub use movement_sample::{MovementSampleParams, sample_impl};

use curio_client::Collection;
use curio_core::cache::{get_or_compute_if, recompute};
use curio_core::{ArtifactSample, Movement, SampleLimits};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::state::AppState;

/// Serialize a tool output into a successful result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| McpError::internal_error(format!("failed to serialize output: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Serve `key` from the sample store, aggregating on a miss or when forced.
///
/// A run cut short by shutdown is returned but never written to the store.
pub(crate) async fn cached_sample<C: Collection>(
    state: &AppState<C>, key: &str, movement: &Movement, limits: SampleLimits, force_refresh: bool,
) -> ArtifactSample {
    let cancel = state.shutdown.child_token();
    let ttl = state.config.cache_ttl();
    let store = state.store.as_ref();

    let compute = {
        let cancel = &cancel;
        move || async move {
            let mut rng = StdRng::from_entropy();
            state.sampler.aggregate(movement, &limits, &mut rng, cancel).await
        }
    };
    let complete = |sample: &ArtifactSample| {
        if cancel.is_cancelled() {
            tracing::info!(key, items = sample.len(), "aggregation interrupted; not caching");
            return false;
        }
        true
    };

    if force_refresh {
        recompute(store, key, ttl, compute, complete).await
    } else {
        get_or_compute_if(store, key, ttl, compute, complete).await
    }
}

/// Test doubles shared by the tool tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use curio_client::{Collection, MetError, Sampler};
    use std::time::Duration;

    use curio_core::{
        AppConfig, ArtifactRecord, ArtifactSample, CacheDb, Error, Movement, ObjectId, SampleStore, Unavailable,
    };
    use rmcp::model::CallToolResult;
    use tokio_util::sync::CancellationToken;

    use crate::state::AppState;

    /// Collection where every listed id is displayable.
    #[derive(Default)]
    pub struct StubCollection {
        pub buckets: HashMap<u32, Vec<ObjectId>>,
        pub search_hits: Vec<ObjectId>,
        pub fetches: AtomicUsize,
    }

    impl StubCollection {
        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Collection for StubCollection {
        async fn list_by_bucket(&self, bucket_id: u32) -> Result<Vec<ObjectId>, MetError> {
            Ok(self.buckets.get(&bucket_id).cloned().unwrap_or_default())
        }

        async fn search(&self, _query: &str) -> Result<Vec<ObjectId>, MetError> {
            Ok(self.search_hits.clone())
        }

        async fn fetch_one(&self, id: ObjectId) -> Result<Option<ArtifactRecord>, MetError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(Some(
                ArtifactRecord::new(id)
                    .with_title(format!("Object {id}"))
                    .with_image(format!("https://images.example/{id}.jpg"))
                    .with_date("1650")
                    .with_culture("Dutch"),
            ))
        }
    }

    /// Sample store over an in-memory database that counts writes.
    pub struct CountingStore {
        pub db: CacheDb,
        pub saves: AtomicUsize,
    }

    impl CountingStore {
        pub async fn new() -> Self {
            Self { db: CacheDb::open_in_memory().await.unwrap(), saves: AtomicUsize::new(0) }
        }

        pub fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SampleStore for CountingStore {
        async fn load(&self, key: &str) -> Result<Option<ArtifactSample>, Error> {
            self.db.load(key).await
        }

        async fn save(&self, key: &str, sample: &ArtifactSample, ttl: Duration) -> Result<(), Error> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.db.save(key, sample, ttl).await
        }

        async fn remove(&self, key: &str) -> Result<u64, Error> {
            self.db.remove(key).await
        }

        async fn purge_expired(&self) -> Result<u64, Error> {
            self.db.purge_expired().await
        }
    }

    /// Small catalog: two movements over buckets 11 and 21, highlights on bucket 1.
    pub fn test_config() -> AppConfig {
        AppConfig {
            target_count: 5,
            max_attempts: 20,
            highlights_target: 3,
            movements: vec![
                Movement::new("baroque", "Baroque (1600-1750)", &[11], "baroque"),
                Movement::new("modern", "Modern Art (1900-1950)", &[21], "modern"),
            ],
            default_movement: "baroque".into(),
            ..Default::default()
        }
    }

    pub fn stub_collection() -> StubCollection {
        let mut buckets = HashMap::new();
        buckets.insert(1, (1..=10).collect());
        buckets.insert(11, (100..=120).collect());
        buckets.insert(21, (200..=220).collect());
        StubCollection { buckets, search_hits: (300..=330).collect(), ..Default::default() }
    }

    pub async fn state_with_db() -> AppState<StubCollection> {
        let db = CacheDb::open_in_memory().await.unwrap();
        build_state(Arc::new(db.clone()), Some(db))
    }

    pub fn state_without_db() -> AppState<StubCollection> {
        build_state(Arc::new(Unavailable::new("no database")), None)
    }

    pub fn build_state(store: Arc<dyn SampleStore>, favorites: Option<CacheDb>) -> AppState<StubCollection> {
        let config = test_config();
        AppState {
            catalog: config.catalog().unwrap(),
            config,
            store,
            favorites,
            sampler: Sampler::new(stub_collection()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Decode the JSON text payload of a tool result.
    pub fn output<T: serde::de::DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
