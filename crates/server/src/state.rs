//! Process-wide state shared by every tool call.

use std::sync::Arc;

use curio_client::{Collection, MetClient, MetConfig, Sampler};
use curio_core::{AppConfig, CacheDb, Catalog, Error, SampleStore, Unavailable};
use tokio_util::sync::CancellationToken;

/// Everything a tool needs: configuration, the movement catalog, the sample
/// store, and the sampler over the upstream collection.
pub struct AppState<C = MetClient> {
    pub config: AppConfig,
    pub catalog: Catalog,
    pub store: Arc<dyn SampleStore>,
    /// `None` when the database could not be opened.
    pub favorites: Option<CacheDb>,
    pub sampler: Sampler<C>,
    /// Fired on interrupt; in-flight aggregations stop and return what they have.
    pub shutdown: CancellationToken,
}

impl AppState<MetClient> {
    /// Build the state for a loaded configuration.
    ///
    /// A database that fails to open is not fatal: samples are then computed
    /// on every request and the favorites tools report the cache as unavailable.
    pub async fn open(config: AppConfig, shutdown: CancellationToken) -> anyhow::Result<Self> {
        let catalog = config.catalog()?;
        let client = MetClient::new(MetConfig::from(&config))?;

        let (store, favorites): (Arc<dyn SampleStore>, Option<CacheDb>) = match CacheDb::open(&config.db_path).await {
            Ok(db) => (Arc::new(db.clone()), Some(db)),
            Err(e) => {
                tracing::warn!(
                    db_path = %config.db_path.display(),
                    error = %e,
                    "cache database unavailable; samples will not be cached"
                );
                (Arc::new(Unavailable::new(e.to_string())), None)
            }
        };

        Ok(Self { config, catalog, store, favorites, sampler: Sampler::new(client), shutdown })
    }
}

impl<C: Collection> AppState<C> {
    /// The favorites database, or `CACHE_UNAVAILABLE`.
    pub fn favorites(&self) -> Result<&CacheDb, Error> {
        self.favorites
            .as_ref()
            .ok_or_else(|| Error::CacheUnavailable("favorites require the cache database".into()))
    }
}
