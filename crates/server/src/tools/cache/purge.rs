//! cache_purge tool implementation.
//!
//! Purges sample cache entries that have expired, or the entry for one
//! movement so its next request re-aggregates.

use curio_client::Collection;
use curio_core::Error;
use curio_core::cache::sample_cache_key;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::highlights_sample::HIGHLIGHTS_KEY;
use crate::tools::history_sample::HISTORY_KEY;
use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Purge every expired entry.
    #[serde(default)]
    pub expired: bool,

    /// Purge the entry for this movement key, "highlights", or "history".
    #[serde(default)]
    pub movement: Option<String>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl<C: Collection>(
    state: &AppState<C>, params: CachePurgeParams,
) -> Result<CallToolResult, McpError> {
    if !params.expired && params.movement.is_none() {
        return Err(Error::InvalidInput("at least one of expired or movement must be specified".into()).into());
    }

    let mut deleted_total = 0u64;

    if params.expired {
        deleted_total += state.store.purge_expired().await?;
    }

    if let Some(movement) = params.movement {
        let movement = movement.trim();
        let key = if movement == HIGHLIGHTS_KEY || movement == HISTORY_KEY {
            movement.to_string()
        } else if state.catalog.get(movement).is_some() {
            sample_cache_key(movement)
        } else {
            return Err(Error::InvalidInput(format!("unknown movement: {movement}")).into());
        };
        deleted_total += state.store.remove(&key).await?;
    }

    tracing::info!(deleted = deleted_total, "purged sample cache");
    json_result(&CachePurgeOutput { deleted: deleted_total })
}
