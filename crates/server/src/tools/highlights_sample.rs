//! highlights_sample tool implementation.
//!
//! A small reel drawn from a single department with no search fallback.

use curio_client::Collection;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::movement_sample::SampleOutput;
use super::{cached_sample, json_result};
use crate::state::AppState;

/// Cache key for the highlights reel.
pub const HIGHLIGHTS_KEY: &str = "highlights";

/// Input parameters for the highlights_sample tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HighlightsSampleParams {
    /// Force a fresh aggregation, bypassing the cache.
    #[serde(default)]
    pub force_refresh: bool,
}

/// Implementation of the highlights_sample tool.
pub async fn highlights_impl<C: Collection>(
    state: &AppState<C>, params: HighlightsSampleParams,
) -> Result<CallToolResult, McpError> {
    let movement = state.config.highlights_movement();
    let limits = state.config.highlights_limits();
    let items = cached_sample(state, HIGHLIGHTS_KEY, &movement, limits, params.force_refresh).await;

    json_result(&SampleOutput::new(movement.key, movement.display_name, false, items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output, state_with_db};
    use curio_core::SampleStore;

    #[tokio::test]
    async fn test_highlights_use_own_bucket_and_target() {
        let state = state_with_db().await;
        let result = highlights_impl(&state, HighlightsSampleParams::default()).await.unwrap();
        let sample: SampleOutput = output(&result);

        assert_eq!(sample.movement, "highlights");
        assert_eq!(sample.count, 3);
        assert!(sample.items.iter().all(|r| (1..=10).contains(&r.id)));
        assert!(state.store.load(HIGHLIGHTS_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_highlights_missing_bucket_is_empty() {
        let mut state = state_with_db().await;
        state.config.highlights_bucket = 99;

        let result = highlights_impl(&state, HighlightsSampleParams::default()).await.unwrap();
        let sample: SampleOutput = output(&result);

        assert_eq!(sample.count, 0);
        assert_eq!(state.sampler.collection().fetch_count(), 0);
    }
}
