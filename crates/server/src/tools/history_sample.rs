//! history_sample tool implementation.
//!
//! A reel of ancient works built purely from a collection search. Only the
//! leading hits are considered, in shuffled order.

use curio_client::Collection;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::movement_sample::SampleOutput;
use super::{cached_sample, json_result};
use crate::state::AppState;

/// Cache key for the history reel.
pub const HISTORY_KEY: &str = "history";

/// Input parameters for the history_sample tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HistorySampleParams {
    /// Force a fresh search, bypassing the cache.
    #[serde(default)]
    pub force_refresh: bool,
}

/// Implementation of the history_sample tool.
pub async fn history_impl<C: Collection>(
    state: &AppState<C>, params: HistorySampleParams,
) -> Result<CallToolResult, McpError> {
    let movement = state.config.history_movement();
    let limits = state.config.history_limits();
    let items = cached_sample(state, HISTORY_KEY, &movement, limits, params.force_refresh).await;

    json_result(&SampleOutput::new(movement.key, movement.display_name, false, items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{output, state_with_db};
    use curio_core::SampleStore;

    #[tokio::test]
    async fn test_history_draws_from_leading_search_hits() {
        let state = state_with_db().await;
        let result = history_impl(&state, HistorySampleParams::default()).await.unwrap();
        let sample: SampleOutput = output(&result);

        assert_eq!(sample.movement, "history");
        assert_eq!(sample.count, 12);
        assert!(sample.items.iter().all(|r| (300..=311).contains(&r.id)));
        assert_eq!(state.sampler.collection().fetch_count(), 12);
        assert!(state.store.load(HISTORY_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_history_is_cached_separately() {
        let state = state_with_db().await;

        history_impl(&state, HistorySampleParams::default()).await.unwrap();
        let fetched = state.sampler.collection().fetch_count();
        let again: SampleOutput = output(&history_impl(&state, HistorySampleParams::default()).await.unwrap());

        assert_eq!(again.count, 12);
        assert_eq!(state.sampler.collection().fetch_count(), fetched);
    }

    #[tokio::test]
    async fn test_history_short_window_comes_up_short() {
        let mut state = state_with_db().await;
        state.config.history_window = 4;

        let sample: SampleOutput = output(&history_impl(&state, HistorySampleParams::default()).await.unwrap());

        assert_eq!(sample.count, 4);
        assert!(sample.items.iter().all(|r| (300..=303).contains(&r.id)));
    }
}
