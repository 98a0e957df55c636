//! movement_sample tool implementation.
//!
//! Returns the cached sample for a movement, aggregating it from the
//! collection on a miss.

use curio_client::Collection;
use curio_core::ArtifactSample;
use curio_core::cache::sample_cache_key;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{cached_sample, json_result};
use crate::state::AppState;

/// Input parameters for the movement_sample tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MovementSampleParams {
    /// Movement key (see movement_list). Unknown or missing keys use the default movement.
    #[serde(default)]
    pub movement: Option<String>,

    /// Force a fresh aggregation, bypassing the cache.
    #[serde(default)]
    pub force_refresh: bool,
}

/// Output from the movement_sample tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleOutput {
    /// Key of the movement that was actually sampled.
    pub movement: String,
    pub display_name: String,
    /// True when the requested key was unknown and the default was used.
    pub defaulted: bool,
    pub count: usize,
    /// Present when the sample is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub items: ArtifactSample,
}

impl SampleOutput {
    pub(crate) fn new(movement: String, display_name: String, defaulted: bool, items: ArtifactSample) -> Self {
        let message = items.is_empty().then(|| "No artifacts found.".to_string());
        Self { movement, display_name, defaulted, count: items.len(), message, items }
    }
}

/// Implementation of the movement_sample tool.
pub async fn sample_impl<C: Collection>(
    state: &AppState<C>, params: MovementSampleParams,
) -> Result<CallToolResult, McpError> {
    let requested = params.movement.as_deref().map(str::trim).filter(|k| !k.is_empty());
    let movement = state.catalog.resolve(requested);
    let defaulted = requested.is_some_and(|k| k != movement.key);
    if defaulted {
        tracing::debug!(requested, resolved = %movement.key, "unknown movement, using default");
    }

    let key = sample_cache_key(&movement.key);
    let items = cached_sample(state, &key, movement, state.config.sample_limits(), params.force_refresh).await;

    let output = SampleOutput::new(movement.key.clone(), movement.display_name.clone(), defaulted, items);
    json_result(&output)
}
