//! Favorites tools: add, list, annotate, and remove saved artifacts.
//!
//! The caller supplies the user id; ownership is enforced per favorite.

use curio_client::Collection;
use curio_core::{Favorite, FavoriteOutcome, NewFavorite};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the favorite_add tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FavoriteAddParams {
    pub user_id: String,
    /// Upstream object id.
    pub artifact_id: String,
    /// Title shown for the favorite (max 255 chars).
    pub item_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub culture: Option<String>,
    #[serde(default)]
    pub object_date: Option<String>,
}

/// Parameters for the favorite_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FavoriteListParams {
    pub user_id: String,
}

/// Parameters for the favorite_update_notes tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FavoriteUpdateNotesParams {
    pub user_id: String,
    pub favorite_id: i64,
    /// New notes (max 1000 chars). Omit to clear.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Parameters for the favorite_remove tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FavoriteRemoveParams {
    pub user_id: String,
    pub favorite_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteListOutput {
    pub count: usize,
    pub favorites: Vec<Favorite>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteRemoveOutput {
    pub removed: i64,
}

pub async fn add_impl<C: Collection>(state: &AppState<C>, params: FavoriteAddParams) -> Result<CallToolResult, McpError> {
    let new = NewFavorite {
        user_id: params.user_id,
        artifact_id: params.artifact_id,
        item_name: params.item_name,
        source: "met".to_string(),
        image_url: params.image_url,
        culture: params.culture,
        object_date: params.object_date,
    };

    let outcome = state.favorites()?.add_favorite(new).await?;
    if let FavoriteOutcome::AlreadyExists(existing) = &outcome {
        tracing::debug!(id = existing.id, "favorite already saved");
    }
    json_result(&outcome)
}

pub async fn list_favorites_impl<C: Collection>(
    state: &AppState<C>, params: FavoriteListParams,
) -> Result<CallToolResult, McpError> {
    let favorites = state.favorites()?.list_favorites(&params.user_id).await?;
    json_result(&FavoriteListOutput { count: favorites.len(), favorites })
}

pub async fn update_notes_impl<C: Collection>(
    state: &AppState<C>, params: FavoriteUpdateNotesParams,
) -> Result<CallToolResult, McpError> {
    let favorite = state
        .favorites()?
        .update_favorite_notes(&params.user_id, params.favorite_id, params.notes)
        .await?;
    json_result(&favorite)
}

pub async fn remove_impl<C: Collection>(
    state: &AppState<C>, params: FavoriteRemoveParams,
) -> Result<CallToolResult, McpError> {
    state
        .favorites()?
        .remove_favorite(&params.user_id, params.favorite_id)
        .await?;
    json_result(&FavoriteRemoveOutput { removed: params.favorite_id })
}
