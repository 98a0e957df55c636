//! movement_list tool implementation.
//!
//! Lists the movements a caller can sample.

use curio_core::Catalog;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::{Deserialize, Serialize};

use super::json_result;

/// One catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementInfo {
    pub key: String,
    pub display_name: String,
    pub bucket_ids: Vec<u32>,
    pub has_fallback: bool,
}

/// Output from the movement_list tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementListOutput {
    /// Key used when a request names no movement or an unknown one.
    pub default: String,
    pub movements: Vec<MovementInfo>,
}

/// Implementation of the movement_list tool.
pub fn list_impl(catalog: &Catalog) -> Result<CallToolResult, McpError> {
    let movements = catalog
        .iter()
        .map(|m| MovementInfo {
            key: m.key.clone(),
            display_name: m.display_name.clone(),
            bucket_ids: m.bucket_ids.clone(),
            has_fallback: m.has_fallback(),
        })
        .collect();

    let output = MovementListOutput { default: catalog.default_movement().key.clone(), movements };
    json_result(&output)
}
