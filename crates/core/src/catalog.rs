//! Movement catalog.
//!
//! A movement is a thematic grouping of artifacts backed by one or more
//! upstream departments ("buckets") plus a free-text search term used when
//! the buckets come up short. The catalog is built once from configuration
//! and handed to whoever needs it; nothing here is global.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Key of the movement used when a caller names none or an unknown one.
pub const DEFAULT_MOVEMENT: &str = "renaissance";

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Movement {
    pub key: String,
    pub display_name: String,
    /// Upstream department ids, queried in this order.
    pub bucket_ids: Vec<u32>,
    /// Search term for the fallback phase; empty disables the fallback.
    #[serde(default)]
    pub fallback_query: String,
}

impl Movement {
    pub fn new(key: &str, display_name: &str, bucket_ids: &[u32], fallback_query: &str) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            bucket_ids: bucket_ids.to_vec(),
            fallback_query: fallback_query.to_string(),
        }
    }

    pub fn has_fallback(&self) -> bool {
        !self.fallback_query.trim().is_empty()
    }
}

/// The stock movement table.
pub fn builtin_movements() -> Vec<Movement> {
    vec![
        Movement::new("renaissance", "Renaissance (1400-1600)", &[11, 9], "renaissance"),
        Movement::new("baroque", "Baroque (1600-1750)", &[11, 9], "baroque"),
        Movement::new("impressionism", "Impressionism (1860-1886)", &[11], "impressionist"),
        Movement::new("modern", "Modern Art (1900-1950)", &[21, 19], "modern"),
        Movement::new("contemporary", "Contemporary (1950-Present)", &[21], "contemporary"),
        Movement::new("medieval", "Medieval (500-1400)", &[17], "medieval"),
        Movement::new("ancient", "Ancient Art (Before 500 CE)", &[1, 3, 4, 5], "ancient"),
    ]
}

/// Read-only lookup table from movement key to definition.
#[derive(Debug, Clone)]
pub struct Catalog {
    movements: Vec<Movement>,
    default_index: usize,
}

impl Catalog {
    /// Build a catalog, checking that keys are unique, every movement has at
    /// least one bucket, and `default_key` names an entry.
    pub fn new(movements: Vec<Movement>, default_key: &str) -> Result<Self, ConfigError> {
        for (idx, movement) in movements.iter().enumerate() {
            if movement.key.trim().is_empty() {
                return Err(ConfigError::Invalid { field: "movements".into(), reason: "key must not be empty".into() });
            }
            if movement.bucket_ids.is_empty() {
                return Err(ConfigError::Invalid {
                    field: "movements".into(),
                    reason: format!("movement '{}' has no bucket ids", movement.key),
                });
            }
            if movements[..idx].iter().any(|m| m.key == movement.key) {
                return Err(ConfigError::Invalid {
                    field: "movements".into(),
                    reason: format!("duplicate movement key '{}'", movement.key),
                });
            }
        }

        let default_index = movements
            .iter()
            .position(|m| m.key == default_key)
            .ok_or_else(|| ConfigError::Invalid {
                field: "default_movement".into(),
                reason: format!("'{default_key}' is not in the catalog"),
            })?;

        Ok(Self { movements, default_index })
    }

    /// Stock table with [`DEFAULT_MOVEMENT`] as the default.
    pub fn builtin() -> Self {
        Self { movements: builtin_movements(), default_index: 0 }
    }

    pub fn get(&self, key: &str) -> Option<&Movement> {
        self.movements.iter().find(|m| m.key == key)
    }

    /// Resolve a caller-supplied key; absent or unknown keys map to the default.
    pub fn resolve(&self, key: Option<&str>) -> &Movement {
        key.and_then(|k| self.get(k.trim()))
            .unwrap_or(&self.movements[self.default_index])
    }

    pub fn default_movement(&self) -> &Movement {
        &self.movements[self.default_index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Movement> {
        self.movements.iter()
    }

    pub fn len(&self) -> usize {
        self.movements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }
}
