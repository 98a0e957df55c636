//! Collection API response types.

use curio_core::ObjectId;
use serde::Deserialize;

/// Body of the listing and search endpoints.
///
/// The upstream sends `"objectIDs": null` when nothing matches.
#[derive(Debug, Deserialize)]
pub struct ObjectIdsResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(rename = "objectIDs", default)]
    pub object_ids: Option<Vec<ObjectId>>,
}

impl ObjectIdsResponse {
    pub fn into_ids(self) -> Vec<ObjectId> {
        self.object_ids.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_listing() {
        let json = r#"{"total": 3, "objectIDs": [436535, 436529, 10]}"#;
        let response: ObjectIdsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.total, 3);
        assert_eq!(response.into_ids(), vec![436535, 436529, 10]);
    }

    #[test]
    fn test_null_ids_are_empty() {
        let json = r#"{"total": 0, "objectIDs": null}"#;
        let response: ObjectIdsResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_ids().is_empty());
    }

    #[test]
    fn test_missing_ids_are_empty() {
        let response: ObjectIdsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_ids().is_empty());
    }
}
