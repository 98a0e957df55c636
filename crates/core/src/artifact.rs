//! Artifact records, samples, and the quality filter.
//!
//! Records mirror the upstream object document. Only the fields the sampler
//! and the favorites store read are typed; everything else is carried
//! through untouched in [`ArtifactRecord::extra`].

use serde::{Deserialize, Serialize};

/// Upstream object identifier.
pub type ObjectId = u64;

/// One item from the upstream collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    #[serde(rename = "objectID")]
    pub id: ObjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "primaryImageSmall", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,

    #[serde(rename = "objectDate", default, skip_serializing_if = "Option::is_none")]
    pub date_label: Option<String>,

    #[serde(rename = "culture", default, skip_serializing_if = "Option::is_none")]
    pub culture_label: Option<String>,

    #[serde(rename = "artistDisplayName", default, skip_serializing_if = "Option::is_none")]
    pub creator_label: Option<String>,

    /// Remaining upstream fields, kept opaque.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ArtifactRecord {
    /// Bare record with only an id, mostly useful for building fixtures.
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            title: None,
            image_ref: None,
            date_label: None,
            culture_label: None,
            creator_label: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    pub fn with_date(mut self, date_label: impl Into<String>) -> Self {
        self.date_label = Some(date_label.into());
        self
    }

    pub fn with_culture(mut self, culture_label: impl Into<String>) -> Self {
        self.culture_label = Some(culture_label.into());
        self
    }

    /// Culture label, treating the upstream's empty string as absent.
    pub fn culture(&self) -> Option<&str> {
        non_blank(&self.culture_label)
    }

    /// Creator label, treating the upstream's empty string as absent.
    pub fn creator(&self) -> Option<&str> {
        non_blank(&self.creator_label)
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

/// Quality filter: a record is displayable iff it has an image reference,
/// a title, and a date label, none of them blank.
pub fn is_displayable(record: &ArtifactRecord) -> bool {
    non_blank(&record.image_ref).is_some()
        && non_blank(&record.title).is_some()
        && non_blank(&record.date_label).is_some()
}

/// Bounded, deduplicated, displayable sequence of records for one category.
///
/// This is the unit stored in the cache and returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactSample(Vec<ArtifactRecord>);

impl ArtifactSample {
    /// Build a sample from already-vetted records, truncated to `limit`.
    pub fn new(mut records: Vec<ArtifactRecord>, limit: usize) -> Self {
        records.truncate(limit);
        Self(records)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArtifactRecord> {
        self.0.iter()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.0.iter().any(|r| r.id == id)
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.0.iter().map(|r| r.id).collect()
    }
}

impl<'a> IntoIterator for &'a ArtifactSample {
    type Item = &'a ArtifactRecord;
    type IntoIter = std::slice::Iter<'a, ArtifactRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Bounds applied to one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleLimits {
    /// Maximum number of records in the sample.
    pub target_count: usize,
    /// Maximum number of per-item fetches across all phases.
    pub max_attempts: usize,
    /// How many search hits are considered in the fallback phase.
    pub search_window: usize,
}

impl Default for SampleLimits {
    fn default() -> Self {
        Self { target_count: 20, max_attempts: 100, search_window: 50 }
    }
}
