//! Upstream collection port.

use async_trait::async_trait;
use curio_core::{ArtifactRecord, ObjectId};

use crate::met::MetError;

/// Read-only view of an upstream artifact collection.
///
/// Callers must not rely on the order of returned id lists.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Ids of objects with images in one department.
    async fn list_by_bucket(&self, bucket_id: u32) -> Result<Vec<ObjectId>, MetError>;

    /// Ids of objects with images matching a free-text query.
    async fn search(&self, query: &str) -> Result<Vec<ObjectId>, MetError>;

    /// One object record; `None` when the upstream has no such object.
    async fn fetch_one(&self, id: ObjectId) -> Result<Option<ArtifactRecord>, MetError>;
}
