//! Aggregation engine.
//!
//! Turns a [`Movement`] into a bounded sample of displayable records:
//!
//! 1. **Bucket phase**: list each bucket in catalog order, shuffle the ids,
//!    fetch one at a time and keep what passes [`is_displayable`].
//! 2. **Fallback phase**: when still short, search the movement's fallback
//!    term, take the first `search_window` hits, shuffle, and continue.
//!
//! Both phases draw on one attempt budget. Upstream failures shrink the
//! sample; they never fail it.

use std::collections::HashSet;
use std::future::Future;

use curio_core::{ArtifactRecord, ArtifactSample, Movement, ObjectId, SampleLimits, is_displayable};
use rand::Rng;
use rand::seq::SliceRandom;
use tokio_util::sync::CancellationToken;

use crate::Collection;

/// Counters for one aggregation, threaded through both phases.
#[derive(Debug)]
struct SampleRun {
    limits: SampleLimits,
    attempts: usize,
    picked: Vec<ArtifactRecord>,
    /// Ids already fetched in this run.
    seen: HashSet<ObjectId>,
}

impl SampleRun {
    fn new(limits: SampleLimits) -> Self {
        Self { limits, attempts: 0, picked: Vec::with_capacity(limits.target_count), seen: HashSet::new() }
    }

    fn is_full(&self) -> bool {
        self.picked.len() >= self.limits.target_count
    }

    fn budget_spent(&self) -> bool {
        self.attempts >= self.limits.max_attempts
    }

    fn is_done(&self) -> bool {
        self.is_full() || self.budget_spent()
    }

    fn accept(&mut self, record: ArtifactRecord) {
        if !self.picked.iter().any(|r| r.id == record.id) {
            self.picked.push(record);
        }
    }

    fn finish(self) -> ArtifactSample {
        ArtifactSample::new(self.picked, self.limits.target_count)
    }
}

/// Run `fut` unless `cancel` fires first.
async fn unless_cancelled<T>(cancel: &CancellationToken, fut: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

/// Sampling engine over any [`Collection`].
#[derive(Debug, Clone)]
pub struct Sampler<C> {
    collection: C,
}

impl<C: Collection> Sampler<C> {
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Assemble up to `limits.target_count` displayable records for `movement`.
    ///
    /// Never fails. When `cancel` fires, remaining work is abandoned and the
    /// records gathered so far are returned.
    pub async fn aggregate<R: Rng + ?Sized>(
        &self, movement: &Movement, limits: &SampleLimits, rng: &mut R, cancel: &CancellationToken,
    ) -> ArtifactSample {
        let mut run = SampleRun::new(*limits);

        self.bucket_phase(movement, &mut run, rng, cancel).await;
        tracing::debug!(
            movement = %movement.key,
            picked = run.picked.len(),
            attempts = run.attempts,
            "bucket phase finished"
        );

        if !run.is_done() && !cancel.is_cancelled() {
            if movement.has_fallback() {
                self.fallback_phase(movement, &mut run, rng, cancel).await;
            } else {
                tracing::debug!(movement = %movement.key, "short sample, no fallback query");
            }
        }

        let attempts = run.attempts;
        let sample = run.finish();
        tracing::info!(
            movement = %movement.key,
            items = sample.len(),
            target = limits.target_count,
            attempts,
            cancelled = cancel.is_cancelled(),
            "aggregation finished"
        );
        sample
    }

    async fn bucket_phase<R: Rng + ?Sized>(
        &self, movement: &Movement, run: &mut SampleRun, rng: &mut R, cancel: &CancellationToken,
    ) {
        for &bucket in &movement.bucket_ids {
            if run.is_done() || cancel.is_cancelled() {
                return;
            }

            let mut ids = match unless_cancelled(cancel, self.collection.list_by_bucket(bucket)).await {
                None => return,
                Some(Ok(ids)) if !ids.is_empty() => ids,
                Some(Ok(_)) => {
                    tracing::debug!(bucket, "bucket is empty, skipping");
                    continue;
                }
                Some(Err(e)) => {
                    tracing::warn!(bucket, error = %e, "bucket listing failed, skipping");
                    continue;
                }
            };

            ids.shuffle(rng);
            if !self.drain(run, ids, cancel).await {
                return;
            }
        }
    }

    async fn fallback_phase<R: Rng + ?Sized>(
        &self, movement: &Movement, run: &mut SampleRun, rng: &mut R, cancel: &CancellationToken,
    ) {
        let query = movement.fallback_query.as_str();
        let mut ids = match unless_cancelled(cancel, self.collection.search(query)).await {
            None => return,
            Some(Ok(ids)) => ids,
            Some(Err(e)) => {
                tracing::warn!(query, error = %e, "fallback search failed");
                return;
            }
        };

        ids.truncate(run.limits.search_window);
        tracing::debug!(query, candidates = ids.len(), "fallback phase started");

        ids.shuffle(rng);
        self.drain(run, ids, cancel).await;
    }

    /// Fetch `ids` in order until the run is done. Returns `false` when the
    /// run stopped early (full, out of budget, or cancelled).
    async fn drain(&self, run: &mut SampleRun, ids: Vec<ObjectId>, cancel: &CancellationToken) -> bool {
        for id in ids {
            if run.is_done() || cancel.is_cancelled() {
                return false;
            }
            if !run.seen.insert(id) {
                continue;
            }

            run.attempts += 1;
            match unless_cancelled(cancel, self.collection.fetch_one(id)).await {
                None => return false,
                Some(Ok(Some(record))) if is_displayable(&record) => run.accept(record),
                Some(Ok(Some(_))) => tracing::trace!(id, "record not displayable"),
                Some(Ok(None)) => tracing::trace!(id, "record absent upstream"),
                Some(Err(e)) => tracing::debug!(id, error = %e, "record fetch failed"),
            }
        }

        true
    }
}
