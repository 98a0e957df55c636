//! Sample cache operations.
//!
//! One row per cache key. Writes replace the whole entry; nothing is merged.
//! Expiry is stored as unix milliseconds so freshness checks compare integers.

use super::connection::CacheDb;
use crate::{ArtifactSample, Error};
use chrono::Utc;
use std::time::Duration;
use tokio_rusqlite::{params, rusqlite};

/// Cache key for a movement's sample.
pub fn sample_cache_key(movement_key: &str) -> String {
    format!("art_movements:{movement_key}")
}

impl CacheDb {
    /// Get a cached sample if it exists and has not expired.
    pub async fn get_fresh_sample(&self, cache_key: &str) -> Result<Option<ArtifactSample>, Error> {
        let cache_key = cache_key.to_string();
        let now = Utc::now().timestamp_millis();
        let json = self
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT sample_json FROM samples WHERE cache_key = ?1 AND expires_at > ?2",
                    params![cache_key, now],
                    |row| row.get(0),
                );

                match result {
                    Ok(json) => Ok(Some(json)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Check if a sample entry exists and is fresh.
    pub async fn is_sample_fresh(&self, cache_key: &str) -> Result<bool, Error> {
        let cache_key = cache_key.to_string();
        let now = Utc::now().timestamp_millis();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let fresh: bool = conn
                    .query_row(
                        "SELECT EXISTS(SELECT 1 FROM samples WHERE cache_key = ?1 AND expires_at > ?2)",
                        params![cache_key, now],
                        |row| row.get(0),
                    )
                    .map_err(Error::from)?;

                Ok(fresh)
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace a cached sample with expiry `now + ttl`.
    pub async fn put_sample(&self, cache_key: &str, sample: &ArtifactSample, ttl: Duration) -> Result<(), Error> {
        let cache_key = cache_key.to_string();
        let sample_json = serde_json::to_string(sample)?;
        let item_count = sample.len() as i64;

        let now = Utc::now();
        let fetched_at = now.to_rfc3339();
        let expires_at = now.timestamp_millis().saturating_add(ttl.as_millis() as i64);

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO samples (cache_key, sample_json, item_count, fetched_at, expires_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(cache_key) DO UPDATE SET
                        sample_json = excluded.sample_json,
                        item_count = excluded.item_count,
                        fetched_at = excluded.fetched_at,
                        expires_at = excluded.expires_at",
                    params![cache_key, sample_json, item_count, fetched_at, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete one cached sample. Returns the number of deleted entries.
    pub async fn purge_sample(&self, cache_key: &str) -> Result<u64, Error> {
        let cache_key = cache_key.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM samples WHERE cache_key = ?1", params![cache_key])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete expired samples. Returns the number of deleted entries.
    pub async fn purge_expired_samples(&self) -> Result<u64, Error> {
        let now = Utc::now().timestamp_millis();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM samples WHERE expires_at <= ?1", params![now])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
