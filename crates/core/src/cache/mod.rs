//! SQLite-backed cache for artifact samples, plus the favorites table.
//!
//! This module provides a persistent TTL cache using SQLite with async
//! access via tokio-rusqlite. It supports:
//!
//! - Per-key sample entries with an absolute expiry
//! - A store-agnostic `get_or_compute` that degrades to recomputation
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod favorites;
pub mod migrations;
pub mod samples;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use favorites::{Favorite, FavoriteOutcome, NewFavorite};
pub use samples::sample_cache_key;
pub use store::{SampleStore, Unavailable, get_or_compute, get_or_compute_if, recompute};
