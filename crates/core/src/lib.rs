//! Core types and shared functionality for curio.
//!
//! This crate provides:
//! - Artifact records, samples, and the quality filter
//! - The movement catalog
//! - Cache implementation with SQLite backend (samples and favorites)
//! - Unified error types
//! - Configuration structures

pub mod artifact;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;

pub use artifact::{ArtifactRecord, ArtifactSample, ObjectId, SampleLimits, is_displayable};
pub use cache::{CacheDb, Favorite, FavoriteOutcome, NewFavorite, SampleStore, Unavailable, get_or_compute};
pub use catalog::{Catalog, Movement};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
