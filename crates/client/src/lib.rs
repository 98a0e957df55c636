//! Client code for curio.
//!
//! This crate provides the collection API client and the sampler that turns
//! a movement definition into an artifact sample ready for caching.

pub mod collection;
pub mod met;
pub mod sample;

pub use collection::Collection;
pub use met::{MetClient, MetConfig, MetError};
pub use sample::Sampler;
