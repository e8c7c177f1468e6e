//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external collaborators. The services
//! depend only on these traits, not on concrete implementations.

mod cache_store;
mod normalizer;

pub use cache_store::{CacheKey, CacheStore};
pub use normalizer::{Normalizer, NormalizerRegistry};
