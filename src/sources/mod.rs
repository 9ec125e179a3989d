//! Dependency sources.
//!
//! The cache decides whether anything needs fetching; fetchers do the
//! actual network work.

pub mod cache;
pub mod fetch;

pub use cache::{ArtifactCache, CacheEntry};
pub use fetch::{Fetcher, GitSource, NetworkFetcher};
