//! Query result cache.
//!
//! Results are keyed by query name and parameters and served only while they
//! are younger than the revalidation window the query declares.

mod config;
mod content;
mod lock;
mod store;

pub use config::CacheConfig;
pub use content::CachedContentStore;
pub(crate) use lock::mutex_lock;
pub use store::QueryStore;
pub(crate) use store::{METRIC_CACHE_EVICT, METRIC_CACHE_HIT, METRIC_CACHE_MISS};
