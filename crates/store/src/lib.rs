#![forbid(unsafe_code)]

mod cache;
mod config;
mod entry;
mod janitor;

pub use cache::{Cache, CacheKey};
pub use config::CacheConfig;
pub use entry::Expiration;
pub use janitor::JanitorState;
pub use simpcache_common::{CacheError, CacheResult};
