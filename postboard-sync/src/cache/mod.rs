//! # Remote collection cache
//!
//! A read-through cache for the remote collections the browser shows:
//! authors, posts (all or per author), a single post and its comments.
//!
//! ## Features
//!
//! - **Request coalescing**: at most one request per key is ever in flight
//! - **Stale-response protection**: responses carry a request ticket and are
//!   only written back while the entry still waits on that ticket
//! - **Stale-while-error**: a failed refresh keeps the last good data
//! - **Optimistic patches**: mutations write into entries without a refetch
//! - **Change notification**: a `watch` revision channel per cache
//!
//! ## Example
//!
//! ```rust,no_run
//! use postboard_sync::cache::{CacheKey, RemoteCollectionCache};
//! use postboard_sync::{loader, map_posts, ClientConfig, HttpBackend};
//! use std::sync::Arc;
//!
//! # async fn example() -> postboard_sync::Result<()> {
//! let backend = Arc::new(HttpBackend::new(&ClientConfig::default())?);
//! let posts = RemoteCollectionCache::new("posts", loader(backend, map_posts));
//!
//! let entry = posts.fetch(&CacheKey::posts_by(1)).await;
//! println!("{} posts", entry.data.map(|p| p.len()).unwrap_or(0));
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod invalidation;
pub mod key;
pub mod store;
pub mod types;

pub use entry::{CacheEntry, CacheStatus};
pub use invalidation::InvalidationReason;
pub use key::{CacheKey, ResourceKind};
pub use store::RemoteCollectionCache;
pub use types::{CacheStats, EnsureOutcome, Loader};
