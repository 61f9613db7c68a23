//! # Postboard Sync (postboard-sync)
//!
//! Client-side data synchronization and view state for browsing authors,
//! their posts and post comments from a JSON REST service.
//!
//! ## Features
//!
//! - Read-through caches with request coalescing and stale-response protection
//! - Stale-while-error: a failed refresh keeps showing the last good data
//! - Debounced, case-insensitive author search
//! - Session-local star flags merged onto posts without touching cached data
//! - Fixed-size pagination with clamped page selection
//! - Validated new-post submission with an optimistic cache update
//!
//! ## Browsing
//!
//! ```no_run
//! use postboard_sync::{BrowseSession, ClientConfig, HttpBackend, MemoryRouter};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> postboard_sync::Result<()> {
//!     let config = ClientConfig::from_env()?;
//!     let backend = Arc::new(HttpBackend::new(&config)?);
//!     let mut session = BrowseSession::new(config, backend, Box::new(MemoryRouter::new()));
//!
//!     session.start();
//!     session.select_author(1);
//!     session.settled().await;
//!
//!     let view = session.posts_view();
//!     if let Some(page) = view.posts.data() {
//!         for post in &page.posts {
//!             println!("{} {}", post.id, post.title);
//!         }
//!     }
//!
//!     session.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Creating posts
//!
//! ```no_run
//! use postboard_sync::{BrowseSession, ClientConfig, HttpBackend, MemoryRouter, NewPost, SyncError};
//! use std::sync::Arc;
//!
//! # async fn example() -> postboard_sync::Result<()> {
//! let config = ClientConfig::default();
//! let backend = Arc::new(HttpBackend::new(&config)?);
//! let session = BrowseSession::new(config, backend, Box::new(MemoryRouter::new()));
//!
//! match session.submit_post(NewPost::new(1, "Hello", "First post")).await {
//!     Ok(submission) => println!("created {}", submission.post().id),
//!     Err(SyncError::Validation(fields)) => println!("invalid: {}", fields),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod mutation;
pub mod overlay;
pub mod paginate;
pub mod routing;
pub mod selection;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use cache::{
    CacheEntry, CacheKey, CacheStats, CacheStatus, EnsureOutcome, InvalidationReason, Loader,
    RemoteCollectionCache, ResourceKind,
};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use error::{FieldErrors, Result, SyncError};
pub use filter::DebouncedFilter;
pub use model::{
    map_authors, map_comments, map_post, map_posts, Author, AuthorId, Comment, Identified,
    NewPost, Post, PostId,
};
pub use mutation::{MutationCoordinator, MutationState, Submission, ValidationRules};
pub use overlay::{OverlayStore, Starred};
pub use paginate::{paginate, Page, Paginator};
pub use routing::{MemoryRouter, Route, RouteParams, Router, View};
pub use selection::{SelectionController, SelectionState};
pub use session::{
    AuthorListView, BrowseSession, DetailView, PostsPage, PostsView, SessionStats, StarredView,
    ViewState,
};
pub use transport::{loader, Backend, HttpBackend};
