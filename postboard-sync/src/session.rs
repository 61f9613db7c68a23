//! Browse session: the owner of every piece of client state
//!
//! A session is created explicitly with its collaborators and torn down with
//! [`BrowseSession::shutdown`]. View models are recomputed from cache
//! entries, the settled filter, the overlay and the selection on every call.

use crate::cache::{
    CacheEntry, CacheKey, CacheStats, CacheStatus, InvalidationReason, RemoteCollectionCache,
};
use crate::config::ClientConfig;
use crate::error::{Result, SyncError};
use crate::filter::DebouncedFilter;
use crate::model::{
    map_authors, map_comments, map_post, map_posts, Author, AuthorId, Comment, NewPost, Post,
    PostId,
};
use crate::mutation::{MutationCoordinator, Submission, ValidationRules};
use crate::overlay::{OverlayStore, Starred};
use crate::paginate::Paginator;
use crate::routing::{Router, View};
use crate::selection::SelectionController;
use crate::transport::{loader, Backend};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// What a view should render for one remote resource
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    /// Nothing requested
    Idle,
    /// First load in progress, nothing to show yet
    Loading,
    /// The resource does not exist
    NotFound,
    /// Load failed and there is no previous data
    Failed(SyncError),
    /// Loaded successfully with no items
    Empty,
    /// Data to show
    Ready {
        data: T,
        /// A refresh is in flight
        refreshing: bool,
        /// The last refresh failed; `data` is from an earlier success
        stale_error: Option<SyncError>,
    },
}

impl<T> ViewState<T> {
    /// Project a cache entry, treating `is_empty` data as the empty state
    pub fn from_entry<U>(
        entry: CacheEntry<U>,
        is_empty: impl Fn(&U) -> bool,
        f: impl FnOnce(U) -> T,
    ) -> Self {
        let CacheEntry {
            status,
            data,
            error,
            ..
        } = entry;

        match data {
            Some(data) if status == CacheStatus::Success && is_empty(&data) => ViewState::Empty,
            Some(data) => ViewState::Ready {
                data: f(data),
                refreshing: status.is_loading(),
                stale_error: if status == CacheStatus::Error { error } else { None },
            },
            None => match (status, error) {
                (CacheStatus::Loading, _) => ViewState::Loading,
                (CacheStatus::Error, Some(e)) if e.is_not_found() => ViewState::NotFound,
                (CacheStatus::Error, Some(e)) => ViewState::Failed(e),
                _ => ViewState::Idle,
            },
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

/// Author list with the settled search applied
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorListView {
    pub query: String,
    pub selected: Option<AuthorId>,
    pub authors: ViewState<Vec<Author>>,
}

/// One page of an author's posts
#[derive(Debug, Clone, PartialEq)]
pub struct PostsPage {
    pub posts: Vec<Starred<Post>>,
    pub page: usize,
    pub total_pages: usize,
    pub total_posts: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostsView {
    pub author_id: Option<AuthorId>,
    pub author_name: Option<String>,
    pub posts: ViewState<PostsPage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub post_id: Option<PostId>,
    pub post: ViewState<Starred<Post>>,
    pub comments: ViewState<Vec<Comment>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StarredView {
    pub posts: ViewState<Vec<Starred<Post>>>,
    /// Starred ids with no cached post yet
    pub missing: Vec<PostId>,
}

/// Cache counters for the whole session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub authors: CacheStats,
    pub posts: CacheStats,
    pub post: CacheStats,
    pub comments: CacheStats,
}

/// Session-scoped owner of caches, overlay, selection and the new-post form
pub struct BrowseSession {
    config: ClientConfig,
    authors: Arc<RemoteCollectionCache<Vec<Author>>>,
    posts: Arc<RemoteCollectionCache<Vec<Post>>>,
    post: Arc<RemoteCollectionCache<Post>>,
    comments: Arc<RemoteCollectionCache<Vec<Comment>>>,
    filter: DebouncedFilter,
    overlay: OverlayStore,
    selection: SelectionController,
    paginator: Paginator,
    mutation: MutationCoordinator,
    router: Box<dyn Router>,
}

impl BrowseSession {
    /// Build a session; the selection is seeded from the router's current route
    pub fn new(config: ClientConfig, backend: Arc<dyn Backend>, router: Box<dyn Router>) -> Self {
        let authors = Arc::new(RemoteCollectionCache::new(
            "authors",
            loader(Arc::clone(&backend), map_authors),
        ));
        let posts = Arc::new(RemoteCollectionCache::new(
            "posts",
            loader(Arc::clone(&backend), map_posts),
        ));
        let post = Arc::new(RemoteCollectionCache::new(
            "post",
            loader(Arc::clone(&backend), map_post),
        ));
        let comments = Arc::new(RemoteCollectionCache::new(
            "comments",
            loader(Arc::clone(&backend), map_comments),
        ));

        let mutation = MutationCoordinator::new(
            backend,
            Arc::clone(&posts),
            ValidationRules::from_config(&config),
        );

        let selection = SelectionController::from_route(router.current_route_params());

        info!(base_url = %config.base_url, "browse session created");

        Self {
            filter: DebouncedFilter::new(config.search_debounce),
            paginator: Paginator::new(config.page_size),
            authors,
            posts,
            post,
            comments,
            overlay: OverlayStore::new(),
            selection,
            mutation,
            router,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Request whatever the current selection needs
    pub fn start(&self) {
        self.authors.ensure(&CacheKey::Users);
        if let Some(author_id) = self.selection.current_author_id() {
            self.posts.ensure(&CacheKey::posts_by(author_id));
        }
        if let Some(post_id) = self.selection.current_post_id() {
            self.ensure_detail(post_id);
        }
    }

    // ----- author list -----

    pub fn search(&self, text: impl Into<String>) {
        self.filter.on_input(text);
    }

    pub fn filter(&self) -> &DebouncedFilter {
        &self.filter
    }

    pub fn authors_view(&self) -> AuthorListView {
        self.authors.ensure(&CacheKey::Users);
        let entry = self.authors.get(&CacheKey::Users);
        AuthorListView {
            query: self.filter.settled_text(),
            selected: self.selection.current_author_id(),
            authors: ViewState::from_entry(entry, Vec::is_empty, |authors| {
                self.filter.apply(&authors, |a| a.name.as_str())
            }),
        }
    }

    // ----- author posts -----

    pub fn select_author(&mut self, author_id: AuthorId) {
        if self.selection.select(author_id) {
            self.posts.ensure(&CacheKey::posts_by(author_id));
        }
        self.router.navigate(View::Posts, Some(author_id));
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.router.navigate(View::List, None);
    }

    /// Go to `page`, clamped as soon as the author's posts are known
    pub fn set_page(&mut self, page: usize) {
        self.selection.set_page(page);
        self.clamp_page();
    }

    pub fn next_page(&mut self) {
        self.set_page(self.selection.current_page() + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.selection.current_page().saturating_sub(1));
    }

    /// Clamp the selected page against the selected author's cached posts
    fn clamp_page(&mut self) {
        let Some(author_id) = self.selection.current_author_id() else {
            return;
        };
        if let Some(posts) = self.posts.get(&CacheKey::posts_by(author_id)).data {
            self.selection
                .clamp_page(self.paginator.total_pages(posts.len()));
        }
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Posts of the selected author, paged and merged with star flags
    ///
    /// Clamps the selected page against the current result set.
    pub fn posts_view(&mut self) -> PostsView {
        let Some(author_id) = self.selection.current_author_id() else {
            return PostsView {
                author_id: None,
                author_name: None,
                posts: ViewState::Idle,
            };
        };

        let key = CacheKey::posts_by(author_id);
        self.posts.ensure(&key);
        self.clamp_page();
        let entry = self.posts.get(&key);

        let requested = self.selection.current_page();
        let paginator = self.paginator;
        let overlay = &self.overlay;
        let posts = ViewState::from_entry(entry, Vec::is_empty, |posts| {
            let page = paginator.paginate(&posts, requested);
            PostsPage {
                posts: overlay.merge_all(page.items),
                page: page.page,
                total_pages: page.total_pages,
                total_posts: posts.len(),
            }
        });

        PostsView {
            author_id: Some(author_id),
            author_name: self.author_name(author_id),
            posts,
        }
    }

    fn author_name(&self, author_id: AuthorId) -> Option<String> {
        self.authors
            .get(&CacheKey::Users)
            .data?
            .into_iter()
            .find(|a| a.id == author_id)
            .map(|a| a.name)
    }

    // ----- stars -----

    /// Flip the star flag for `post_id`; returns the new value
    pub fn toggle_star(&mut self, post_id: PostId) -> bool {
        self.overlay.toggle(post_id)
    }

    pub fn overlay(&self) -> &OverlayStore {
        &self.overlay
    }

    pub fn show_starred(&mut self) {
        self.posts.ensure(&CacheKey::all_posts());
        self.router.navigate(View::Starred, None);
    }

    /// Starred posts found anywhere in the caches, ascending by id
    pub fn starred_view(&self) -> StarredView {
        let ids = self.overlay.starred_ids();
        if ids.is_empty() {
            return StarredView {
                posts: ViewState::Empty,
                missing: Vec::new(),
            };
        }

        let mut known: BTreeMap<PostId, Post> = BTreeMap::new();
        for entry in self.posts.snapshot() {
            for post in entry.data.into_iter().flatten() {
                known.entry(post.id).or_insert(post);
            }
        }
        for entry in self.post.snapshot() {
            if let Some(post) = entry.data {
                known.entry(post.id).or_insert(post);
            }
        }

        let (found, missing): (Vec<PostId>, Vec<PostId>) =
            ids.into_iter().partition(|id| known.contains_key(id));
        let posts: Vec<Starred<Post>> = found
            .iter()
            .filter_map(|id| known.get(id))
            .map(|post| self.overlay.merge(post))
            .collect();

        let all = self.posts.get(&CacheKey::all_posts());
        let state = if posts.is_empty() {
            match (all.status, all.error) {
                (CacheStatus::Loading, _) => ViewState::Loading,
                (CacheStatus::Error, Some(e)) => ViewState::Failed(e),
                _ => ViewState::Empty,
            }
        } else {
            ViewState::Ready {
                data: posts,
                refreshing: all.status.is_loading(),
                stale_error: if all.status == CacheStatus::Error {
                    all.error
                } else {
                    None
                },
            }
        };

        StarredView {
            posts: state,
            missing,
        }
    }

    // ----- detail -----

    pub fn open_post(&mut self, post_id: PostId) {
        self.selection.open_post(post_id);
        self.ensure_detail(post_id);
        self.router.navigate(View::Detail, Some(post_id));
    }

    pub fn close_post(&mut self) {
        self.selection.close_post();
    }

    fn ensure_detail(&self, post_id: PostId) {
        self.post.ensure(&CacheKey::Post { id: post_id });
        self.comments.ensure(&CacheKey::Comments { post_id });
    }

    pub fn detail_view(&self) -> DetailView {
        let Some(post_id) = self.selection.current_post_id() else {
            return DetailView {
                post_id: None,
                post: ViewState::Idle,
                comments: ViewState::Idle,
            };
        };

        self.ensure_detail(post_id);
        let post = ViewState::from_entry(
            self.post.get(&CacheKey::Post { id: post_id }),
            |_| false,
            |post| self.overlay.merge(&post),
        );
        let comments = ViewState::from_entry(
            self.comments.get(&CacheKey::Comments { post_id }),
            Vec::is_empty,
            |comments| comments,
        );

        DetailView {
            post_id: Some(post_id),
            post,
            comments,
        }
    }

    // ----- new post -----

    pub fn mutation(&self) -> &MutationCoordinator {
        &self.mutation
    }

    pub async fn submit_post(&self, fields: NewPost) -> Result<Submission> {
        self.mutation.submit(fields).await
    }

    // ----- refresh -----

    /// Invalidate and re-request everything the current screens show
    pub fn retry(&self) {
        debug!("retrying visible resources");
        let reason = InvalidationReason::Retry;

        self.authors.invalidate_with(&CacheKey::Users, reason);
        self.authors.ensure(&CacheKey::Users);

        if let Some(author_id) = self.selection.current_author_id() {
            let key = CacheKey::posts_by(author_id);
            self.posts.invalidate_with(&key, reason);
            self.posts.ensure(&key);
        }

        if let Some(post_id) = self.selection.current_post_id() {
            self.post.invalidate_with(&CacheKey::Post { id: post_id }, reason);
            self.comments
                .invalidate_with(&CacheKey::Comments { post_id }, reason);
            self.ensure_detail(post_id);
        }

        let all = CacheKey::all_posts();
        if self.posts.invalidate_with(&all, reason) {
            self.posts.ensure(&all);
        }
    }

    /// Wait until no cache has a request in flight for a visible resource
    pub async fn settled(&self) {
        let mut revisions = [
            self.authors.subscribe(),
            self.posts.subscribe(),
            self.post.subscribe(),
            self.comments.subscribe(),
        ];

        while self.any_loading() {
            let changed = futures::future::select_all(
                revisions.iter_mut().map(|rx| Box::pin(rx.changed())),
            )
            .await;
            if changed.0.is_err() {
                break;
            }
        }
    }

    fn any_loading(&self) -> bool {
        let loading = |status: CacheStatus| status.is_loading();

        let mut busy = loading(self.authors.get(&CacheKey::Users).status);
        if let Some(author_id) = self.selection.current_author_id() {
            busy |= loading(self.posts.get(&CacheKey::posts_by(author_id)).status);
        }
        if let Some(post_id) = self.selection.current_post_id() {
            busy |= loading(self.post.get(&CacheKey::Post { id: post_id }).status);
            busy |= loading(self.comments.get(&CacheKey::Comments { post_id }).status);
        }
        busy |= loading(self.posts.get(&CacheKey::all_posts()).status);
        busy
    }

    /// Receiver bumped whenever the search settles
    pub fn subscribe_search(&self) -> watch::Receiver<u64> {
        self.filter.subscribe()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            authors: self.authors.stats(),
            posts: self.posts.stats(),
            post: self.post.stats(),
            comments: self.comments.stats(),
        }
    }

    /// Tear the session down; pending timers and submissions are dropped
    pub fn shutdown(self) {
        self.mutation.abandon();
        let stats = self.stats();
        info!(
            fetches = stats.authors.fetches
                + stats.posts.fetches
                + stats.post.fetches
                + stats.comments.fetches,
            starred = self.overlay.len(),
            "browse session closed"
        );
    }
}
