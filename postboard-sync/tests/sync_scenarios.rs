//! End-to-end behaviour of a browse session over a scripted backend
//!
//! These tests cover:
//! - Request coalescing across views
//! - Debounced author search
//! - Out-of-order responses when switching authors
//! - New-post validation and optimistic insertion
//! - Star flags surviving refetches
//! - Stale-while-error and not-found states

mod common;

use common::{comments, posts, settle, users, ScriptedBackend};
use parking_lot::Mutex;
use postboard_sync::{
    BrowseSession, ClientConfig, MemoryRouter, MutationState, NewPost, RouteParams, Router,
    Submission, SyncError, View, ViewState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_err;

fn session_with(backend: &Arc<ScriptedBackend>) -> BrowseSession {
    BrowseSession::new(
        ClientConfig::default(),
        backend.clone(),
        Box::new(MemoryRouter::new()),
    )
}

#[tokio::test]
async fn test_repeated_views_share_one_request() {
    let backend = Arc::new(ScriptedBackend::new());
    let gate = backend.gate("/users");
    let session = session_with(&backend);

    for _ in 0..5 {
        let view = session.authors_view();
        assert!(view.authors.is_loading());
    }
    settle().await;
    assert_eq!(backend.count("GET /users"), 1);

    let _ = gate.send(Ok(users()));
    settle().await;

    let view = session.authors_view();
    assert_eq!(view.authors.data().map(Vec::len), Some(2));
    assert_eq!(backend.count("GET /users"), 1);

    let stats = session.stats().authors;
    assert_eq!(stats.fetches, 1);
    assert!(stats.coalesced >= 4);
}

#[tokio::test(start_paused = true)]
async fn test_search_filters_after_quiet_period() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reply("/users", Ok(users()));
    let session = session_with(&backend);

    session.start();
    session.settled().await;

    session.search("a");
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.search("al");
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.search("ali");

    // still unfiltered before the quiet period ends
    let view = session.authors_view();
    assert_eq!(view.authors.data().map(Vec::len), Some(2));

    tokio::time::sleep(Duration::from_millis(350)).await;

    let view = session.authors_view();
    assert_eq!(view.query, "ali");
    let names: Vec<String> = view
        .authors
        .data()
        .unwrap()
        .iter()
        .map(|a| a.name.clone())
        .collect();
    assert_eq!(names, vec!["Alice"]);
    assert_eq!(session.filter().settle_count(), 1);
}

#[tokio::test]
async fn test_late_response_never_lands_in_other_author() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reply("/users", Ok(users()));
    let slow_first = backend.gate("/posts?userId=1");
    let fast_second = backend.gate("/posts?userId=2");
    let mut session = session_with(&backend);

    session.select_author(1);
    session.select_author(2);

    let _ = fast_second.send(Ok(posts(2, 20, 2)));
    settle().await;
    let _ = slow_first.send(Ok(posts(1, 10, 3)));
    settle().await;

    let view = session.posts_view();
    assert_eq!(view.author_id, Some(2));
    let page = view.posts.data().unwrap();
    assert!(page.posts.iter().all(|p| p.author_id == 2));
    let ids: Vec<u64> = page.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![20, 21]);

    // author 1's response went to its own slot
    session.select_author(1);
    let view = session.posts_view();
    assert!(view.posts.data().unwrap().posts.iter().all(|p| p.author_id == 1));
    assert_eq!(backend.count("GET /posts?userId=1"), 1);
}

#[tokio::test]
async fn test_changing_author_resets_page() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reply("/posts?userId=1", Ok(posts(1, 1, 10)));
    backend.reply("/posts?userId=2", Ok(posts(2, 11, 10)));
    let mut session = session_with(&backend);

    session.select_author(1);
    settle().await;
    session.set_page(3);
    let view = session.posts_view();
    let page = view.posts.data().unwrap();
    assert_eq!((page.page, page.total_pages), (3, 3));
    assert_eq!(page.posts.len(), 2);

    session.select_author(2);
    assert_eq!(session.selection().current_page(), 1);

    session.set_page(99);
    settle().await;
    let view = session.posts_view();
    assert_eq!(view.posts.data().unwrap().page, 3);
    assert_eq!(session.selection().current_page(), 3);
}

#[tokio::test]
async fn test_page_is_clamped_without_rendering() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reply("/posts?userId=1", Ok(posts(1, 1, 10)));
    let config = ClientConfig::builder().page_size(4).build();
    let mut session = BrowseSession::new(config, backend.clone(), Box::new(MemoryRouter::new()));

    session.select_author(1);
    session.settled().await;

    session.set_page(99);
    assert_eq!(session.selection().current_page(), 3);
    session.next_page();
    assert_eq!(session.selection().current_page(), 3);
    session.set_page(0);
    assert_eq!(session.selection().current_page(), 1);
    session.prev_page();
    assert_eq!(session.selection().current_page(), 1);
}

#[tokio::test]
async fn test_retry_while_loading_keeps_one_request_in_flight() {
    let backend = Arc::new(ScriptedBackend::new());
    let first = backend.gate("/posts?userId=1");
    let second = backend.gate("/posts?userId=1");
    let mut session = session_with(&backend);

    session.select_author(1);
    settle().await;
    session.retry();
    settle().await;
    assert!(session.posts_view().posts.is_loading());
    assert_eq!(backend.count("GET /posts?userId=1"), 1);

    // the outdated reply is dropped and a single new request replaces it
    let _ = first.send(Ok(posts(1, 1, 2)));
    settle().await;
    assert!(session.posts_view().posts.is_loading());
    assert_eq!(backend.count("GET /posts?userId=1"), 2);

    let _ = second.send(Ok(posts(1, 5, 3)));
    session.settled().await;
    let view = session.posts_view();
    let ids: Vec<u64> = view.posts.data().unwrap().posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![5, 6, 7]);
    assert_eq!(backend.count("GET /posts?userId=1"), 2);
    assert_eq!(session.stats().posts.discarded, 1);
}

#[tokio::test]
async fn test_author_without_posts_is_empty() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reply("/posts?userId=9", Ok(serde_json::json!([])));
    let mut session = session_with(&backend);

    session.select_author(9);
    settle().await;
    assert_eq!(session.posts_view().posts, ViewState::Empty);
}

#[tokio::test]
async fn test_short_title_is_rejected_locally() {
    let backend = Arc::new(ScriptedBackend::new());
    let session = session_with(&backend);

    let err = assert_err!(session.submit_post(NewPost::new(1, "x", "body")).await);
    match err {
        SyncError::Validation(fields) => assert!(fields.title.is_some()),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(backend.calls().is_empty());
    assert_eq!(session.mutation().state(), MutationState::Idle);
}

#[tokio::test]
async fn test_created_post_is_prepended_without_refetch() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reply("/posts?userId=1", Ok(posts(1, 1, 3)));
    backend.reply(
        "/posts",
        Ok(serde_json::json!({"id": 101, "userId": 1, "title": "Fresh", "body": "Hot off the press"})),
    );
    let mut session = session_with(&backend);

    session.select_author(1);
    session.settled().await;

    let submission = session
        .submit_post(NewPost::new(1, "  Fresh ", "Hot off the press"))
        .await?;
    assert!(matches!(submission, Submission::Applied(_)));
    assert_eq!(backend.posted()[0]["title"], "Fresh");
    assert_eq!(backend.posted()[0]["userId"], 1);

    let view = session.posts_view();
    let page = view.posts.data().unwrap();
    assert_eq!(page.posts[0].id, 101);
    assert_eq!(page.total_posts, 4);
    assert_eq!(backend.count("GET /posts?userId=1"), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_submission_leaves_posts_untouched() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reply("/posts?userId=1", Ok(posts(1, 1, 3)));
    backend.reply(
        "/posts",
        Err(SyncError::Fetch {
            resource: "/posts".into(),
            status: Some(500),
            message: "HTTP 500".into(),
        }),
    );
    let mut session = session_with(&backend);

    session.select_author(1);
    session.settled().await;
    let before = session.posts_view();

    assert_err!(session.submit_post(NewPost::new(1, "Title", "Body")).await);
    assert_eq!(session.posts_view(), before);
}

#[tokio::test]
async fn test_star_survives_refetch() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reply("/users", Ok(users()));
    backend.reply("/posts?userId=1", Ok(posts(1, 1, 3)));
    backend.reply("/users", Ok(users()));
    backend.reply("/posts?userId=1", Ok(posts(1, 1, 3)));
    let mut session = session_with(&backend);

    session.select_author(1);
    session.settled().await;
    assert!(session.toggle_star(2));

    session.retry();
    session.settled().await;
    assert_eq!(backend.count("GET /posts?userId=1"), 2);

    let view = session.posts_view();
    let starred: Vec<u64> = view
        .posts
        .data()
        .unwrap()
        .posts
        .iter()
        .filter(|p| p.starred)
        .map(|p| p.id)
        .collect();
    assert_eq!(starred, vec![2]);

    let starred_view = session.starred_view();
    let ids: Vec<u64> = starred_view
        .posts
        .data()
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn test_failed_refresh_keeps_stale_authors() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reply("/users", Ok(users()));
    backend.reply("/users", Err(SyncError::fetch("/users", "connection reset")));
    let session = session_with(&backend);

    session.start();
    session.settled().await;
    session.retry();
    session.settled().await;

    match session.authors_view().authors {
        ViewState::Ready {
            data, stale_error, ..
        } => {
            assert_eq!(data.len(), 2);
            assert!(stale_error.is_some());
        }
        other => panic!("unexpected state: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_post_shows_not_found() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reply(
        "/posts/999",
        Err(SyncError::NotFound {
            resource: "/posts/999".into(),
        }),
    );
    backend.reply("/posts/999/comments", Ok(serde_json::json!([])));
    let mut session = session_with(&backend);

    session.open_post(999);
    session.settled().await;

    let view = session.detail_view();
    assert_eq!(view.post, ViewState::NotFound);
    assert_eq!(view.comments, ViewState::Empty);

    // not retried by later views
    session.detail_view();
    assert_eq!(backend.count("GET /posts/999"), 1);
}

#[tokio::test]
async fn test_detail_loads_post_and_comments() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reply(
        "/posts/5",
        Ok(serde_json::json!({"id": 5, "userId": 1, "title": "five", "body": "text"})),
    );
    backend.reply("/posts/5/comments", Ok(comments(5)));
    let mut session = session_with(&backend);

    session.toggle_star(5);
    session.open_post(5);
    session.settled().await;

    let view = session.detail_view();
    let post = view.post.data().unwrap();
    assert!(post.starred);
    assert_eq!(post.title, "five");
    let titles: Vec<&str> = view
        .comments
        .data()
        .unwrap()
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(titles, vec!["first", "second"]);
}

/// Router that records every navigation into a shared log
#[derive(Clone, Default)]
struct RecordingRouter {
    log: Arc<Mutex<Vec<(View, Option<u64>)>>>,
}

impl Router for RecordingRouter {
    fn navigate(&mut self, view: View, id: Option<u64>) {
        self.log.lock().push((view, id));
    }

    fn current_route_params(&self) -> RouteParams {
        RouteParams::default()
    }
}

#[tokio::test]
async fn test_navigation_reaches_router() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.reply("/posts", Ok(posts(1, 1, 2)));
    backend.reply("/posts?userId=3", Ok(posts(3, 7, 1)));
    let router = RecordingRouter::default();
    let mut session = BrowseSession::new(
        ClientConfig::default(),
        backend.clone(),
        Box::new(router.clone()),
    );

    session.select_author(3);
    session.open_post(7);
    session.show_starred();
    session.clear_selection();

    assert_eq!(
        *router.log.lock(),
        vec![
            (View::Posts, Some(3)),
            (View::Detail, Some(7)),
            (View::Starred, None),
            (View::List, None),
        ]
    );

    session.settled().await;
    assert_eq!(backend.count("GET /posts"), 1);
    assert_eq!(session.stats().posts.fetches, 2);
}
