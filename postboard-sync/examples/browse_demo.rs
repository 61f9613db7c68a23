//! Walks through a browse session against the configured REST service
//!
//! This example shows how to:
//! - Load the author list and apply a debounced search
//! - Page through one author's posts and star a few
//! - Open a post with its comments
//! - Create a post and see it prepended without a refetch
//!
//! Run with `cargo run -p postboard-sync --example browse_demo`.
//! Set `POSTBOARD_BASE_URL` to point at another service.

use postboard_sync::{BrowseSession, ClientConfig, HttpBackend, MemoryRouter, NewPost, ViewState};
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = ClientConfig::from_env()?;
    println!("Browsing {}...", config.base_url);

    let backend = Arc::new(HttpBackend::new(&config)?);
    let mut session = BrowseSession::new(config, backend, Box::new(MemoryRouter::new()));

    // Authors
    session.start();
    session.settled().await;

    session.search("le");
    session.filter().flush();
    let authors = session.authors_view();
    let Some(first) = authors.authors.data().and_then(|a| a.first().cloned()) else {
        println!("No authors match \"{}\"", authors.query);
        return Ok(());
    };
    println!("✓ First author matching \"{}\": {}", authors.query, first.name);

    // Posts
    session.select_author(first.id);
    session.settled().await;
    session.toggle_star(1);

    let view = session.posts_view();
    if let Some(page) = view.posts.data() {
        println!("\nPage {}/{}:", page.page, page.total_pages);
        for post in &page.posts {
            let marker = if post.starred { "★" } else { " " };
            println!("  {} [{}] {}", marker, post.id, post.title);
        }
    }

    // Detail
    session.open_post(1);
    session.settled().await;
    let detail = session.detail_view();
    if let ViewState::Ready { data: post, .. } = &detail.post {
        println!("\n{}\n{}", post.title, post.body);
    }
    if let Some(comments) = detail.comments.data() {
        println!("{} comments", comments.len());
    }

    // New post
    let submission = session
        .submit_post(NewPost::new(first.id, "Hello from Rust", "Written by the browse demo"))
        .await?;
    println!("\n✓ Created post {}", submission.post().id);

    let view = session.posts_view();
    if let Some(page) = view.posts.data() {
        println!("Newest post: {}", page.posts[0].title);
    }

    println!("\n{:#?}", session.stats().posts);
    session.shutdown();
    Ok(())
}
