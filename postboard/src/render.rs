//! Plain-text rendering of session view models

use postboard_sync::{
    AuthorListView, DetailView, FieldErrors, PostsView, StarredView, SyncError, ViewState,
};

const RULE_WIDTH: usize = 70;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn star(starred: bool) -> &'static str {
    if starred {
        "★"
    } else {
        "☆"
    }
}

/// First `max` characters, with an ellipsis when cut
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let short: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", short)
    } else {
        text.to_string()
    }
}

/// Line for every state except `Ready`
fn status_line<T>(state: &ViewState<T>, empty: &str) -> Option<String> {
    match state {
        ViewState::Idle => Some("◌ Nothing loaded".to_string()),
        ViewState::Loading => Some("◐ Loading...".to_string()),
        ViewState::NotFound => Some("✗ Not found".to_string()),
        ViewState::Failed(e) => Some(format!("✗ {}", e)),
        ViewState::Empty => Some(empty.to_string()),
        ViewState::Ready { .. } => None,
    }
}

/// Notes shown above ready data
fn freshness<T>(state: &ViewState<T>) -> Vec<String> {
    let mut lines = Vec::new();
    if let ViewState::Ready {
        refreshing,
        stale_error,
        ..
    } = state
    {
        if *refreshing {
            lines.push("◐ Refreshing...".to_string());
        }
        if let Some(e) = stale_error {
            lines.push(format!("! Showing earlier data; refresh failed: {}", e));
        }
    }
    lines
}

pub fn authors(view: &AuthorListView) -> String {
    let mut lines = vec!["Authors".to_string(), rule()];
    if !view.query.is_empty() {
        lines.push(format!("Search: \"{}\"", view.query));
    }

    if let Some(line) = status_line(&view.authors, "No authors") {
        lines.push(line);
        return lines.join("\n");
    }

    lines.extend(freshness(&view.authors));
    let authors = view.authors.data().map(Vec::as_slice).unwrap_or_default();
    if authors.is_empty() {
        lines.push("No authors match the search".to_string());
    }
    for author in authors {
        let marker = if view.selected == Some(author.id) { "▸" } else { " " };
        lines.push(format!("{} {:>4}  {}", marker, author.id, author.name));
    }
    lines.join("\n")
}

pub fn posts(view: &PostsView) -> String {
    let Some(author_id) = view.author_id else {
        return "Select an author to see their posts".to_string();
    };

    let title = match &view.author_name {
        Some(name) => format!("Posts by {} (#{})", name, author_id),
        None => format!("Posts by author #{}", author_id),
    };
    let mut lines = vec![title, rule()];

    if let Some(line) = status_line(&view.posts, "This author has no posts yet") {
        lines.push(line);
        return lines.join("\n");
    }

    lines.extend(freshness(&view.posts));
    if let Some(page) = view.posts.data() {
        for post in &page.posts {
            lines.push(format!(
                "{} {:>4}  {}",
                star(post.starred),
                post.id,
                truncate(&post.title, 60)
            ));
        }
        lines.push(format!(
            "Page {}/{} ({} posts)",
            page.page, page.total_pages, page.total_posts
        ));
    }
    lines.join("\n")
}

pub fn detail(view: &DetailView) -> String {
    let Some(post_id) = view.post_id else {
        return "No post open".to_string();
    };

    let mut lines = Vec::new();
    match &view.post {
        ViewState::Ready { data: post, .. } => {
            lines.push(format!("{} #{} {}", star(post.starred), post.id, post.title));
            lines.push(rule());
            lines.extend(freshness(&view.post));
            lines.push(post.body.clone());
        }
        other => {
            lines.push(format!("Post #{}", post_id));
            lines.push(rule());
            lines.extend(status_line(other, ""));
            return lines.join("\n");
        }
    }

    lines.push(String::new());
    lines.push("Comments".to_string());
    match status_line(&view.comments, "No comments") {
        Some(line) => lines.push(line),
        None => {
            lines.extend(freshness(&view.comments));
            for comment in view.comments.data().into_iter().flatten() {
                lines.push(format!("- {}: {}", comment.title, truncate(&comment.body, 60)));
            }
        }
    }
    lines.join("\n")
}

pub fn starred(view: &StarredView) -> String {
    let mut lines = vec!["Starred posts".to_string(), rule()];

    match status_line(&view.posts, "No starred posts") {
        Some(line) => lines.push(line),
        None => {
            lines.extend(freshness(&view.posts));
            for post in view.posts.data().into_iter().flatten() {
                lines.push(format!(
                    "{} {:>4}  {}",
                    star(post.starred),
                    post.id,
                    truncate(&post.title, 60)
                ));
            }
        }
    }

    if !view.missing.is_empty() {
        let ids: Vec<String> = view.missing.iter().map(|id| id.to_string()).collect();
        lines.push(format!("Not loaded yet: {}", ids.join(", ")));
    }
    lines.join("\n")
}

/// Human-readable error, with per-field lines for validation failures
pub fn error(err: &SyncError) -> String {
    match err {
        SyncError::Validation(fields) => field_errors(fields),
        SyncError::Busy => "A post is already being submitted".to_string(),
        other => format!("✗ {}", other),
    }
}

fn field_errors(fields: &FieldErrors) -> String {
    let mut lines = vec!["✗ Post not submitted:".to_string()];
    if let Some(msg) = &fields.title {
        lines.push(format!("  title {}", msg));
    }
    if let Some(msg) = &fields.body {
        lines.push(format!("  body {}", msg));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use postboard_sync::{Author, Post, PostsPage, Starred};

    fn post(id: u64, starred: bool) -> Starred<Post> {
        Starred {
            item: Post {
                id,
                author_id: 1,
                title: format!("title {}", id),
                body: "body".into(),
            },
            starred,
        }
    }

    #[test]
    fn test_posts_page_with_stars() {
        let view = PostsView {
            author_id: Some(1),
            author_name: Some("Alice".into()),
            posts: ViewState::Ready {
                data: PostsPage {
                    posts: vec![post(1, true), post(2, false)],
                    page: 1,
                    total_pages: 3,
                    total_posts: 10,
                },
                refreshing: false,
                stale_error: None,
            },
        };

        let out = posts(&view);
        assert!(out.starts_with("Posts by Alice (#1)"));
        assert!(out.contains("★    1  title 1"));
        assert!(out.contains("☆    2  title 2"));
        assert!(out.ends_with("Page 1/3 (10 posts)"));
    }

    #[test]
    fn test_empty_author_posts() {
        let view = PostsView {
            author_id: Some(4),
            author_name: None,
            posts: ViewState::Empty,
        };
        assert!(posts(&view).contains("This author has no posts yet"));
    }

    #[test]
    fn test_no_selection() {
        let view = PostsView {
            author_id: None,
            author_name: None,
            posts: ViewState::Idle,
        };
        assert_eq!(posts(&view), "Select an author to see their posts");
    }

    #[test]
    fn test_stale_authors_show_warning() {
        let view = AuthorListView {
            query: String::new(),
            selected: Some(2),
            authors: ViewState::Ready {
                data: vec![
                    Author {
                        id: 1,
                        name: "Alice".into(),
                    },
                    Author {
                        id: 2,
                        name: "Bob".into(),
                    },
                ],
                refreshing: false,
                stale_error: Some(SyncError::fetch("/users", "timeout")),
            },
        };

        let out = authors(&view);
        assert!(out.contains("refresh failed"));
        assert!(out.contains("▸    2  Bob"));
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let err = SyncError::Validation(FieldErrors {
            title: Some("must be at least 2 characters".into()),
            body: None,
        });
        let out = error(&err);
        assert!(out.contains("title must be at least 2 characters"));
        assert!(!out.contains("body"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer title", 10), "a much ...");
    }

    #[test]
    fn test_detail_not_found() {
        let view = DetailView {
            post_id: Some(999),
            post: ViewState::NotFound,
            comments: ViewState::Empty,
        };
        let out = detail(&view);
        assert!(out.contains("Post #999"));
        assert!(out.contains("Not found"));
    }
}
