//! Master/detail selection state

use crate::model::{AuthorId, PostId};
use crate::routing::RouteParams;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Selected author, selected post and current page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub author_id: Option<AuthorId>,
    pub post_id: Option<PostId>,

    /// 1-based
    pub page: usize,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            author_id: None,
            post_id: None,
            page: 1,
        }
    }
}

/// Tracks which author and post the user is looking at
///
/// Changing the author resets the page. While no author is selected the
/// session issues no posts request.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: SelectionState,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the route the application was opened at
    pub fn from_route(params: RouteParams) -> Self {
        Self {
            state: SelectionState {
                author_id: params.author_id,
                post_id: params.post_id,
                page: 1,
            },
        }
    }

    /// Select `author_id`; returns whether the selection changed
    pub fn select(&mut self, author_id: AuthorId) -> bool {
        if self.state.author_id == Some(author_id) {
            return false;
        }
        debug!(author_id, "selected author");
        self.state.author_id = Some(author_id);
        self.state.page = 1;
        true
    }

    pub fn clear(&mut self) {
        debug!("cleared author selection");
        self.state.author_id = None;
        self.state.page = 1;
    }

    pub fn current_author_id(&self) -> Option<AuthorId> {
        self.state.author_id
    }

    pub fn current_page(&self) -> usize {
        self.state.page
    }

    /// Request a page; clamped on the next recompute
    pub fn set_page(&mut self, page: usize) {
        self.state.page = page.max(1);
    }

    /// Clamp the page into `[1, total_pages]` and return it
    pub fn clamp_page(&mut self, total_pages: usize) -> usize {
        self.state.page = self.state.page.clamp(1, total_pages.max(1));
        self.state.page
    }

    pub fn open_post(&mut self, post_id: PostId) {
        self.state.post_id = Some(post_id);
    }

    pub fn close_post(&mut self) {
        self.state.post_id = None;
    }

    pub fn current_post_id(&self) -> Option<PostId> {
        self.state.post_id
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }
}
