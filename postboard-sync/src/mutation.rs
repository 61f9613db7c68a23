//! New-post submission with optimistic cache update
//!
//! The coordinator validates locally, submits once, and on success writes the
//! created post straight into the owning author's cached list. It never
//! touches star flags or pagination.

use crate::cache::{CacheKey, InvalidationReason, RemoteCollectionCache};
use crate::config::ClientConfig;
use crate::error::{FieldErrors, Result, SyncError};
use crate::model::{map_post, NewPost, Post};
use crate::transport::Backend;
use parking_lot::Mutex;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Coordinator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    Validating,
    /// Waiting on the response for `ticket`
    Submitting { ticket: u64 },
}

/// Outcome of a submission that reached the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The created post was written into the cache
    Applied(Post),
    /// The form was abandoned before the response arrived; cache untouched
    Discarded(Post),
}

impl Submission {
    pub fn post(&self) -> &Post {
        match self {
            Submission::Applied(post) | Submission::Discarded(post) => post,
        }
    }
}

/// Length bounds for the new-post form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    pub title_len: RangeInclusive<usize>,
    pub body_len: RangeInclusive<usize>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl ValidationRules {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            title_len: config.title_len.clone(),
            body_len: config.body_len.clone(),
        }
    }

    /// Check both fields; lengths are characters of the trimmed text
    pub fn validate(&self, fields: &NewPost) -> std::result::Result<(), FieldErrors> {
        let errors = FieldErrors {
            title: check_len(&fields.title, &self.title_len),
            body: check_len(&fields.body, &self.body_len),
        };

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_len(text: &str, bounds: &RangeInclusive<usize>) -> Option<String> {
    let len = text.trim().chars().count();
    if len < *bounds.start() {
        Some(format!("must be at least {} characters", bounds.start()))
    } else if len > *bounds.end() {
        Some(format!("must be at most {} characters", bounds.end()))
    } else {
        None
    }
}

/// Returns the coordinator to idle when its submission ends, including when
/// the submitting future is dropped before the response arrives
struct SubmitGuard<'a> {
    state: &'a Mutex<MutationState>,
    ticket: u64,
}

impl SubmitGuard<'_> {
    /// Back to idle; `false` if the submission was abandoned or replaced
    fn finish(&self) -> bool {
        let mut state = self.state.lock();
        if *state == (MutationState::Submitting { ticket: self.ticket }) {
            *state = MutationState::Idle;
            true
        } else {
            false
        }
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if self.finish() {
            debug!(ticket = self.ticket, "submission dropped before its response");
        }
    }
}

/// Drives one new-post form
pub struct MutationCoordinator {
    backend: Arc<dyn Backend>,
    posts: Arc<RemoteCollectionCache<Vec<Post>>>,
    rules: ValidationRules,
    state: Mutex<MutationState>,
    next_ticket: Mutex<u64>,
}

impl MutationCoordinator {
    pub fn new(
        backend: Arc<dyn Backend>,
        posts: Arc<RemoteCollectionCache<Vec<Post>>>,
        rules: ValidationRules,
    ) -> Self {
        Self {
            backend,
            posts,
            rules,
            state: Mutex::new(MutationState::Idle),
            next_ticket: Mutex::new(0),
        }
    }

    pub fn state(&self) -> MutationState {
        *self.state.lock()
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Validate and submit `fields`
    ///
    /// Invalid fields are rejected with [`SyncError::Validation`] before any
    /// request is made. A call while another submission is in flight fails
    /// with [`SyncError::Busy`]. On failure the cache is left unchanged.
    pub async fn submit(&self, fields: NewPost) -> Result<Submission> {
        let ticket = self.begin(&fields)?;
        let submitting = SubmitGuard {
            state: &self.state,
            ticket,
        };

        let result = match self.backend.post_json("/posts", fields.to_wire()).await {
            Ok(value) => map_post(value),
            Err(e) => Err(e),
        };

        let current = submitting.finish();

        match result {
            Ok(post) if current => {
                self.apply(&post);
                info!(post_id = post.id, author_id = post.author_id, "created post");
                Ok(Submission::Applied(post))
            }
            Ok(post) => {
                debug!(post_id = post.id, "discarding response for abandoned submission");
                Ok(Submission::Discarded(post))
            }
            Err(e) => {
                warn!(author_id = fields.author_id, "failed to create post: {}", e);
                Err(e)
            }
        }
    }

    /// Return to idle; an in-flight response will not touch the cache
    pub fn abandon(&self) {
        let mut state = self.state.lock();
        if let MutationState::Submitting { ticket } = *state {
            debug!(ticket, "abandoning submission");
        }
        *state = MutationState::Idle;
    }

    fn begin(&self, fields: &NewPost) -> Result<u64> {
        let mut state = self.state.lock();
        if matches!(*state, MutationState::Submitting { .. }) {
            return Err(SyncError::Busy);
        }

        *state = MutationState::Validating;
        if let Err(errors) = self.rules.validate(fields) {
            *state = MutationState::Idle;
            debug!("rejected new post: {}", errors);
            return Err(SyncError::Validation(errors));
        }

        let ticket = {
            let mut next = self.next_ticket.lock();
            *next += 1;
            *next
        };
        *state = MutationState::Submitting { ticket };
        Ok(ticket)
    }

    fn apply(&self, post: &Post) {
        let created = post.clone();
        self.posts.patch(&CacheKey::posts_by(post.author_id), move |existing| {
            let mut posts = Vec::with_capacity(existing.map_or(0, Vec::len) + 1);
            posts.push(created.clone());
            posts.extend(
                existing
                    .into_iter()
                    .flatten()
                    .filter(|p| p.id != created.id)
                    .cloned(),
            );
            posts
        });

        self.posts.invalidate_with(
            &CacheKey::all_posts(),
            InvalidationReason::PostCreated { post_id: post.id },
        );
    }
}
