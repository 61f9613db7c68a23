//! Cache keys: a resource kind plus its parameters

use crate::model::{AuthorId, PostId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of remote resource a key addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Users,
    Posts,
    Post,
    Comments,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Users => write!(f, "users"),
            ResourceKind::Posts => write!(f, "posts"),
            ResourceKind::Post => write!(f, "post"),
            ResourceKind::Comments => write!(f, "comments"),
        }
    }
}

/// Identity of a cache entry
///
/// Two keys are equal iff their kind and parameters are structurally equal,
/// so `Posts { author_id: Some(3) }` and `Posts { author_id: None }` are
/// distinct entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CacheKey {
    Users,
    Posts {
        #[serde(rename = "authorId")]
        author_id: Option<AuthorId>,
    },
    Post {
        id: PostId,
    },
    Comments {
        #[serde(rename = "postId")]
        post_id: PostId,
    },
}

impl CacheKey {
    /// Posts written by one author
    pub fn posts_by(author_id: AuthorId) -> Self {
        CacheKey::Posts {
            author_id: Some(author_id),
        }
    }

    /// Every post regardless of author
    pub fn all_posts() -> Self {
        CacheKey::Posts { author_id: None }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            CacheKey::Users => ResourceKind::Users,
            CacheKey::Posts { .. } => ResourceKind::Posts,
            CacheKey::Post { .. } => ResourceKind::Post,
            CacheKey::Comments { .. } => ResourceKind::Comments,
        }
    }

    /// REST path (relative to the base URL) that serves this key
    pub fn path(&self) -> String {
        match self {
            CacheKey::Users => "/users".to_string(),
            CacheKey::Posts { author_id: None } => "/posts".to_string(),
            CacheKey::Posts {
                author_id: Some(id),
            } => format!("/posts?userId={}", id),
            CacheKey::Post { id } => format!("/posts/{}", id),
            CacheKey::Comments { post_id } => format!("/posts/{}/comments", post_id),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Users => write!(f, "users"),
            CacheKey::Posts { author_id: None } => write!(f, "posts"),
            CacheKey::Posts {
                author_id: Some(id),
            } => write!(f, "posts{{authorId={}}}", id),
            CacheKey::Post { id } => write!(f, "post{{id={}}}", id),
            CacheKey::Comments { post_id } => write!(f, "comments{{postId={}}}", post_id),
        }
    }
}
