//! Domain model and wire mapping
//!
//! Each resource kind has a DTO mirroring the REST payload and an explicit
//! mapping function that turns a decoded JSON value into domain values.
//! Missing or mistyped fields fail with [`SyncError::Mapping`](crate::SyncError::Mapping)
//! instead of producing defaults.

pub mod author;
pub mod comment;
pub mod post;

pub use author::{map_authors, Author, AuthorId};
pub use comment::{map_comments, Comment};
pub use post::{map_post, map_posts, NewPost, Post, PostId};

use crate::error::{Result, SyncError};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Entities with a stable numeric identity
pub trait Identified {
    fn id(&self) -> u64;
}

/// Decode a wire value into a DTO, reporting shape problems as mapping errors
pub(crate) fn decode<T: DeserializeOwned>(resource: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| SyncError::mapping(resource, e.to_string()))
}
