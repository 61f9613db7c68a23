//! Posts (`/posts`, `/posts/<id>`)

use super::{decode, AuthorId, Identified};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub type PostId = u64;

/// A post; the starred marker is never stored here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub author_id: AuthorId,
    pub title: String,
    pub body: String,
}

impl Identified for Post {
    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostDto {
    id: PostId,
    user_id: AuthorId,
    title: String,
    body: String,
}

impl From<PostDto> for Post {
    fn from(dto: PostDto) -> Self {
        Self {
            id: dto.id,
            author_id: dto.user_id,
            title: dto.title,
            body: dto.body,
        }
    }
}

/// Map a `GET /posts` payload
pub fn map_posts(value: Value) -> Result<Vec<Post>> {
    let dtos: Vec<PostDto> = decode("posts", value)?;
    Ok(dtos.into_iter().map(Post::from).collect())
}

/// Map a single post, as returned by `GET /posts/<id>` or echoed by `POST /posts`
pub fn map_post(value: Value) -> Result<Post> {
    let dto: PostDto = decode("post", value)?;
    Ok(dto.into())
}

/// Fields of the new-post form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub author_id: AuthorId,
    pub title: String,
    pub body: String,
}

impl NewPost {
    pub fn new(author_id: AuthorId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author_id,
            title: title.into(),
            body: body.into(),
        }
    }

    /// Request body for `POST /posts`
    pub fn to_wire(&self) -> Value {
        json!({
            "title": self.title.trim(),
            "body": self.body.trim(),
            "userId": self.author_id,
        })
    }
}
