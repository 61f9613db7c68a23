//! Comments (`/posts/<id>/comments`)

use super::{decode, PostId};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A comment under a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub post_id: PostId,
    pub title: String,
    pub body: String,
}

/// Comment ids arrive as numbers from some deployments and strings from others
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(u64),
    Text(String),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentDto {
    id: WireId,
    post_id: PostId,
    #[serde(alias = "name")]
    title: String,
    body: String,
}

/// Map a `GET /posts/<id>/comments` payload
pub fn map_comments(value: Value) -> Result<Vec<Comment>> {
    let dtos: Vec<CommentDto> = decode("comments", value)?;
    Ok(dtos
        .into_iter()
        .map(|dto| Comment {
            id: dto.id.into(),
            post_id: dto.post_id,
            title: dto.title,
            body: dto.body,
        })
        .collect())
}
