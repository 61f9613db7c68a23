//! Authors (`/users`)

use super::{decode, Identified};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type AuthorId = u64;

/// An author as shown in the master list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
}

impl Identified for Author {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Wire shape of a user record; extra fields are ignored
#[derive(Debug, Deserialize)]
struct UserDto {
    id: AuthorId,
    name: String,
}

impl From<UserDto> for Author {
    fn from(dto: UserDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
        }
    }
}

/// Map a `GET /users` payload
pub fn map_authors(value: Value) -> Result<Vec<Author>> {
    let dtos: Vec<UserDto> = decode("users", value)?;
    Ok(dtos.into_iter().map(Author::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_authors_ignores_extra_fields() {
        let value = json!([
            {"id": 1, "name": "Leanne Graham", "username": "Bret", "email": "a@b.c"},
            {"id": 2, "name": "Ervin Howell"}
        ]);

        let authors = map_authors(value).unwrap();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0], Author { id: 1, name: "Leanne Graham".into() });
    }

    #[test]
    fn test_map_authors_missing_name() {
        let value = json!([{"id": 1}]);
        let err = map_authors(value).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_map_authors_not_a_list() {
        assert!(map_authors(json!({"id": 1, "name": "x"})).is_err());
    }
}
