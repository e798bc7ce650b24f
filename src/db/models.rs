use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

pub type UserId = i64;
pub type NoteId = i64;
pub type TagId = i64;

/// A registered user as exposed to clients. The password digest never
/// leaves the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteWithTags {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    pub tags: Vec<Tag>,
}

impl NoteWithTags {
    pub fn new(note: Note, tags: Vec<Tag>) -> Self {
        Self {
            id: note.id,
            title: note.title,
            body: note.body,
            tags,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), AppError> {
        require("username", &self.username)?;
        require("password", &self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewNote {
    pub title: String,
    pub body: String,
}

impl NewNote {
    pub fn validate(&self) -> Result<(), AppError> {
        require("title", &self.title)?;
        require("body", &self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTag {
    pub name: String,
}

impl NewTag {
    pub fn validate(&self) -> Result<(), AppError> {
        require("name", &self.name)
    }
}

// Sparse update records: `None` leaves the column alone, `Some` (even an
// empty string) overwrites it.

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NoteUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TagUpdate {
    #[serde(default)]
    pub name: Option<String>,
}

/// When this reaches the store, `password` already holds a digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::ValidationError(format!("field '{}' is required", field)));
    }
    Ok(())
}
