//! Storage collaborators consumed by the services. `DbOperations` implements
//! all of them against Postgres; tests plug in mocks or an in-memory store.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::db::models::{
    Identity, NewNote, NewTag, Note, NoteId, NoteUpdate, Tag, TagId, TagUpdate, UserId, UserUpdate,
};
use crate::error::DatabaseError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `Duplicate` when the username is taken.
    async fn persist_credential(&self, username: &str, digest: &str) -> Result<Identity, DatabaseError>;

    /// Exact match on username and digest. Fails with `NotFound` otherwise.
    async fn find_credential(&self, username: &str, digest: &str) -> Result<Identity, DatabaseError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: UserId) -> Result<Identity, DatabaseError>;

    async fn list_users(&self) -> Result<Vec<Identity>, DatabaseError>;

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<(), DatabaseError>;

    async fn delete_user(&self, id: UserId) -> Result<UserId, DatabaseError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn create_note(&self, owner: UserId, note: &NewNote) -> Result<Note, DatabaseError>;

    async fn get_note(&self, owner: UserId, id: NoteId) -> Result<Note, DatabaseError>;

    async fn list_notes(&self, owner: UserId) -> Result<Vec<Note>, DatabaseError>;

    /// Ownership is checked by the caller; this touches the row by id only.
    async fn update_note(&self, id: NoteId, update: &NoteUpdate) -> Result<(), DatabaseError>;

    async fn delete_note(&self, owner: UserId, id: NoteId) -> Result<NoteId, DatabaseError>;

    async fn attach_tags(&self, note: NoteId, tags: &[TagId]) -> Result<(), DatabaseError>;

    async fn detach_tags(&self, note: NoteId, tags: &[TagId]) -> Result<(), DatabaseError>;

    async fn note_tags(&self, note: NoteId) -> Result<Vec<Tag>, DatabaseError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn create_tag(&self, owner: UserId, tag: &NewTag) -> Result<Tag, DatabaseError>;

    async fn get_tag(&self, owner: UserId, id: TagId) -> Result<Tag, DatabaseError>;

    async fn list_tags(&self, owner: UserId) -> Result<Vec<Tag>, DatabaseError>;

    async fn update_tag(&self, id: TagId, update: &TagUpdate) -> Result<(), DatabaseError>;

    async fn delete_tag(&self, owner: UserId, id: TagId) -> Result<TagId, DatabaseError>;
}
