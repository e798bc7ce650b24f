//! Storage layer: entities, the partial-update builder, the collaborator
//! traits the services depend on, and their Postgres implementation.

pub mod models;
pub mod operations;
pub mod store;
pub mod update;

pub use models::{
    Credentials, Identity, NewNote, NewTag, Note, NoteId, NoteUpdate, NoteWithTags, Tag, TagId,
    TagUpdate, UserId, UserUpdate,
};
pub use operations::DbOperations;
pub use store::{CredentialStore, NoteStore, TagStore, UserStore};
pub use update::{PartialUpdate, UpdateStatement};
