#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use notes_server::db::{
    CredentialStore, Identity, NewNote, NewTag, Note, NoteId, NoteStore, NoteUpdate, Tag, TagId,
    TagStore, TagUpdate, UserId, UserStore, UserUpdate,
};
use notes_server::error::DatabaseError;
use notes_server::{AppState, Settings};

struct UserRow {
    username: String,
    digest: String,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<UserId, UserRow>,
    notes: BTreeMap<NoteId, (UserId, Note)>,
    tags: BTreeMap<TagId, (UserId, Tag)>,
    links: BTreeSet<(NoteId, TagId)>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn not_found(entity: &'static str, key: impl ToString) -> DatabaseError {
    DatabaseError::NotFound {
        entity,
        key: key.to_string(),
    }
}

fn duplicate(entity: &'static str, value: &str) -> DatabaseError {
    DatabaseError::Duplicate {
        entity,
        value: value.to_string(),
    }
}

/// In-memory stand-in for Postgres with the same uniqueness, ownership and
/// cascade rules as the schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub async fn digest_of(&self, id: UserId) -> Option<String> {
        let tables = self.tables.read().await;
        tables.users.get(&id).map(|u| u.digest.clone())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn persist_credential(&self, username: &str, digest: &str) -> Result<Identity, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(duplicate("user", username));
        }
        let id = tables.next_id();
        tables.users.insert(
            id,
            UserRow {
                username: username.to_string(),
                digest: digest.to_string(),
            },
        );
        Ok(Identity {
            id,
            username: username.to_string(),
        })
    }

    async fn find_credential(&self, username: &str, digest: &str) -> Result<Identity, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|(_, u)| u.username == username && u.digest == digest)
            .map(|(id, u)| Identity {
                id: *id,
                username: u.username.clone(),
            })
            .ok_or_else(|| not_found("user", username))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Identity, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .users
            .get(&id)
            .map(|u| Identity {
                id,
                username: u.username.clone(),
            })
            .ok_or_else(|| not_found("user", id))
    }

    async fn list_users(&self) -> Result<Vec<Identity>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .map(|(id, u)| Identity {
                id: *id,
                username: u.username.clone(),
            })
            .collect())
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(username) = &update.username {
            if tables.users.iter().any(|(other, u)| *other != id && &u.username == username) {
                return Err(duplicate("user", username));
            }
        }
        let row = tables.users.get_mut(&id).ok_or_else(|| not_found("user", id))?;
        if let Some(username) = &update.username {
            row.username = username.clone();
        }
        if let Some(digest) = &update.password {
            row.digest = digest.clone();
        }
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> Result<UserId, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or_else(|| not_found("user", id))?;

        let notes: Vec<NoteId> = tables
            .notes
            .iter()
            .filter(|(_, (owner, _))| *owner == id)
            .map(|(note, _)| *note)
            .collect();
        let tags: Vec<TagId> = tables
            .tags
            .iter()
            .filter(|(_, (owner, _))| *owner == id)
            .map(|(tag, _)| *tag)
            .collect();
        tables.notes.retain(|_, (owner, _)| *owner != id);
        tables.tags.retain(|_, (owner, _)| *owner != id);
        tables
            .links
            .retain(|(note, tag)| !notes.contains(note) && !tags.contains(tag));
        Ok(id)
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn create_note(&self, owner: UserId, note: &NewNote) -> Result<Note, DatabaseError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let note = Note {
            id,
            title: note.title.clone(),
            body: note.body.clone(),
        };
        tables.notes.insert(id, (owner, note.clone()));
        Ok(note)
    }

    async fn get_note(&self, owner: UserId, id: NoteId) -> Result<Note, DatabaseError> {
        let tables = self.tables.read().await;
        match tables.notes.get(&id) {
            Some((o, note)) if *o == owner => Ok(note.clone()),
            _ => Err(not_found("note", id)),
        }
    }

    async fn list_notes(&self, owner: UserId) -> Result<Vec<Note>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .notes
            .values()
            .filter(|(o, _)| *o == owner)
            .map(|(_, note)| note.clone())
            .collect())
    }

    async fn update_note(&self, id: NoteId, update: &NoteUpdate) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let (_, note) = tables.notes.get_mut(&id).ok_or_else(|| not_found("note", id))?;
        if let Some(title) = &update.title {
            note.title = title.clone();
        }
        if let Some(body) = &update.body {
            note.body = body.clone();
        }
        Ok(())
    }

    async fn delete_note(&self, owner: UserId, id: NoteId) -> Result<NoteId, DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.notes.get(&id) {
            Some((o, _)) if *o == owner => {
                tables.notes.remove(&id);
                tables.links.retain(|(note, _)| *note != id);
                Ok(id)
            }
            _ => Err(not_found("note", id)),
        }
    }

    async fn attach_tags(&self, note: NoteId, tags: &[TagId]) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        for tag in tags {
            tables.links.insert((note, *tag));
        }
        Ok(())
    }

    async fn detach_tags(&self, note: NoteId, tags: &[TagId]) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        for tag in tags {
            tables.links.remove(&(note, *tag));
        }
        Ok(())
    }

    async fn note_tags(&self, note: NoteId) -> Result<Vec<Tag>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .links
            .iter()
            .filter(|(n, _)| *n == note)
            .filter_map(|(_, tag)| tables.tags.get(tag).map(|(_, t)| t.clone()))
            .collect())
    }
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn create_tag(&self, owner: UserId, tag: &NewTag) -> Result<Tag, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.tags.values().any(|(o, t)| *o == owner && t.name == tag.name) {
            return Err(duplicate("tag", &tag.name));
        }
        let id = tables.next_id();
        let tag = Tag {
            id,
            name: tag.name.clone(),
        };
        tables.tags.insert(id, (owner, tag.clone()));
        Ok(tag)
    }

    async fn get_tag(&self, owner: UserId, id: TagId) -> Result<Tag, DatabaseError> {
        let tables = self.tables.read().await;
        match tables.tags.get(&id) {
            Some((o, tag)) if *o == owner => Ok(tag.clone()),
            _ => Err(not_found("tag", id)),
        }
    }

    async fn list_tags(&self, owner: UserId) -> Result<Vec<Tag>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tags
            .values()
            .filter(|(o, _)| *o == owner)
            .map(|(_, tag)| tag.clone())
            .collect())
    }

    async fn update_tag(&self, id: TagId, update: &TagUpdate) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let owner = tables
            .tags
            .get(&id)
            .map(|(o, _)| *o)
            .ok_or_else(|| not_found("tag", id))?;
        if let Some(name) = &update.name {
            if tables
                .tags
                .iter()
                .any(|(other, (o, t))| *other != id && *o == owner && &t.name == name)
            {
                return Err(duplicate("tag", name));
            }
            if let Some((_, tag)) = tables.tags.get_mut(&id) {
                tag.name = name.clone();
            }
        }
        Ok(())
    }

    async fn delete_tag(&self, owner: UserId, id: TagId) -> Result<TagId, DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.tags.get(&id) {
            Some((o, _)) if *o == owner => {
                tables.tags.remove(&id);
                tables.links.retain(|(_, tag)| *tag != id);
                Ok(id)
            }
            _ => Err(not_found("tag", id)),
        }
    }
}

pub fn test_settings() -> Settings {
    Settings::for_test().expect("Failed to load test settings")
}

/// Fresh application state over an empty in-memory store.
pub fn test_state() -> (web::Data<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let state = AppState::with_store(&test_settings(), store.clone());
    (web::Data::new(state), store)
}

/// Registers `username` and returns a ready-to-send `Authorization` value.
pub async fn bearer_for(state: &AppState, username: &str) -> (UserId, String) {
    let identity = state
        .auth_service
        .register(username, "password123")
        .await
        .expect("Failed to register user");
    let token = state
        .auth_service
        .login(username, "password123")
        .await
        .expect("Failed to log in");
    (identity.id, format!("Bearer {}", token))
}
