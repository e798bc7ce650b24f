use std::sync::Arc;
use tracing::info;

use crate::db::{
    NewNote, Note, NoteId, NoteStore, NoteUpdate, NoteWithTags, TagId, TagStore, UserId,
};
use crate::error::AppError;

/// Caller-scoped note operations. Every lookup is filtered by owner, so
/// another user's note reads as "not found".
pub struct NoteService {
    notes: Arc<dyn NoteStore>,
    tags: Arc<dyn TagStore>,
}

impl NoteService {
    pub fn new(notes: Arc<dyn NoteStore>, tags: Arc<dyn TagStore>) -> Self {
        Self { notes, tags }
    }

    pub async fn create(&self, owner: UserId, note: &NewNote) -> Result<Note, AppError> {
        let note = self.notes.create_note(owner, note).await?;
        info!("User {} created note {}", owner, note.id);
        Ok(note)
    }

    pub async fn get(&self, owner: UserId, id: NoteId) -> Result<Note, AppError> {
        Ok(self.notes.get_note(owner, id).await?)
    }

    pub async fn list(&self, owner: UserId) -> Result<Vec<Note>, AppError> {
        Ok(self.notes.list_notes(owner).await?)
    }

    /// Applies a sparse update and returns the note as stored afterwards.
    pub async fn update(&self, owner: UserId, id: NoteId, update: &NoteUpdate) -> Result<Note, AppError> {
        self.notes.get_note(owner, id).await?;
        self.notes.update_note(id, update).await?;
        Ok(self.notes.get_note(owner, id).await?)
    }

    pub async fn delete(&self, owner: UserId, id: NoteId) -> Result<NoteId, AppError> {
        let deleted = self.notes.delete_note(owner, id).await?;
        info!("User {} deleted note {}", owner, deleted);
        Ok(deleted)
    }

    pub async fn set_tags(
        &self,
        owner: UserId,
        id: NoteId,
        tags: &[TagId],
    ) -> Result<NoteWithTags, AppError> {
        self.check_tags(owner, id, tags).await?;
        self.notes.attach_tags(id, tags).await?;
        self.with_tags(owner, id).await
    }

    pub async fn remove_tags(
        &self,
        owner: UserId,
        id: NoteId,
        tags: &[TagId],
    ) -> Result<NoteWithTags, AppError> {
        self.check_tags(owner, id, tags).await?;
        self.notes.detach_tags(id, tags).await?;
        self.with_tags(owner, id).await
    }

    pub async fn with_tags(&self, owner: UserId, id: NoteId) -> Result<NoteWithTags, AppError> {
        let note = self.notes.get_note(owner, id).await?;
        let tags = self.notes.note_tags(id).await?;
        Ok(NoteWithTags::new(note, tags))
    }

    pub async fn all_with_tags(&self, owner: UserId) -> Result<Vec<NoteWithTags>, AppError> {
        let notes = self.notes.list_notes(owner).await?;
        let mut result = Vec::with_capacity(notes.len());
        for note in notes {
            let tags = self.notes.note_tags(note.id).await?;
            result.push(NoteWithTags::new(note, tags));
        }
        Ok(result)
    }

    // Both the note and every tag must belong to the caller.
    async fn check_tags(&self, owner: UserId, id: NoteId, tags: &[TagId]) -> Result<(), AppError> {
        if tags.is_empty() {
            return Err(AppError::ValidationError("at least one tag is required".into()));
        }
        self.notes.get_note(owner, id).await?;
        for tag in tags {
            self.tags.get_tag(owner, *tag).await?;
        }
        Ok(())
    }
}
