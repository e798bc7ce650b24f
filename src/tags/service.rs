use std::sync::Arc;
use tracing::info;

use crate::db::{NewTag, Tag, TagId, TagStore, TagUpdate, UserId};
use crate::error::AppError;

pub struct TagService {
    tags: Arc<dyn TagStore>,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagStore>) -> Self {
        Self { tags }
    }

    pub async fn create(&self, owner: UserId, tag: &NewTag) -> Result<Tag, AppError> {
        let tag = self.tags.create_tag(owner, tag).await?;
        info!("User {} created tag {}", owner, tag.id);
        Ok(tag)
    }

    pub async fn get(&self, owner: UserId, id: TagId) -> Result<Tag, AppError> {
        Ok(self.tags.get_tag(owner, id).await?)
    }

    pub async fn list(&self, owner: UserId) -> Result<Vec<Tag>, AppError> {
        Ok(self.tags.list_tags(owner).await?)
    }

    pub async fn update(&self, owner: UserId, id: TagId, update: &TagUpdate) -> Result<Tag, AppError> {
        self.tags.get_tag(owner, id).await?;
        self.tags.update_tag(id, update).await?;
        Ok(self.tags.get_tag(owner, id).await?)
    }

    pub async fn delete(&self, owner: UserId, id: TagId) -> Result<TagId, AppError> {
        let deleted = self.tags.delete_tag(owner, id).await?;
        info!("User {} deleted tag {}", owner, deleted);
        Ok(deleted)
    }
}
