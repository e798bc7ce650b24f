use std::sync::Arc;
use tracing::info;

use crate::auth::PasswordHasher;
use crate::db::{Identity, UserId, UserStore, UserUpdate};
use crate::error::AppError;

/// User administration. Passwords arriving in an update are hashed with the
/// same hasher used at registration before they reach the store.
pub struct UserService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    pub async fn get(&self, id: UserId) -> Result<Identity, AppError> {
        Ok(self.users.get_user(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Identity>, AppError> {
        Ok(self.users.list_users().await?)
    }

    pub async fn update(&self, id: UserId, update: UserUpdate) -> Result<Identity, AppError> {
        self.users.get_user(id).await?;

        let update = UserUpdate {
            password: update.password.map(|p| self.hasher.hash(&p)),
            ..update
        };
        self.users.update_user(id, &update).await?;
        info!("Updated user {}", id);

        Ok(self.users.get_user(id).await?)
    }

    pub async fn delete(&self, id: UserId) -> Result<UserId, AppError> {
        self.users.get_user(id).await?;
        let deleted = self.users.delete_user(id).await?;
        info!("Deleted user {}", deleted);
        Ok(deleted)
    }
}
