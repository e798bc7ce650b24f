use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::hasher::PasswordHasher;
use crate::auth::token::TokenCodec;
use crate::config::AuthConfig;
use crate::db::{CredentialStore, Identity, UserId};
use crate::error::{AppError, AuthError, DatabaseError};

/// Registration, login and token verification.
///
/// Password comparison happens in the store (lookup by username and digest),
/// so a wrong username and a wrong password fail the same way.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    codec: TokenCodec,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, codec: TokenCodec) -> Self {
        Self {
            store,
            hasher,
            codec,
        }
    }

    pub fn from_config(store: Arc<dyn CredentialStore>, config: &AuthConfig) -> Self {
        Self::new(
            store,
            PasswordHasher::new(config.password_salt.clone()),
            TokenCodec::from_config(config),
        )
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Identity, AppError> {
        let digest = self.hasher.hash(password);
        let identity = self.store.persist_credential(username, &digest).await?;
        info!("Registered user {} with id {}", identity.username, identity.id);
        Ok(identity)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let digest = self.hasher.hash(password);
        let identity = match self.store.find_credential(username, &digest).await {
            Ok(identity) => identity,
            Err(DatabaseError::NotFound { .. }) => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e.into()),
        };

        let token = self.codec.issue(identity.id, Utc::now())?;
        debug!("Issued token for user {}", identity.id);
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        self.codec
            .verify(token, Utc::now())
            .map_err(AuthError::Unauthorized)
    }
}
