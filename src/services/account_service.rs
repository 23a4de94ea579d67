use std::sync::Arc;

use crate::api::payload::Registration;
use crate::auth::{hash_password, verify_password, AuthError};
use crate::database::models::{NewUser, User};
use crate::database::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Account creation and credential checks, shared by the HTTP handlers and
/// the `create-user` command
pub struct AccountService {
    store: Arc<dyn Store>,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// Hash the password and insert the user. Fails with
    /// [`StoreError::UsernameTaken`] when the name is in use.
    pub async fn register(&self, registration: Registration) -> Result<User, AccountError> {
        if self.store.find_user_by_username(&registration.username).await?.is_some() {
            return Err(StoreError::UsernameTaken(registration.username).into());
        }

        let password_hash = hash_password(registration.password, self.bcrypt_cost).await?;
        let user = self
            .store
            .create_user(NewUser {
                username: registration.username,
                email: registration.email,
                password_hash,
            })
            .await?;

        tracing::info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// Look up a user by name and check the password. Unknown users and wrong
    /// passwords fail the same way.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AccountError> {
        let Some(user) = self.store.find_user_by_username(username).await? else {
            tracing::warn!("Login attempt for unknown user {:?}", username);
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            tracing::warn!("Wrong password for user {}", user.username);
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(user)
    }
}
