//! In-memory authenticator.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use examgate_core::error::AuthError;
use examgate_core::traits::{AuthenticatedUser, Authenticator};

/// Process-local [`Authenticator`] mirroring the identity provider's
/// register/login pair. Credentials are held in memory only; this backs
/// tests and local runs, not production.
#[derive(Default)]
pub struct InMemoryAuth {
    /// email -> (user id, password)
    users: RwLock<HashMap<String, (String, String)>>,
}

impl InMemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Authenticator for InMemoryAuth {
    async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedUser, AuthError> {
        let users = self.users.read().await;
        match users.get(email) {
            Some((user_id, stored)) if stored == password => Ok(AuthenticatedUser {
                user_id: user_id.clone(),
                email: email.to_string(),
            }),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(AuthError::EmailAlreadyRegistered(email.to_string()));
        }
        let user_id = format!("user-{}", users.len() + 1);
        users.insert(
            email.to_string(),
            (user_id.clone(), password.to_string()),
        );
        Ok(AuthenticatedUser {
            user_id,
            email: email.to_string(),
        })
    }
}
