/// In-memory stores for tests and `storage: memory` runs
///
/// Each map sits behind a single `RwLock` held for one operation only, which
/// gives the same per-row atomicity the Postgres stores rely on.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Chirp, ChirpStore, RefreshTokenRepository, User, UserStore};
use crate::auth::RefreshTokenRecord;
use crate::error::{AppError, DatabaseError};

fn not_found(what: &str) -> AppError {
    AppError::Database(DatabaseError::NotFound(format!("{} not found", what)))
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|user| user.email == email) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "users_email_key".to_string(),
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        self.users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned()
            .ok_or_else(|| not_found("user"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("user"))
    }

    async fn update(
        &self,
        id: Uuid,
        email: Option<&str>,
        hashed_password: Option<&str>,
    ) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if let Some(email) = email {
            if users.values().any(|user| user.email == email && user.id != id) {
                return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                    "users_email_key".to_string(),
                )));
            }
        }

        let user = users.get_mut(&id).ok_or_else(|| not_found("user"))?;
        if let Some(email) = email {
            user.email = email.to_string();
        }
        if let Some(hashed_password) = hashed_password {
            user.hashed_password = hashed_password.to_string();
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn upgrade_to_red(&self, id: Uuid) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or_else(|| not_found("user"))?;
        user.is_chirpy_red = true;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[derive(Default)]
pub struct MemoryChirpStore {
    chirps: RwLock<Vec<Chirp>>,
}

#[async_trait]
impl ChirpStore for MemoryChirpStore {
    async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, AppError> {
        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        self.chirps.write().await.push(chirp.clone());
        Ok(chirp)
    }

    async fn list(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, AppError> {
        let mut chirps: Vec<Chirp> = self
            .chirps
            .read()
            .await
            .iter()
            .filter(|chirp| author_id.map_or(true, |author| chirp.user_id == author))
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps
        chirps.sort_by_key(|chirp| chirp.created_at);
        Ok(chirps)
    }

    async fn get(&self, id: Uuid) -> Result<Chirp, AppError> {
        self.chirps
            .read()
            .await
            .iter()
            .find(|chirp| chirp.id == id)
            .cloned()
            .ok_or_else(|| not_found("chirp"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut chirps = self.chirps.write().await;
        let before = chirps.len();
        chirps.retain(|chirp| chirp.id != id);
        if chirps.len() == before {
            return Err(not_found("chirp"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRefreshTokenRepository {
    tokens: RwLock<HashMap<String, RefreshTokenRecord>>,
}

#[async_trait]
impl RefreshTokenRepository for MemoryRefreshTokenRepository {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), AppError> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&record.token) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "refresh_tokens_pkey".to_string(),
            )));
        }
        tokens.insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError> {
        Ok(self.tokens.read().await.get(token).cloned())
    }

    async fn mark_revoked(&self, token: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        if let Some(record) = self.tokens.write().await.get_mut(token) {
            if record.revoked_at.is_none() {
                record.revoked_at = Some(at);
                record.updated_at = at;
            }
        }
        Ok(())
    }
}
