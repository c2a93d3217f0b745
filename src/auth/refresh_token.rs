/// Refresh Token Management
///
/// Refresh tokens are:
/// - 32 bytes from the OS CSPRNG, hex-encoded (64 characters)
/// - Stored server-side so they can be revoked
/// - Valid for 60 days unless revoked first
/// - Reused across refreshes (no rotation); revocation is a permanent tombstone

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;

use crate::error::{AppError, AuthError};
use crate::store::RefreshTokenRepository;

const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new cryptographically secure refresh token
///
/// # Errors
/// Returns an internal error if the OS random source fails
pub fn generate_refresh_token() -> Result<String, AppError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::Internal(format!("Random source failure: {}", e)))?;
    Ok(hex::encode(bytes))
}

/// A stored refresh token row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    pub fn new(token: String, user_id: Uuid, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            token,
            user_id,
            created_at: now,
            updated_at: now,
            expires_at: now + lifetime,
            revoked_at: None,
        }
    }

    /// Owning user if the token is neither revoked nor expired at `now`
    ///
    /// # Errors
    /// * `AuthError::TokenRevoked` - `revoked_at` is set
    /// * `AuthError::TokenExpired` - `now` is at or past `expires_at`
    pub fn usable_at(&self, now: DateTime<Utc>) -> Result<Uuid, AuthError> {
        if self.revoked_at.is_some() {
            return Err(AuthError::TokenRevoked);
        }
        if now >= self.expires_at {
            return Err(AuthError::TokenExpired);
        }
        Ok(self.user_id)
    }
}

/// Creates, resolves and revokes refresh tokens on top of a repository
///
/// Every operation is a single repository call, so concurrent requests rely
/// on the backend's per-row atomicity and need no locking here.
#[derive(Clone)]
pub struct RefreshTokenStore {
    repository: Arc<dyn RefreshTokenRepository>,
    lifetime: Duration,
}

impl RefreshTokenStore {
    pub fn new(repository: Arc<dyn RefreshTokenRepository>, lifetime: Duration) -> Self {
        Self {
            repository,
            lifetime,
        }
    }

    /// Issue and persist a new refresh token for `user_id`
    ///
    /// Uniqueness is not re-checked; the repository's unique key on `token`
    /// rejects the (practically impossible) collision.
    pub async fn create(&self, user_id: Uuid) -> Result<String, AppError> {
        let token = generate_refresh_token()?;
        let record = RefreshTokenRecord::new(token.clone(), user_id, self.lifetime);
        self.repository.insert(&record).await?;

        tracing::debug!(user_id = %user_id, expires_at = %record.expires_at, "Refresh token issued");
        Ok(token)
    }

    /// Return the owning user of a usable refresh token
    ///
    /// # Errors
    /// `TokenNotFound`, `TokenRevoked` or `TokenExpired`; storage failures
    /// come back as `AppError::Database`
    pub async fn resolve(&self, token: &str) -> Result<Uuid, AppError> {
        let record = match self.repository.find(token).await? {
            Some(record) => record,
            None => {
                tracing::warn!("Refresh token not found");
                return Err(AuthError::TokenNotFound.into());
            }
        };

        record.usable_at(Utc::now()).map_err(|e| {
            match e {
                AuthError::TokenRevoked => {
                    tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token")
                }
                _ => tracing::info!(user_id = %record.user_id, "Refresh token expired"),
            }
            AppError::Auth(e)
        })
    }

    /// Tombstone a refresh token
    ///
    /// Revoking an unknown or already revoked token succeeds without change.
    pub async fn revoke(&self, token: &str) -> Result<(), AppError> {
        self.repository.mark_revoked(token, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryRefreshTokenRepository;

    fn store(lifetime: Duration) -> (RefreshTokenStore, Arc<MemoryRefreshTokenRepository>) {
        let repository = Arc::new(MemoryRefreshTokenRepository::default());
        (
            RefreshTokenStore::new(repository.clone(), lifetime),
            repository,
        )
    }

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token().unwrap();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(hex::decode(&token).is_ok());
    }

    #[test]
    fn test_tokens_are_unique() {
        let first = generate_refresh_token().unwrap();
        let second = generate_refresh_token().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_record_usability() {
        let user_id = Uuid::new_v4();
        let mut record = RefreshTokenRecord::new("t".to_string(), user_id, Duration::days(60));
        let now = Utc::now();

        assert_eq!(record.expires_at - record.created_at, Duration::days(60));
        assert_eq!(record.usable_at(now), Ok(user_id));
        assert_eq!(
            record.usable_at(record.expires_at),
            Err(AuthError::TokenExpired)
        );

        record.revoked_at = Some(now);
        assert_eq!(record.usable_at(now), Err(AuthError::TokenRevoked));
    }

    #[tokio::test]
    async fn test_create_then_resolve() {
        let (store, _) = store(Duration::days(60));
        let user_id = Uuid::new_v4();

        let token = store.create(user_id).await.unwrap();
        assert_eq!(store.resolve(&token).await.unwrap(), user_id);
        // Resolving does not consume the token
        assert_eq!(store.resolve(&token).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_unknown_token_not_found() {
        let (store, _) = store(Duration::days(60));

        let err = store.resolve("deadbeef").await.unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::TokenNotFound)));
    }

    #[tokio::test]
    async fn test_revoke_then_resolve_fails() {
        let (store, _) = store(Duration::days(60));
        let token = store.create(Uuid::new_v4()).await.unwrap();

        store.revoke(&token).await.unwrap();

        let err = store.resolve(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::TokenRevoked)));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let (store, repository) = store(Duration::days(60));
        let token = store.create(Uuid::new_v4()).await.unwrap();

        store.revoke(&token).await.unwrap();
        let first = repository.find(&token).await.unwrap().unwrap();

        store.revoke(&token).await.unwrap();
        let second = repository.find(&token).await.unwrap().unwrap();

        assert!(first.revoked_at.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_revoke_unknown_token_is_noop() {
        let (store, _) = store(Duration::days(60));
        assert!(store.revoke("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let (store, _) = store(Duration::seconds(-1));
        let token = store.create(Uuid::new_v4()).await.unwrap();

        let err = store.resolve(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_revoked_wins_over_expired() {
        let (store, _) = store(Duration::seconds(-1));
        let token = store.create(Uuid::new_v4()).await.unwrap();
        store.revoke(&token).await.unwrap();

        let err = store.resolve(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::TokenRevoked)));
    }
}
