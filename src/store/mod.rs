/// Storage Module
///
/// Interfaces for users, chirps and refresh tokens.
///
/// Each trait has a Postgres implementation for production and an in-memory
/// one for tests and local runs. Missing rows are reported as
/// `DatabaseError::NotFound`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::RefreshTokenRecord;
use crate::error::AppError;

pub mod memory;
pub mod postgres;

/// A registered user
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_chirpy_red: bool,
}

/// A short message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Insert a user; a taken email is a unique-constraint violation.
    async fn create(&self, email: &str, hashed_password: &str) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<User, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<User, AppError>;

    /// Change email and/or password hash; `None` leaves the field as is.
    async fn update(
        &self,
        id: Uuid,
        email: Option<&str>,
        hashed_password: Option<&str>,
    ) -> Result<User, AppError>;

    async fn upgrade_to_red(&self, id: Uuid) -> Result<User, AppError>;
}

#[async_trait]
pub trait ChirpStore: Send + Sync + 'static {
    async fn create(&self, user_id: Uuid, body: &str) -> Result<Chirp, AppError>;

    /// All chirps, or one author's, oldest first.
    async fn list(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Chirp, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

/// Row-level access to the `refresh_tokens` table
///
/// Each method maps to one atomic statement keyed by the token value.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync + 'static {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;

    async fn find(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AppError>;

    /// Set `revoked_at` if it is still unset; unknown tokens are ignored.
    async fn mark_revoked(&self, token: &str, at: DateTime<Utc>) -> Result<(), AppError>;
}

/// The set of stores the application runs against
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub chirps: Arc<dyn ChirpStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserStore::new(pool.clone())),
            chirps: Arc::new(postgres::PgChirpStore::new(pool.clone())),
            refresh_tokens: Arc::new(postgres::PgRefreshTokenRepository::new(pool)),
        }
    }

    pub fn memory() -> Self {
        Self {
            users: Arc::new(memory::MemoryUserStore::default()),
            chirps: Arc::new(memory::MemoryChirpStore::default()),
            refresh_tokens: Arc::new(memory::MemoryRefreshTokenRepository::default()),
        }
    }
}
