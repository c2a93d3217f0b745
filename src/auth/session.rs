/// Session lifecycle: login, refresh, revoke and request authentication
///
/// A session starts at login with one access token and one refresh token.
/// Refresh mints new access tokens from the same refresh token until it
/// expires or is revoked. Revoking only tombstones the refresh token;
/// access tokens already handed out keep working until their own `exp`.

use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::auth::credentials::{extract_api_key, extract_bearer};
use crate::auth::jwt::{generate_access_token, validate_access_token};
use crate::auth::password::verify_password;
use crate::auth::refresh_token::RefreshTokenStore;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};
use crate::store::{User, UserStore};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct SessionManager {
    settings: AuthSettings,
    users: Arc<dyn UserStore>,
    refresh_tokens: RefreshTokenStore,
}

impl SessionManager {
    pub fn new(
        settings: AuthSettings,
        users: Arc<dyn UserStore>,
        refresh_tokens: RefreshTokenStore,
    ) -> Self {
        Self {
            settings,
            users,
            refresh_tokens,
        }
    }

    /// Check email and password, then issue an access and a refresh token
    ///
    /// An unknown email and a wrong password both return
    /// `AuthError::InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let user = match self.users.find_by_email(email).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => return Err(AuthError::InvalidCredentials.into()),
            Err(e) => return Err(e),
        };

        if !verify_password(password, &user.hashed_password)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = generate_access_token(&user.id, None, &self.settings)?;
        let refresh_token = self.refresh_tokens.create(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from the bearer-carried refresh token
    ///
    /// The refresh token itself is left untouched.
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AppError> {
        let refresh_token = extract_bearer(headers)?;
        let user_id = self.refresh_tokens.resolve(&refresh_token).await?;
        let access_token = generate_access_token(&user_id, None, &self.settings)?;

        tracing::info!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke the bearer-carried refresh token
    ///
    /// Succeeds for unknown and already revoked tokens alike; only a missing
    /// or malformed header, or a storage failure, is an error.
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let refresh_token = extract_bearer(headers)?;
        self.refresh_tokens.revoke(&refresh_token).await
    }

    /// Resolve the user behind a bearer access token
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Uuid, AuthError> {
        let token = extract_bearer(headers)?;
        let claims = validate_access_token(&token, &self.settings)?;
        claims.user_id()
    }

    /// Check the `ApiKey` credential against the configured service key
    pub fn verify_api_key(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let key = extract_api_key(headers)?;
        let expected = self.settings.polka_key.as_bytes();

        if bool::from(key.as_bytes().ct_eq(expected)) {
            Ok(())
        } else {
            tracing::warn!("API key mismatch");
            Err(AuthError::InvalidApiKey)
        }
    }
}
