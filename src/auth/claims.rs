/// JWT Claims structure
///
/// Payload of an access token: subject, issue and expiry times, the issuer
/// tag, and a per-token id so two tokens minted in the same second differ.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Unique token id
    pub jti: String,
}

impl Claims {
    /// Create new claims valid for `lifetime_seconds` from now
    pub fn new(user_id: Uuid, lifetime_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            exp: now + lifetime_seconds,
            iat: now,
            iss: issuer,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `TokenInvalid` if the subject is not a UUID
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::TokenInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, 3600, "test".to_string());

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, "test");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.exp > chrono::Utc::now().timestamp());
    }

    #[test]
    fn test_claims_in_same_second_are_distinct() {
        let user_id = Uuid::new_v4();
        let first = Claims::new(user_id, 3600, "test".to_string());
        let second = Claims::new(user_id, 3600, "test".to_string());

        assert_ne!(first.jti, second.jti);
        assert_ne!(first, second);
    }

    #[test]
    fn test_user_id_extraction() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, 3600, "test".to_string());

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_invalid_user_id() {
        let mut claims = Claims::new(Uuid::new_v4(), 3600, "test".to_string());
        claims.sub = "invalid-uuid".to_string();

        assert_eq!(claims.user_id(), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let claims = Claims::new(Uuid::new_v4(), -10, "test".to_string());
        assert!(claims.exp <= chrono::Utc::now().timestamp());
    }
}
