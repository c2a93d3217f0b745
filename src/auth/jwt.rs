/// JWT Token Generation and Validation
///
/// Access tokens are HS256 JWTs signed with the configured secret. They are
/// self-verifying: nothing is stored server-side, so the only way one stops
/// working is its `exp` passing.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::AuthSettings;
use crate::error::AuthError;

/// Resolve the lifetime for a new access token
///
/// Missing or non-positive requests get the configured default; anything
/// longer than the configured maximum is cut down to it.
pub fn access_token_lifetime(requested_seconds: Option<i64>, config: &AuthSettings) -> i64 {
    let max = config.max_access_token_lifetime;
    match requested_seconds {
        Some(seconds) if seconds > 0 => seconds.min(max),
        _ => config.access_token_lifetime.min(max),
    }
}

/// Generate a new access token for a user
///
/// # Arguments
/// * `user_id` - User's UUID, stored as the `sub` claim
/// * `requested_seconds` - Desired lifetime, see [`access_token_lifetime`]
/// * `config` - Auth settings holding the secret and issuer
///
/// # Errors
/// Returns `AuthError::TokenInvalid` if encoding fails
pub fn generate_access_token(
    user_id: &Uuid,
    requested_seconds: Option<i64>,
    config: &AuthSettings,
) -> Result<String, AuthError> {
    let claims = Claims::new(
        *user_id,
        access_token_lifetime(requested_seconds, config),
        config.issuer.clone(),
    );

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("Access token encoding failed: {}", e);
        AuthError::TokenInvalid
    })
}

/// Validate an access token and return its claims
///
/// Checks the signature, the issuer tag and expiry (no leeway), and that the
/// subject is a UUID.
///
/// # Errors
/// * `AuthError::TokenExpired` - signature is good but `exp` has passed
/// * `AuthError::TokenInvalid` - anything else
pub fn validate_access_token(token: &str, config: &AuthSettings) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => {
            tracing::debug!("JWT validation error: {}", e);
            AuthError::TokenInvalid
        }
    })?;

    claims.user_id()?;
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> AuthSettings {
        AuthSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "chirpy".to_string(),
            access_token_lifetime: 3600,
            max_access_token_lifetime: 3600,
            refresh_token_lifetime_days: 60,
            password_cost: 4,
            polka_key: "polka".to_string(),
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_generate_and_validate_token() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let token = generate_access_token(&user_id, None, &config).expect("Failed to generate token");
        let claims = validate_access_token(&token, &config).expect("Failed to validate token");

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.iss, "chirpy");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_back_to_back_tokens_differ() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let first = generate_access_token(&user_id, None, &config).unwrap();
        let second = generate_access_token(&user_id, None, &config).unwrap();

        assert_ne!(first, second);
        assert_eq!(validate_access_token(&second, &config).unwrap().user_id().unwrap(), user_id);
    }

    #[test]
    fn test_lifetime_defaults_and_clamps() {
        let config = get_test_config();

        assert_eq!(access_token_lifetime(None, &config), 3600);
        assert_eq!(access_token_lifetime(Some(0), &config), 3600);
        assert_eq!(access_token_lifetime(Some(-5), &config), 3600);
        assert_eq!(access_token_lifetime(Some(60), &config), 60);
        assert_eq!(access_token_lifetime(Some(86_400), &config), 3600);
    }

    #[test]
    fn test_requested_lifetime_is_encoded() {
        let config = get_test_config();
        let token = generate_access_token(&Uuid::new_v4(), Some(120), &config).unwrap();
        let claims = validate_access_token(&token, &config).unwrap();

        assert_eq!(claims.exp - claims.iat, 120);
    }

    #[test]
    fn test_expired_token() {
        let config = get_test_config();
        let claims = Claims::new(Uuid::new_v4(), -10, config.issuer.clone());
        let token = sign(&claims, &config.secret);

        assert_eq!(
            validate_access_token(&token, &config),
            Err(AuthError::TokenExpired)
        );
    }

    #[tokio::test]
    async fn test_token_expires_after_its_lifetime() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();
        let token = generate_access_token(&user_id, Some(1), &config).unwrap();

        assert!(validate_access_token(&token, &config).is_ok());

        tokio::time::sleep(std::time::Duration::from_millis(2100)).await;
        assert_eq!(
            validate_access_token(&token, &config),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn test_invalid_token() {
        let config = get_test_config();
        let result = validate_access_token("invalid.token.here", &config);

        assert_eq!(result, Err(AuthError::TokenInvalid));
    }

    #[test]
    fn test_tampered_token() {
        let config = get_test_config();
        let token = generate_access_token(&Uuid::new_v4(), None, &config).unwrap();

        let tampered = format!("{}X", token);
        assert_eq!(
            validate_access_token(&tampered, &config),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn test_altered_payload_is_rejected() {
        let config = get_test_config();
        let token = generate_access_token(&Uuid::new_v4(), None, &config).unwrap();

        // Re-sign a different subject under the original signature
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = Claims::new(Uuid::new_v4(), 3600, config.issuer.clone());
        let forged = sign(&forged_claims, &config.secret);
        let forged_payload = forged.split('.').nth(1).unwrap();
        let spliced = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(
            validate_access_token(&spliced, &config),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn test_wrong_secret() {
        let config = get_test_config();
        let token = generate_access_token(&Uuid::new_v4(), None, &config).unwrap();

        let mut other = get_test_config();
        other.secret = "a-completely-different-signing-secret".to_string();
        assert_eq!(
            validate_access_token(&token, &other),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn test_wrong_issuer() {
        let mut config = get_test_config();
        let token = generate_access_token(&Uuid::new_v4(), None, &config).unwrap();

        config.issuer = "wrong-issuer".to_string();
        assert_eq!(
            validate_access_token(&token, &config),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let config = get_test_config();
        let mut claims = Claims::new(Uuid::new_v4(), 3600, config.issuer.clone());
        claims.sub = "admin".to_string();
        let token = sign(&claims, &config.secret);

        assert_eq!(
            validate_access_token(&token, &config),
            Err(AuthError::TokenInvalid)
        );
    }
}
