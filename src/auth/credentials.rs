/// Credential extraction from the `Authorization` header
///
/// Pure parsing: these functions only look at header shape, never at whether
/// the token inside is valid.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

const BEARER_SCHEME: &str = "Bearer";
const API_KEY_SCHEME: &str = "ApiKey";

/// Pull the token out of `Authorization: Bearer <token>`
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_scheme(headers, BEARER_SCHEME)
}

/// Pull the key out of `Authorization: ApiKey <key>`
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_scheme(headers, API_KEY_SCHEME)
}

/// The header value must split on whitespace into exactly `<scheme> <token>`.
fn extract_scheme(headers: &HeaderMap, scheme: &str) -> Result<String, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MalformedCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredential)?;

    let mut fields = value.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(tag), Some(token), None) if tag == scheme => Ok(token.to_string()),
        _ => Err(AuthError::MalformedCredential),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer() {
        let headers = headers_with("Bearer abc123");
        assert_eq!(extract_bearer(&headers).unwrap(), "abc123");
    }

    #[test]
    fn test_extra_whitespace_is_tolerated() {
        let headers = headers_with("  Bearer    abc123  ");
        assert_eq!(extract_bearer(&headers).unwrap(), "abc123");
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            extract_bearer(&HeaderMap::new()),
            Err(AuthError::MalformedCredential)
        );
        assert_eq!(
            extract_api_key(&HeaderMap::new()),
            Err(AuthError::MalformedCredential)
        );
    }

    #[test]
    fn test_malformed_bearer_headers() {
        let malformed = vec![
            "Bearer",
            "ApiKey xyz",
            "Basic dXNlcjpwYXNz",
            "BearerToken",
            "bearer abc123",
            "Bearer abc 123",
            "",
        ];

        for value in malformed {
            assert_eq!(
                extract_bearer(&headers_with(value)),
                Err(AuthError::MalformedCredential),
                "Should reject header: {:?}",
                value
            );
        }
    }

    #[test]
    fn test_extract_api_key() {
        let headers = headers_with("ApiKey f271c81ff7084ee5b99a5091b42d486e");
        assert_eq!(
            extract_api_key(&headers).unwrap(),
            "f271c81ff7084ee5b99a5091b42d486e"
        );
    }

    #[test]
    fn test_api_key_requires_its_scheme() {
        assert!(extract_api_key(&headers_with("Bearer xyz")).is_err());
        assert!(extract_api_key(&headers_with("ApiKey")).is_err());
    }

    #[test]
    fn test_token_returned_verbatim() {
        let headers = headers_with("Bearer a.b.c==");
        assert_eq!(extract_bearer(&headers).unwrap(), "a.b.c==");
    }
}
