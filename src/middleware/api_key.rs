use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};

use crate::auth::SessionManager;
use crate::error::AppError;

/// Proof that the request carried the configured service API key
///
/// Declared first in a handler's arguments so the key is checked before the
/// body is parsed. No user identity is attached.
#[derive(Debug, Clone, Copy)]
pub struct ServiceApiKey;

impl FromRequest for ServiceApiKey {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<SessionManager>>() {
            Some(sessions) => sessions
                .verify_api_key(req.headers())
                .map(|_| ServiceApiKey)
                .map_err(AppError::Auth),
            None => Err(AppError::Internal(
                "SessionManager is not registered as app data".to_string(),
            )),
        };

        ready(result)
    }
}
