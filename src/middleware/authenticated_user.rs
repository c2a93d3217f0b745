/// Access token authentication for route handlers
///
/// Handlers that take an `AuthenticatedUser` argument only run once the
/// bearer access token on the request has been validated; otherwise actix
/// answers 401 before the handler body executes.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::auth::SessionManager;
use crate::error::AppError;

/// The user resolved from a valid access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let sessions = match req.app_data::<web::Data<SessionManager>>() {
            Some(sessions) => sessions,
            None => {
                return ready(Err(AppError::Internal(
                    "SessionManager is not registered as app data".to_string(),
                )))
            }
        };

        let result = sessions
            .authenticate(req.headers())
            .map(|user_id| {
                tracing::debug!(user_id = %user_id, "Access token validated");
                AuthenticatedUser { user_id }
            })
            .map_err(AppError::Auth);

        ready(result)
    }
}
