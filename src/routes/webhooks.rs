use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, DatabaseError, ValidationError};
use crate::middleware::ServiceApiKey;
use crate::store::UserStore;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct PolkaWebhook {
    pub event: String,
    #[serde(default)]
    pub data: Option<PolkaWebhookData>,
}

#[derive(Deserialize)]
pub struct PolkaWebhookData {
    pub user_id: String,
}

/// POST /api/polka/webhooks
///
/// Requires `Authorization: ApiKey <key>`. Events other than
/// `user.upgraded` are acknowledged with 204 and ignored.
///
/// # Errors
/// - 401: Missing or wrong API key
/// - 404: Upgraded user id is not a UUID or does not exist
pub async fn polka_webhook(
    _key: ServiceApiKey,
    payload: web::Json<PolkaWebhook>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    if payload.event != USER_UPGRADED {
        tracing::debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = payload
        .data
        .as_ref()
        .map(|data| data.user_id.as_str())
        .ok_or_else(|| ValidationError::EmptyField("data.user_id".to_string()))?;
    let user_id = Uuid::parse_str(user_id)
        .map_err(|_| DatabaseError::NotFound(format!("user {}", user_id)))?;

    let user = users.upgrade_to_red(user_id).await?;
    tracing::info!(user_id = %user.id, "User upgraded to Chirpy Red");

    Ok(HttpResponse::NoContent().finish())
}
