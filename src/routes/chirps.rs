use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AuthError, DatabaseError};
use crate::middleware::AuthenticatedUser;
use crate::store::ChirpStore;
use crate::validators::is_valid_chirp;

#[derive(Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

#[derive(Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Deserialize)]
pub struct ChirpQuery {
    pub author_id: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// POST /api/chirps
pub async fn create_chirp(
    user: AuthenticatedUser,
    form: web::Json<ChirpRequest>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    is_valid_chirp(&form.body)?;

    let chirp = chirps.create(user.user_id, &form.body).await?;
    tracing::info!(user_id = %user.user_id, chirp_id = %chirp.id, "Chirp created");

    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
///
/// Oldest first unless `sort=desc`. An `author_id` that is not a UUID
/// matches no author and is a 404.
pub async fn list_chirps(
    query: web::Query<ChirpQuery>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let author_id = match query.author_id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => Some(
            Uuid::parse_str(id).map_err(|_| DatabaseError::NotFound(format!("author {}", id)))?,
        ),
        None => None,
    };

    let mut found = chirps.list(author_id).await?;
    if query.sort == SortOrder::Desc {
        found.reverse();
    }

    Ok(HttpResponse::Ok().json(found))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<Uuid>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let chirp = chirps.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 401: Missing or invalid access token
/// - 403: Chirp belongs to someone else
/// - 404: No such chirp
pub async fn delete_chirp(
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    chirps: web::Data<dyn ChirpStore>,
) -> Result<HttpResponse, AppError> {
    let chirp = chirps.get(path.into_inner()).await?;

    if chirp.user_id != user.user_id {
        tracing::warn!(
            user_id = %user.user_id,
            chirp_id = %chirp.id,
            "Attempt to delete another user's chirp"
        );
        return Err(AuthError::Forbidden.into());
    }

    chirps.delete(chirp.id).await?;
    tracing::info!(user_id = %user.user_id, chirp_id = %chirp.id, "Chirp deleted");

    Ok(HttpResponse::NoContent().finish())
}
