use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::hash_password;
use crate::configuration::AuthSettings;
use crate::error::{AppError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::store::UserStore;
use crate::validators::{is_valid_email, is_valid_password};

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

/// Either field may be omitted or left empty to keep the current value
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /api/users
///
/// # Errors
/// - 400: Invalid email or password
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<CreateUserRequest>,
    users: web::Data<dyn UserStore>,
    auth_config: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;
    let hashed_password = hash_password(&form.password, auth_config.password_cost)?;

    let user = users.create(&email, &hashed_password).await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = %user.id,
        "User registered"
    );

    Ok(HttpResponse::Created().json(user))
}

/// PUT /api/users
///
/// Updates the authenticated user's own email and/or password.
pub async fn update_user(
    user: AuthenticatedUser,
    form: web::Json<UpdateUserRequest>,
    users: web::Data<dyn UserStore>,
    auth_config: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update").with_user_id(user.user_id.to_string());
    let form = form.into_inner();

    let email = match form.email.as_deref().filter(|email| !email.trim().is_empty()) {
        Some(email) => Some(is_valid_email(email)?),
        None => None,
    };

    let hashed_password = match form.password.as_deref().filter(|password| !password.is_empty()) {
        Some(password) => {
            is_valid_password(password)?;
            Some(hash_password(password, auth_config.password_cost)?)
        }
        None => None,
    };

    let updated = users
        .update(user.user_id, email.as_deref(), hashed_password.as_deref())
        .await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = ?context.user_id,
        email_changed = email.is_some(),
        password_changed = hashed_password.is_some(),
        "User updated"
    );

    Ok(HttpResponse::Ok().json(updated))
}
