use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::{RefreshTokenStore, SessionManager};
use crate::configuration::AuthSettings;
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login,
    polka_webhook, refresh, revoke, update_user,
};
use crate::store::{ChirpStore, Stores, UserStore};

pub fn run(
    listener: TcpListener,
    stores: Stores,
    auth_config: AuthSettings,
) -> Result<Server, std::io::Error> {
    let refresh_tokens = RefreshTokenStore::new(
        stores.refresh_tokens.clone(),
        auth_config.refresh_token_lifetime(),
    );
    let sessions = web::Data::new(SessionManager::new(
        auth_config.clone(),
        stores.users.clone(),
        refresh_tokens,
    ));
    let users: web::Data<dyn UserStore> = web::Data::from(stores.users.clone());
    let chirps: web::Data<dyn ChirpStore> = web::Data::from(stores.chirps.clone());
    let auth_config_data = web::Data::new(auth_config);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(sessions.clone())
            .app_data(users.clone())
            .app_data(chirps.clone())
            .app_data(auth_config_data.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                tracing::debug!("Rejected JSON body: {}", err);
                AppError::Validation(ValidationError::InvalidFormat("request body".to_string()))
                    .into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                tracing::debug!("Rejected query string: {}", err);
                AppError::Validation(ValidationError::InvalidFormat("query string".to_string()))
                    .into()
            }))

            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .route("/users", web::post().to(create_user))
                    .route("/users", web::put().to(update_user))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .route("/chirps", web::post().to(create_chirp))
                    .route("/chirps", web::get().to(list_chirps))
                    .route("/chirps/{chirp_id}", web::get().to(get_chirp))
                    .route("/chirps/{chirp_id}", web::delete().to(delete_chirp))
                    .route("/polka/webhooks", web::post().to(polka_webhook)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
