use config::ConfigError;

use crate::auth::{MAX_PASSWORD_COST, MIN_PASSWORD_COST};
use crate::error::ConfigError as SettingsError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub storage: StorageBackend,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

/// Where users, chirps and refresh tokens live
#[derive(serde::Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Token signing and credential settings
///
/// Loaded once at startup and handed to the session manager; nothing reads
/// these values from global state.
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    /// HMAC secret for access tokens
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Default access token lifetime in seconds
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime: i64,
    /// Upper bound for a requested access token lifetime, in seconds
    #[serde(default = "default_access_token_lifetime")]
    pub max_access_token_lifetime: i64,
    #[serde(default = "default_refresh_token_lifetime_days")]
    pub refresh_token_lifetime_days: i64,
    #[serde(default = "default_password_cost")]
    pub password_cost: u32,
    /// Shared key the payment provider sends as `ApiKey <key>`
    pub polka_key: String,
}

impl AuthSettings {
    /// Reject settings the service cannot run safely with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.secret.trim().is_empty() {
            return Err(SettingsError::MissingRequired("auth.secret".to_string()));
        }
        if self.polka_key.trim().is_empty() {
            return Err(SettingsError::MissingRequired("auth.polka_key".to_string()));
        }
        if self.access_token_lifetime <= 0 || self.max_access_token_lifetime <= 0 {
            return Err(SettingsError::InvalidValue(
                "access token lifetimes must be positive".to_string(),
            ));
        }
        if self.refresh_token_lifetime_days <= 0 {
            return Err(SettingsError::InvalidValue(
                "auth.refresh_token_lifetime_days must be positive".to_string(),
            ));
        }
        if !(MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(&self.password_cost) {
            return Err(SettingsError::InvalidValue(format!(
                "auth.password_cost must be between {} and {}",
                MIN_PASSWORD_COST, MAX_PASSWORD_COST
            )));
        }
        Ok(())
    }

    pub fn refresh_token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_token_lifetime_days)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_issuer() -> String {
    "chirpy".to_string()
}

fn default_access_token_lifetime() -> i64 {
    3600
}

fn default_refresh_token_lifetime_days() -> i64 {
    60
}

fn default_password_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

/// Load `configuration.yaml` (optional) and overlay `APP_*` environment
/// variables, e.g. `APP_AUTH__SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_settings() -> AuthSettings {
        AuthSettings {
            secret: "test-secret".to_string(),
            issuer: default_issuer(),
            access_token_lifetime: 3600,
            max_access_token_lifetime: 3600,
            refresh_token_lifetime_days: 60,
            password_cost: MIN_PASSWORD_COST,
            polka_key: "f271c81ff7084ee5b99a5091b42d486e".to_string(),
        }
    }

    #[test]
    fn test_valid_auth_settings() {
        assert!(auth_settings().validate().is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut settings = auth_settings();
        settings.secret = "  ".to_string();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut settings = auth_settings();
        settings.polka_key = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_out_of_range_cost_rejected() {
        let mut settings = auth_settings();
        settings.password_cost = 40;
        assert!(matches!(settings.validate(), Err(SettingsError::InvalidValue(_))));
    }

    #[test]
    fn test_refresh_lifetime_is_sixty_days_by_default() {
        assert_eq!(auth_settings().refresh_token_lifetime(), chrono::Duration::days(60));
    }
}
