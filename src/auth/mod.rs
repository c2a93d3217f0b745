/// Authentication module
///
/// Password hashing, access token issuance/validation, refresh token
/// management, credential extraction, and the session manager composing them.

mod claims;
mod credentials;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use claims::Claims;
pub use credentials::{extract_api_key, extract_bearer};
pub use jwt::{access_token_lifetime, generate_access_token, validate_access_token};
pub use password::{hash_password, verify_password, MAX_PASSWORD_COST, MIN_PASSWORD_COST};
pub use refresh_token::{generate_refresh_token, RefreshTokenRecord, RefreshTokenStore};
pub use session::{LoginOutcome, SessionManager};
