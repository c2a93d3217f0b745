/// Middleware module
///
/// Request authentication shared by the protected routes.

mod api_key;
mod authenticated_user;

pub use api_key::ServiceApiKey;
pub use authenticated_user::AuthenticatedUser;
