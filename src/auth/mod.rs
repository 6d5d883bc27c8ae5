/// Authentication module
///
/// Password hashing, access token issuance/verification, refresh token
/// generation and asynchronous persistence, and the flows built on them.

mod claims;
mod jwt;
mod password;
mod refresh_token;
mod service;
mod token_store;

pub use claims::Claims;
pub use jwt::TokenIssuer;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::generate_refresh_token;
pub use service::{AuthService, Registration, Session};
pub use token_store::{PendingRefreshToken, RefreshTokenStore, RefreshTokenWriter};
