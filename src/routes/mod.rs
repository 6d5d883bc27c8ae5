mod auth;
mod health_check;

pub use auth::{
    get_current_user, refresh, sign_in, sign_up, CredentialsRequest, MeResponse, RefreshRequest,
    SignUpResponse, TokenResponse,
};
pub use health_check::health_check;
