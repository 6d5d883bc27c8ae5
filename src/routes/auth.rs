/// Authentication Routes
///
/// Thin JSON adapters over `AuthService`: sign-up, sign-in, token refresh and
/// the current user's claims.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthService, Claims, Session};
use crate::error::AppError;

/// Sign-up and sign-in request. Missing fields read as empty and fail
/// validation like empty ones.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

/// Token refresh request
#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SignUpResponse {
    pub message: String,
    pub user_id: i64,
    pub login: String,
    pub refresh_token: String,
}

/// Shared by sign-in and refresh
#[derive(Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: i64,
    pub user_id: i64,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl From<Session> for TokenResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            expires_at: session.expires_at,
            user_id: session.user_id,
            login: session.login,
            refresh_token: session.refresh_token,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MeResponse {
    pub user_id: i64,
    pub login: String,
    pub expires_at: i64,
}

/// POST /auth/signup
///
/// # Errors
/// - 400: Empty login or password
/// - 409: Login already registered
/// - 500: Hashing or persistence failure
pub async fn sign_up(
    form: web::Json<CredentialsRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let registration = service.sign_up(&form.login, &form.password).await?;

    Ok(HttpResponse::Created().json(SignUpResponse {
        message: "User created successfully".to_string(),
        user_id: registration.user_id,
        login: registration.login,
        refresh_token: registration.refresh_token,
    }))
}

/// POST /auth/signin
///
/// # Errors
/// - 400: Empty login or password
/// - 401: Invalid credentials (unknown login or wrong password, same body)
/// - 500: Token generation failure
pub async fn sign_in(
    form: web::Json<CredentialsRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let session = service.sign_in(&form.login, &form.password).await?;

    Ok(HttpResponse::Ok().json(TokenResponse::from(session)))
}

/// POST /auth/refresh
///
/// # Errors
/// - 400: Empty refresh token
/// - 401: Unknown refresh token or missing user (same body)
/// - 500: Token generation failure
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let session = service.refresh(&form.refresh_token).await?;

    Ok(HttpResponse::Ok().json(TokenResponse::from(session)))
}

/// GET /api/me
///
/// Requires `Authorization: Bearer <access_token>`; claims are injected by
/// `JwtMiddleware`.
pub async fn get_current_user(claims: web::ReqData<Claims>) -> HttpResponse {
    let claims = claims.into_inner();

    HttpResponse::Ok().json(MeResponse {
        user_id: claims.user_id,
        login: claims.login,
        expires_at: claims.exp,
    })
}
