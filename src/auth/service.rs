/// Authentication flows
///
/// Sign-up, sign-in and refresh, orchestrated against an `AuthRepository`.
/// Every flow is a single linear sequence: the first failure aborts it. The
/// only step that is not awaited is refresh token persistence.

use std::sync::Arc;

use crate::auth::jwt::TokenIssuer;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh_token::generate_refresh_token;
use crate::auth::token_store::RefreshTokenStore;
use crate::configuration::PasswordSettings;
use crate::error::{AppError, AuthError};
use crate::repository::AuthRepository;
use crate::validators::{validate_login, validate_password, validate_refresh_token};

/// Result of a successful sign-up
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_id: i64,
    pub login: String,
    pub refresh_token: String,
}

/// Access token plus the identity it was issued for
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_at: i64,
    pub user_id: i64,
    pub login: String,
    /// Present when the flow minted a new refresh token
    pub refresh_token: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    repository: Arc<dyn AuthRepository>,
    issuer: TokenIssuer,
    password: PasswordSettings,
    store: RefreshTokenStore,
    /// Verified against on unknown logins so both sign-in failures cost one bcrypt round
    dummy_hash: String,
}

impl AuthService {
    /// # Errors
    /// Returns `CryptoError::Hashing` if the configured cost is unusable
    pub fn new(
        repository: Arc<dyn AuthRepository>,
        issuer: TokenIssuer,
        password: PasswordSettings,
        store: RefreshTokenStore,
    ) -> Result<Self, AppError> {
        let dummy_hash = hash_password("dummy-password-for-unknown-logins", &password)?;

        Ok(Self {
            repository,
            issuer,
            password,
            store,
            dummy_hash,
        })
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Create a user and hand it a refresh token
    ///
    /// # Errors
    /// - Validation error for an empty login or password
    /// - `CryptoError::Hashing` / `CryptoError::Entropy`
    /// - Database errors from user creation, including a taken login
    pub async fn sign_up(&self, login: &str, password: &str) -> Result<Registration, AppError> {
        let login = validate_login(login)?;
        validate_password(password)?;

        let password_hash = hash_password(password, &self.password)?;
        let user = self.repository.create_user(&login, &password_hash).await?;

        let refresh_token = generate_refresh_token()?;
        self.store.persist(user.id, refresh_token.clone());

        tracing::info!(user_id = user.id, "User registered successfully");

        Ok(Registration {
            user_id: user.id,
            login: user.login,
            refresh_token,
        })
    }

    /// Exchange login and password for an access token and refresh token
    ///
    /// Unknown login and wrong password fail with the same
    /// `AuthError::InvalidCredentials`.
    pub async fn sign_in(&self, login: &str, password: &str) -> Result<Session, AppError> {
        let login = validate_login(login)?;
        validate_password(password)?;

        let user = match self.repository.find_user_by_login(&login).await? {
            Some(user) => user,
            None => {
                tracing::debug!("Sign-in for unknown login");
                verify_password(password, &self.dummy_hash);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !verify_password(password, &user.password_hash) {
            tracing::debug!(user_id = user.id, "Sign-in with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let (token, expires_at) = self.issuer.issue(user.id, &user.login)?;
        let refresh_token = generate_refresh_token()?;
        self.store.persist(user.id, refresh_token.clone());

        tracing::info!(user_id = user.id, "User signed in successfully");

        Ok(Session {
            token,
            expires_at,
            user_id: user.id,
            login: user.login,
            refresh_token: Some(refresh_token),
        })
    }

    /// Mint a new access token for the owner of a stored refresh token
    ///
    /// The refresh token itself stays valid and is not rotated. An unknown
    /// token and a token whose user no longer exists both fail with
    /// `AuthError::InvalidRefreshToken`.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, AppError> {
        let refresh_token = validate_refresh_token(refresh_token)?;

        let record = self
            .repository
            .find_refresh_token(refresh_token)
            .await?
            .ok_or_else(|| {
                tracing::debug!("Refresh token not found");
                AppError::Auth(AuthError::InvalidRefreshToken)
            })?;

        let user = self
            .repository
            .find_user_by_id(record.user_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = record.user_id, "Refresh token owner no longer exists");
                AppError::Auth(AuthError::InvalidRefreshToken)
            })?;

        let (token, expires_at) = self.issuer.issue(user.id, &user.login)?;

        tracing::info!(user_id = user.id, "Access token refreshed successfully");

        Ok(Session {
            token,
            expires_at,
            user_id: user.id,
            login: user.login,
            refresh_token: None,
        })
    }
}
