/// JWT Token Generation and Validation
///
/// `TokenIssuer` owns the HS256 keys derived from the configured secret. It is
/// built once at startup and shared read-only by every request.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ConfigError, CryptoError};

/// Issues and verifies signed access tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_seconds: i64,
}

impl TokenIssuer {
    /// Build an issuer from configuration
    ///
    /// # Errors
    /// Returns error if the secret is empty or the lifetime is not positive.
    /// An empty HMAC key would make every token trivially forgeable.
    pub fn new(config: &JwtSettings) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            lifetime_seconds: config.access_token_expiry,
        })
    }

    /// Mint an access token for a user
    ///
    /// Returns the serialized token together with its `exp` timestamp.
    ///
    /// # Errors
    /// Returns `CryptoError::Signing` if encoding fails
    pub fn issue(&self, user_id: i64, login: &str) -> Result<(String, i64), AppError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims::new(user_id, login, now, self.lifetime_seconds);
        let token = self.sign(&claims)?;
        Ok((token, claims.exp))
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| CryptoError::Signing(e.to_string()).into())
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    /// - `AuthError::TokenExpired` once `exp` has passed
    /// - `AuthError::TokenPremature` before `nbf`
    /// - `AuthError::TokenInvalid` for bad signatures or malformed tokens
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation error: {}", e);
                let kind = match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    ErrorKind::ImmatureSignature => AuthError::TokenPremature,
                    _ => AuthError::TokenInvalid,
                };
                AppError::Auth(kind)
            })
    }
}
