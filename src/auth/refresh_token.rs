/// Refresh Token Generation
///
/// Refresh tokens are opaque: 32 bytes read straight from the OS random
/// source, encoded as URL-safe base64. They carry no claims and are only
/// meaningful through a repository lookup.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{AppError, CryptoError};

pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new cryptographically secure refresh token
///
/// # Errors
/// Returns `CryptoError::Entropy` if the OS random source cannot supply bytes.
/// The caller must fail the request rather than fall back to a weaker source.
pub fn generate_refresh_token() -> Result<String, AppError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Entropy(e.to_string()))?;
    Ok(URL_SAFE.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_refresh_token() {
        let token = generate_refresh_token().expect("Failed to generate token");

        // 32 bytes of padded base64
        assert_eq!(token.len(), 44);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '='));
    }

    #[test]
    fn test_token_decodes_to_full_entropy() {
        let token = generate_refresh_token().unwrap();
        let decoded = URL_SAFE.decode(&token).expect("Token is not URL-safe base64");

        assert_eq!(decoded.len(), REFRESH_TOKEN_BYTES);
    }

    #[test]
    fn test_tokens_are_unique() {
        let tokens: HashSet<String> = (0..1_000)
            .map(|_| generate_refresh_token().unwrap())
            .collect();

        assert_eq!(tokens.len(), 1_000);
    }
}
