/// JWT Claims structure
///
/// Identity plus the registered timing claims (RFC 7519) carried by an
/// access token.

use serde::{Deserialize, Serialize};

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Numeric user id
    pub user_id: i64,
    /// User login
    pub login: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token id; two tokens minted in the same second still differ
    pub jti: String,
}

impl Claims {
    /// Claims valid from `issued_at` for `lifetime_seconds`, with a fresh `jti`.
    pub fn new(user_id: i64, login: impl Into<String>, issued_at: i64, lifetime_seconds: i64) -> Self {
        Self {
            user_id,
            login: login.into(),
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at + lifetime_seconds,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(7, "alice", 1_000, 86_400);

        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.login, "alice");
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.nbf, 1_000);
        assert_eq!(claims.exp, 87_400);
    }

    #[test]
    fn test_same_second_claims_have_distinct_ids() {
        let first = Claims::new(7, "alice", 1_000, 86_400);
        let second = Claims::new(7, "alice", 1_000, 86_400);

        assert_ne!(first.jti, second.jti);
        assert_ne!(first, second);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(Claims::new(3, "bob", 10, 20)).unwrap();

        assert_eq!(value["user_id"], 3);
        assert_eq!(value["login"], "bob");
        assert_eq!(value["iat"], 10);
        assert_eq!(value["nbf"], 10);
        assert_eq!(value["exp"], 30);
        assert!(value["jti"].is_string());
    }
}
