//! Access-token verification.
//!
//! Admin sessions authenticate with the hosted-auth HS256 JWT; the server
//! verifies signature and expiry locally against the project's shared
//! secret. Tokens are only ever verified here, never minted — the auth UI
//! and login flow live outside this repo.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The claims this system reads from an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Stable user id; compared against the configured admin identity.
    pub sub: String,
    /// Shown in dispatch payloads and stamped as row owner.
    pub email: String,
    /// Unix expiry, enforced during verification.
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid or expired token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Verify an HS256 token and return its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(token, &key, &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token_for(sub: &str, email: &str, exp: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            email: email.to_string(),
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn valid_token_yields_claims() {
        let token = token_for("uid-1", "admin@example.es", far_future());
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "uid-1");
        assert_eq!(claims.email, "admin@example.es");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = token_for("uid-1", "admin@example.es", far_future());
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = token_for("uid-1", "admin@example.es", 1_000_000);
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token("not-a-jwt", SECRET).is_err());
    }
}
