pub mod content;
pub mod health;
pub mod rebuild;

use axum::http::HeaderMap;
use axum::Router;

use copydesk_core::auth::{verify_token, Claims};

use crate::error::ApiError;
use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(content::routes())
        .merge(rebuild::routes())
        .with_state(state)
}

/// Pull the bearer token out of the `Authorization` header and verify it.
/// Missing or malformed headers and bad tokens are all authentication
/// failures (401), distinct from the authorization check routes do next.
pub fn bearer_claims(headers: &HeaderMap, jwt_secret: &str) -> Result<Claims, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;
    verify_token(token, jwt_secret).map_err(|err| {
        tracing::warn!(%err, "token verification failed");
        ApiError::Unauthorized
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    fn valid_token() -> String {
        let claims = Claims {
            sub: "uid-1".into(),
            email: "admin@example.es".into(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let result = bearer_claims(&HeaderMap::new(), SECRET);
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[test]
    fn non_bearer_header_is_unauthorized() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert!(matches!(
            bearer_claims(&headers, SECRET),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn valid_bearer_yields_claims() {
        let headers = headers_with(&format!("Bearer {}", valid_token()));
        let claims = bearer_claims(&headers, SECRET).unwrap();
        assert_eq!(claims.sub, "uid-1");
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let headers = headers_with(&format!("Bearer {}", valid_token()));
        assert!(matches!(
            bearer_claims(&headers, "other"),
            Err(ApiError::Unauthorized)
        ));
    }
}
