//! The publish trigger: verify the caller, check they are the configured
//! admin, and send a single rebuild dispatch to CI.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::github::RebuildDispatcher;
use crate::state::AppState;

use super::bearer_claims;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/rebuild", post(rebuild))
}

async fn rebuild(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let config = state.config();
    let origin = headers
        .get(axum::http::header::ORIGIN)
        .and_then(|value| value.to_str().ok());
    let response = trigger_rebuild(
        &config.jwt_secret,
        &config.admin_uid,
        config.allowed_origin.as_deref(),
        state.dispatcher(),
        &headers,
        origin,
    )
    .await?;
    Ok(Json(response))
}

/// The trigger flow, separated from the axum extractors so it can be
/// exercised with a counting dispatcher.
async fn trigger_rebuild(
    jwt_secret: &str,
    admin_uid: &str,
    allowed_origin: Option<&str>,
    dispatcher: &dyn RebuildDispatcher,
    headers: &HeaderMap,
    origin: Option<&str>,
) -> ApiResult<Value> {
    // Origin is logged only; the token is the real gate.
    if let (Some(allowed), Some(origin)) = (allowed_origin, origin) {
        if !origin.starts_with(allowed) {
            tracing::warn!(origin, allowed, "rebuild request from unexpected origin");
        }
    }

    let claims = bearer_claims(headers, jwt_secret)?;

    if claims.sub != admin_uid {
        tracing::warn!(sub = %claims.sub, "rebuild rejected: not the admin identity");
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    dispatcher
        .dispatch(&claims.email)
        .await
        .map_err(|err| ApiError::Upstream(err.to_string()))?;

    Ok(json!({
        "success": true,
        "message": "Deploy triggered successfully",
        "user": claims.email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::DispatchError;
    use copydesk_core::auth::Claims;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SECRET: &str = "test-secret";
    const ADMIN_UID: &str = "admin-uid";

    #[derive(Default)]
    struct CountingDispatcher {
        sent: AtomicUsize,
        fail: bool,
    }

    impl RebuildDispatcher for CountingDispatcher {
        fn dispatch<'a>(
            &'a self,
            _user: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<(), DispatchError>> + Send + 'a>> {
            Box::pin(async move {
                if self.fail {
                    return Err(DispatchError::Rejected {
                        status: 422,
                        body: "nope".into(),
                    });
                }
                self.sent.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }
    }

    fn headers_for(sub: &str) -> HeaderMap {
        let claims = Claims {
            sub: sub.to_string(),
            email: format!("{sub}@example.es"),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn admin_token_issues_exactly_one_dispatch() {
        let dispatcher = CountingDispatcher::default();
        let headers = headers_for(ADMIN_UID);

        let response = trigger_rebuild(SECRET, ADMIN_UID, None, &dispatcher, &headers, None)
            .await
            .unwrap();

        assert_eq!(dispatcher.sent.load(Ordering::SeqCst), 1);
        assert_eq!(response["success"], true);
        assert_eq!(response["user"], "admin-uid@example.es");
    }

    #[tokio::test]
    async fn non_admin_token_is_forbidden_and_dispatches_nothing() {
        let dispatcher = CountingDispatcher::default();
        let headers = headers_for("someone-else");

        let result = trigger_rebuild(SECRET, ADMIN_UID, None, &dispatcher, &headers, None).await;

        assert!(matches!(result, Err(ApiError::Forbidden(_))));
        assert_eq!(dispatcher.sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized_and_dispatches_nothing() {
        let dispatcher = CountingDispatcher::default();

        let result =
            trigger_rebuild(SECRET, ADMIN_UID, None, &dispatcher, &HeaderMap::new(), None).await;

        assert!(matches!(result, Err(ApiError::Unauthorized)));
        assert_eq!(dispatcher.sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dispatch_failure_surfaces_as_upstream_error() {
        let dispatcher = CountingDispatcher {
            sent: AtomicUsize::new(0),
            fail: true,
        };
        let headers = headers_for(ADMIN_UID);

        let result = trigger_rebuild(SECRET, ADMIN_UID, None, &dispatcher, &headers, None).await;

        assert!(matches!(result, Err(ApiError::Upstream(_))));
    }

    #[tokio::test]
    async fn unexpected_origin_is_logged_not_blocked() {
        let dispatcher = CountingDispatcher::default();
        let headers = headers_for(ADMIN_UID);

        let response = trigger_rebuild(
            SECRET,
            ADMIN_UID,
            Some("https://example.es"),
            &dispatcher,
            &headers,
            Some("https://evil.example"),
        )
        .await
        .unwrap();

        assert_eq!(response["success"], true);
        assert_eq!(dispatcher.sent.load(Ordering::SeqCst), 1);
    }
}
