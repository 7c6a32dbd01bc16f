//! Admin editor content routes: load a page's nested document, save an
//! edited one back as flat records.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use copydesk_core::document::Document;
use copydesk_core::store::ContentStore;

use crate::error::ApiResult;
use crate::state::AppState;

use super::bearer_claims;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/content/{page}", get(load_page))
        .route("/v1/content/{page}", put(save_page))
}

#[derive(Debug, Deserialize)]
struct LocaleParam {
    locale: Option<String>,
}

impl LocaleParam {
    fn resolve(self, state: &AppState) -> String {
        self.locale
            .unwrap_or_else(|| state.config().default_locale.clone())
    }
}

/// Fetch a page's records and return the nested document. An unknown page
/// is an empty document, not an error.
async fn load_page(
    State(state): State<AppState>,
    Path(page): Path<String>,
    Query(params): Query<LocaleParam>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    bearer_claims(&headers, &state.config().jwt_secret)?;

    let locale = params.resolve(&state);
    let records = state.store().fetch_page(&page, &locale).await?;
    let document =
        Document::from_records(records.iter().map(|r| (r.key.as_str(), r.value.as_str())))?;

    Ok(Json(document.to_json()))
}

/// Flatten the submitted document and upsert it in one transaction,
/// stamping the caller as owner of every written row.
async fn save_page(
    State(state): State<AppState>,
    Path(page): Path<String>,
    Query(params): Query<LocaleParam>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    let claims = bearer_claims(&headers, &state.config().jwt_secret)?;

    let locale = params.resolve(&state);
    let document = Document::from_json(body);
    let records = document.to_records(&page, &locale);
    state.store().save_page(&records, &claims.email).await?;

    tracing::info!(%page, %locale, count = records.len(), user = %claims.email, "page saved");
    Ok(Json(json!({ "saved": records.len() })))
}
