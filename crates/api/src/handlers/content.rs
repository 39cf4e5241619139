//! Handlers for reading and saving versioned page content.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use vowpage_core::repository::VersionedContent;
use vowpage_core::types::Version;

use crate::error::{AppError, AppResult};
use crate::middleware::csrf::CsrfVerified;
use crate::middleware::rbac::RequireAdmin;
use crate::response::SaveResponse;
use crate::state::AppState;

/// `?slug=` on content routes. Omitted means the configured default slug.
#[derive(Debug, Deserialize)]
pub struct SlugQuery {
    pub slug: Option<String>,
}

impl SlugQuery {
    fn resolve(self, state: &AppState) -> String {
        self.slug
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| state.config.default_slug.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    pub content: Value,
    pub expected_version: Version,
}

/// GET /api/v1/content?slug=
///
/// Public. A slug that was never written returns the fallback document.
pub async fn get_content(
    State(state): State<AppState>,
    Query(query): Query<SlugQuery>,
) -> AppResult<Json<VersionedContent>> {
    let slug = query.resolve(&state);
    let current = state.repository.read(&slug).await?;
    Ok(Json(current))
}

/// PATCH /api/v1/content?slug=
///
/// Admin only, CSRF protected. Both are checked before the body is parsed.
pub async fn update_content(
    RequireAdmin(user): RequireAdmin,
    _csrf: CsrfVerified,
    State(state): State<AppState>,
    Query(query): Query<SlugQuery>,
    body: Result<Json<UpdateContentRequest>, JsonRejection>,
) -> AppResult<Json<SaveResponse>> {
    let Json(input) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let slug = query.resolve(&state);

    let version = state
        .repository
        .write(&slug, input.expected_version, &input.content, user.actor())
        .await?;

    tracing::info!(
        user_id = user.user_id,
        slug = %slug,
        version,
        "Page content saved",
    );

    Ok(Json(SaveResponse::saved(version)))
}
