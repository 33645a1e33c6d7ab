use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use contracts::domain::paste::aggregate::{ConsumeOutcome, ConsumedPaste, CreatePasteDto};
use serde::{Deserialize, Serialize};

use crate::routes::AppState;

/// Optional caller-supplied instant, in milliseconds since the Unix epoch.
/// Honored only when the clock runs in deterministic mode.
#[derive(Debug, Deserialize, Default)]
pub struct TimeOverride {
    pub now_ms: Option<i64>,
}

impl TimeOverride {
    /// Parse the override into an instant. A malformed value is rejected
    /// here and never reaches the service.
    pub fn resolve(&self) -> Result<Option<DateTime<Utc>>, StatusCode> {
        match self.now_ms {
            Some(ms) => DateTime::from_timestamp_millis(ms)
                .map(Some)
                .ok_or(StatusCode::BAD_REQUEST),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatePasteResponse {
    pub id: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_views: Option<i64>,
}

/// POST /api/paste
pub async fn create(
    State(state): State<AppState>,
    Query(time): Query<TimeOverride>,
    Json(dto): Json<CreatePasteDto>,
) -> Result<Json<CreatePasteResponse>, StatusCode> {
    if dto.validate().is_err() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let now = state.clock.now(time.resolve()?);
    match state.service.create_paste(dto, now).await {
        Ok(created) => Ok(Json(CreatePasteResponse {
            url: format!("/p/{}", created.id),
            id: created.id,
            created_at: created.created_at,
            expires_at: created.expires_at,
            max_views: created.max_views,
        })),
        Err(e) => {
            tracing::error!("Failed to create paste: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/paste/:id
///
/// Every successful response consumes one view. Missing and expired pastes
/// are indistinguishable from outside.
pub async fn consume(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(time): Query<TimeOverride>,
) -> Result<Json<ConsumedPaste>, StatusCode> {
    let now = state.clock.now(time.resolve()?);
    match state.service.fetch_and_consume(&id, now).await {
        Ok(ConsumeOutcome::Consumed(paste)) => Ok(Json(paste)),
        Ok(ConsumeOutcome::NotFound) | Ok(ConsumeOutcome::Unavailable) => {
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            tracing::error!("Failed to consume paste {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
