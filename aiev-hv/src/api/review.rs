//! Review session API handlers
//!
//! GET /api/session, PUT /api/items/:id/feedback, PUT /api/items/:id/rating,
//! POST /api/submit, POST /api/reset

use aiev_common::events::ReviewEvent;
use aiev_common::session::SessionSnapshot;
use aiev_common::{Error as ReviewError, ItemId, Rating, ReviewSession, Summary};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use super::{require_session, require_session_mut};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// PUT /api/items/:id/feedback request
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub agree: bool,
}

/// PUT /api/items/:id/rating request
///
/// Kept as raw JSON so that any non-integer or missing value surfaces as
/// INVALID_RATING rather than an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    #[serde(default)]
    pub rating: Value,
}

impl RatingRequest {
    fn rating(&self) -> ApiResult<Rating> {
        match self.rating.as_i64() {
            Some(value) => Ok(Rating::new(value)?),
            None => Err(ApiError::InvalidRating(self.rating.to_string())),
        }
    }
}

/// Parse an item id path segment; anything that is not a u32 names no item
fn parse_item_id(raw: &str) -> ApiResult<ItemId> {
    raw.parse().map_err(|_| ApiError::UnknownItem(raw.to_string()))
}

/// Fail with UNKNOWN_ITEM unless the session holds `item_id`
fn ensure_item(session: &ReviewSession, item_id: ItemId) -> ApiResult<()> {
    match session.item(item_id) {
        Some(_) => Ok(()),
        None => Err(ReviewError::UnknownItem(item_id).into()),
    }
}

/// POST /api/submit response
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub session_id: Uuid,
    pub summary: Summary,
    pub submitted_at: DateTime<Utc>,
}

/// GET /api/session
pub async fn get_session(State(state): State<AppState>) -> ApiResult<Json<SessionSnapshot>> {
    let guard = state.session.read().await;
    let session = require_session(&guard)?;
    Ok(Json(session.snapshot()))
}

/// PUT /api/items/:id/feedback
///
/// Agreeing clears any override rating for the item.
pub async fn set_feedback(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<Json<SessionSnapshot>> {
    let mut guard = state.session.write().await;
    let session = require_session_mut(&mut guard)?;
    let item_id = parse_item_id(&raw_id)?;
    ensure_item(session, item_id)?;
    let Json(request) = body?;

    let had_override = session.overrides().contains_key(&item_id);
    session.set_feedback(item_id, request.agree)?;

    state.event_bus.emit_lossy(ReviewEvent::FeedbackRecorded {
        session_id: session.session_id(),
        item_id,
        agree: request.agree,
        override_cleared: request.agree && had_override,
        timestamp: Utc::now(),
    });

    Ok(Json(session.snapshot()))
}

/// PUT /api/items/:id/rating
///
/// Only accepted for items currently marked as disagree. Checks run in
/// order: session exists (409), item exists (404), body and rating (400),
/// item is disagreed (400).
pub async fn set_override_rating(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<RatingRequest>, JsonRejection>,
) -> ApiResult<Json<SessionSnapshot>> {
    let mut guard = state.session.write().await;
    let session = require_session_mut(&mut guard)?;
    let item_id = parse_item_id(&raw_id)?;
    ensure_item(session, item_id)?;
    let Json(request) = body?;
    let rating = request.rating()?;

    if let Err(e) = session.set_override_rating(item_id, rating) {
        warn!(
            session_id = %session.session_id(),
            item_id,
            error = %e,
            "Override rating rejected"
        );
        return Err(e.into());
    }

    state.event_bus.emit_lossy(ReviewEvent::OverrideRecorded {
        session_id: session.session_id(),
        item_id,
        rating,
        timestamp: Utc::now(),
    });

    Ok(Json(session.snapshot()))
}

/// POST /api/submit
///
/// 409 SUBMISSION_BLOCKED with missing counts while disagreed items lack a rating.
pub async fn submit(State(state): State<AppState>) -> ApiResult<Json<SubmitResponse>> {
    let mut guard = state.session.write().await;
    let session = require_session_mut(&mut guard)?;

    let summary = session.submit()?.clone();
    let submitted_at = session.submitted_at().unwrap_or_else(Utc::now);
    let session_id = session.session_id();

    state.event_bus.emit_lossy(ReviewEvent::Submitted {
        session_id,
        summary: summary.clone(),
        timestamp: submitted_at,
    });

    Ok(Json(SubmitResponse {
        session_id,
        summary,
        submitted_at,
    }))
}

/// POST /api/reset
///
/// Clears feedback, overrides and summary; the rated items stay.
pub async fn reset(State(state): State<AppState>) -> ApiResult<Json<SessionSnapshot>> {
    let mut guard = state.session.write().await;
    let session = require_session_mut(&mut guard)?;

    session.reset();
    info!(session_id = %session.session_id(), "Review session reset via API");

    state.event_bus.emit_lossy(ReviewEvent::SessionReset {
        session_id: session.session_id(),
        timestamp: Utc::now(),
    });

    Ok(Json(session.snapshot()))
}

/// Build review session routes
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/items/:id/feedback", put(set_feedback))
        .route("/api/items/:id/rating", put(set_override_rating))
        .route("/api/submit", post(submit))
        .route("/api/reset", post(reset))
}
