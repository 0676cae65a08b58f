//! GET /api/analysis - post-submission analysis of the review

use aiev_common::Analysis;
use axum::{extract::State, routing::get, Json, Router};

use super::require_session;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/analysis
///
/// 409 NOT_SUBMITTED until the session has been submitted.
pub async fn get_analysis(State(state): State<AppState>) -> ApiResult<Json<Analysis>> {
    let guard = state.session.read().await;
    let session = require_session(&guard)?;
    let analysis = Analysis::from_session(session, state.settings.agreement_threshold)?;
    Ok(Json(analysis))
}

/// Build analysis routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new().route("/api/analysis", get(get_analysis))
}
