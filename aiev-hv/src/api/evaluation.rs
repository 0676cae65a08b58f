//! AI evaluation API handler
//!
//! POST /api/evaluation runs the evaluator and starts a fresh review session,
//! discarding any previous one.

use aiev_common::events::ReviewEvent;
use aiev_common::session::SessionSnapshot;
use aiev_common::ReviewSession;
use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/evaluation
///
/// Returns the new session with its rated items.
pub async fn start_evaluation(State(state): State<AppState>) -> ApiResult<Json<SessionSnapshot>> {
    let items = state.evaluator.evaluate()?;
    if items.is_empty() {
        return Err(ApiError::Internal(format!(
            "Evaluator '{}' produced no items",
            state.evaluator.name()
        )));
    }

    let session = ReviewSession::new(items, state.settings.policy);
    let snapshot = session.snapshot();

    let replaced = state.session.write().await.replace(session);
    if let Some(previous) = replaced {
        info!(
            previous_session_id = %previous.session_id(),
            session_id = %snapshot.session_id,
            "Previous review session discarded"
        );
    }

    info!(
        session_id = %snapshot.session_id,
        evaluator = state.evaluator.name(),
        items = snapshot.items.len(),
        "AI evaluation complete"
    );

    state.event_bus.emit_lossy(ReviewEvent::EvaluationCompleted {
        session_id: snapshot.session_id,
        evaluator: state.evaluator.name().to_string(),
        item_count: snapshot.items.len(),
        timestamp: Utc::now(),
    });

    Ok(Json(snapshot))
}

/// Build evaluation routes
pub fn evaluation_routes() -> Router<AppState> {
    Router::new().route("/api/evaluation", post(start_evaluation))
}
