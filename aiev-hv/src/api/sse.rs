//! Server-Sent Events (SSE) for review session updates

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /events - SSE event stream for review session changes
///
/// Streams events:
/// - ConnectionStatus (on connect)
/// - EvaluationCompleted, FeedbackRecorded, OverrideRecorded, Submitted, SessionReset
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    aiev_common::sse::create_review_sse_stream("aiev-hv", &state.event_bus)
}
