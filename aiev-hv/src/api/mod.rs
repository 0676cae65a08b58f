//! HTTP API handlers for aiev-hv
//!
//! JSON endpoints over the single review session, plus health, build info
//! and the SSE review event stream.

pub mod analysis;
pub mod buildinfo;
pub mod evaluation;
pub mod health;
pub mod review;
pub mod sse;

pub use analysis::analysis_routes;
pub use buildinfo::get_build_info;
pub use evaluation::evaluation_routes;
pub use health::health_routes;
pub use review::review_routes;
pub use sse::event_stream;

use aiev_common::ReviewSession;

use crate::error::ApiError;

/// Error for endpoints that need a session before any evaluation has run
pub(crate) fn no_session() -> ApiError {
    ApiError::Conflict("No evaluation has been run yet; POST /api/evaluation first".to_string())
}

/// Borrow the current session or fail with [`no_session`]
pub(crate) fn require_session(session: &Option<ReviewSession>) -> Result<&ReviewSession, ApiError> {
    session.as_ref().ok_or_else(no_session)
}

/// Mutably borrow the current session or fail with [`no_session`]
pub(crate) fn require_session_mut(
    session: &mut Option<ReviewSession>,
) -> Result<&mut ReviewSession, ApiError> {
    session.as_mut().ok_or_else(no_session)
}
