//! aiev-hv library - Human Validation module
//!
//! Holds a single review session and exposes its operations over HTTP/JSON.

use std::sync::Arc;

use aiev_common::events::EventBus;
use aiev_common::{Evaluator, ReviewSession, SubmissionPolicy};
use axum::Router;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

/// Review rules applied to every new session
#[derive(Debug, Clone, Copy)]
pub struct ReviewSettings {
    pub policy: SubmissionPolicy,
    /// Agreement rate (percent) selecting the positive recommendations
    pub agreement_threshold: f64,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            policy: SubmissionPolicy::Lenient,
            agreement_threshold: aiev_common::analysis::DEFAULT_AGREEMENT_THRESHOLD,
        }
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Current review session; `None` until the first evaluation runs
    pub session: Arc<RwLock<Option<ReviewSession>>>,
    /// Source of items for new sessions
    pub evaluator: Arc<dyn Evaluator>,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    pub settings: ReviewSettings,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        evaluator: Arc<dyn Evaluator>,
        event_bus: EventBus,
        settings: ReviewSettings,
    ) -> Self {
        Self {
            session: Arc::new(RwLock::new(None)),
            evaluator,
            event_bus,
            settings,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::evaluation_routes())
        .merge(api::review_routes())
        .merge(api::analysis_routes())
        .merge(api::health_routes())
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/events", get(api::event_stream))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
