//! # AIEV Common Library
//!
//! Shared code for the AI Evaluation Validator including:
//! - Rated items and the evaluator that produces them
//! - The review session state machine (feedback, override ratings, submission)
//! - Post-submission analysis
//! - Event types (ReviewEvent) and the EventBus
//! - Configuration loading

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod rating;
pub mod session;
pub mod sse;

pub use analysis::Analysis;
pub use catalog::{DemoEvaluator, Evaluator, Item};
pub use error::{Error, Result};
pub use rating::{ItemId, Rating};
pub use session::{ReviewSession, SessionPhase, SubmissionPolicy, Summary};
