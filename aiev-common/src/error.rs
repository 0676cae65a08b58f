//! Common error types for AIEV

use thiserror::Error;

use crate::rating::ItemId;

/// Common result type for AIEV operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across AIEV crates
#[derive(Error, Debug)]
pub enum Error {
    /// Rating outside the 1..=5 scale
    #[error("Invalid rating: {0} (expected 1-5)")]
    InvalidRating(i64),

    /// Item id not part of the current session
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    /// Override rating given for an item that is not marked as disagree
    #[error("Override rating not allowed for item {0}: item is not marked as disagree")]
    OverrideNotAllowed(ItemId),

    /// Submission gated by missing override ratings or missing feedback
    #[error(
        "Submission blocked: {missing_ratings} disagreed item(s) need a rating, \
         {missing_feedback} item(s) without feedback"
    )]
    SubmissionBlocked {
        /// Disagreed items without an override rating
        missing_ratings: usize,
        /// Items without any feedback (strict policy only)
        missing_feedback: usize,
    },

    /// Session was already submitted; reset before changing it
    #[error("Session already submitted")]
    AlreadySubmitted,

    /// Operation requires a submitted session
    #[error("Session not submitted yet")]
    NotSubmitted,

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
