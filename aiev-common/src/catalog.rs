//! Evaluation items and the evaluator that produces them

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rating::{ItemId, Rating};
use crate::Result;

/// One before/after image pair with its precomputed AI rating
///
/// Immutable for the lifetime of a review session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Image before background removal
    pub original: String,
    /// Image after background removal
    pub processed: String,
    /// AI rating
    pub rating: Rating,
    /// AI quality label (e.g. "Production Ready")
    pub quality: String,
    pub description: String,
}

/// Source of the items for a new review session
pub trait Evaluator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Produce the rated items
    fn evaluate(&self) -> Result<Vec<Item>>;
}

/// Evaluator returning the fixed five-item demo catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoEvaluator;

impl DemoEvaluator {
    const CATALOG: [(ItemId, &'static str, &'static str, i64, &'static str, &'static str); 5] = [
        (
            1,
            "florist-original.jpg",
            "florist-processed.jpg",
            4,
            "Near Production Ready",
            "Portrait with natural background",
        ),
        (
            2,
            "businesswoman-original.jpg",
            "businesswoman-processed.jpg",
            3,
            "Moderately Functional",
            "Professional headshot",
        ),
        (
            3,
            "iphone-original.jpg",
            "iphone-processed.jpg",
            4,
            "Near Production Ready",
            "Product photography",
        ),
        (
            4,
            "steak-meal.jpg",
            "steak-meal-processed.jpg",
            5,
            "Production Ready",
            "Food photography",
        ),
        (
            5,
            "bowl-splash.jpg",
            "bowl-splash-processed.jpg",
            2,
            "Partially Viable",
            "Action shot with water",
        ),
    ];
}

impl Evaluator for DemoEvaluator {
    fn name(&self) -> &'static str {
        "demo"
    }

    fn evaluate(&self) -> Result<Vec<Item>> {
        let items = Self::CATALOG
            .iter()
            .map(|&(id, original, processed, rating, quality, description)| {
                Ok(Item {
                    id,
                    original: original.to_string(),
                    processed: processed.to_string(),
                    rating: Rating::new(rating)?,
                    quality: quality.to_string(),
                    description: description.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(count = items.len(), "Demo evaluator produced items");
        Ok(items)
    }
}
