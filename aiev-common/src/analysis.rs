//! Post-submission analysis
//!
//! Builds the report shown after a review is submitted: the agreement
//! summary, the distribution of AI ratings, the direction in which human
//! override ratings deviate from the AI, and follow-up recommendations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::session::{ReviewSession, Summary};
use crate::{Error, Result};

/// Agreement rate (percent) at or above which the AI ratings are considered sound
pub const DEFAULT_AGREEMENT_THRESHOLD: f64 = 70.0;

/// Which way human override ratings lean relative to the AI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Humans rate higher: the AI evaluator is too conservative
    HumansHigher,
    /// Humans rate lower: the AI evaluator is too lenient
    HumansLower,
    Balanced,
}

/// Override ratings compared against the AI rating of the same item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisagreementTrend {
    /// Overrides strictly above the AI rating
    pub higher: usize,
    /// All other overrides (an equal rating counts here)
    pub lower: usize,
    pub direction: TrendDirection,
}

/// Follow-up actions derived from the agreement rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    /// Guidance for the background removal algorithms
    pub background_removal: String,
    /// Guidance for the automated evaluator
    pub evaluator: String,
}

/// Full analysis of a submitted session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: Summary,
    pub total_evaluations: usize,
    /// Item count per AI rating; only ratings that occur are listed
    pub rating_distribution: BTreeMap<u8, usize>,
    /// Absent when no item was disagreed with
    pub disagreement_trend: Option<DisagreementTrend>,
    pub recommendations: Recommendations,
}

impl Analysis {
    /// Analyse a submitted session
    ///
    /// Fails with [`Error::NotSubmitted`] while the session is still under review.
    pub fn from_session(session: &ReviewSession, agreement_threshold: f64) -> Result<Self> {
        let summary = session.summary().cloned().ok_or(Error::NotSubmitted)?;

        let mut rating_distribution = BTreeMap::new();
        for item in session.items() {
            *rating_distribution.entry(item.rating.value()).or_insert(0) += 1;
        }

        let disagreement_trend = if summary.disagreement_count > 0 {
            disagreement_trend(session)
        } else {
            None
        };

        let recommendations =
            Recommendations::for_rate(summary.agreement_rate, agreement_threshold);

        Ok(Self {
            total_evaluations: session.items().len(),
            summary,
            rating_distribution,
            disagreement_trend,
            recommendations,
        })
    }
}

impl Recommendations {
    /// Pick recommendations for an agreement rate
    pub fn for_rate(agreement_rate: f64, threshold: f64) -> Self {
        let (background_removal, evaluator) = if agreement_rate >= threshold {
            (
                "Maintain current algorithms, focus on edge cases",
                "Fine-tune quality thresholds, ready for production",
            )
        } else {
            (
                "Improve edge detection and segmentation techniques",
                "Recalibrate scoring weights and evaluation criteria",
            )
        };

        Self {
            background_removal: background_removal.to_string(),
            evaluator: evaluator.to_string(),
        }
    }
}

/// Compare overrides of disagreed items against the AI ratings
fn disagreement_trend(session: &ReviewSession) -> Option<DisagreementTrend> {
    // (human, ai) for every disagreed item that has an override
    let pairs: Vec<(u8, u8)> = session
        .feedback()
        .iter()
        .filter(|&(_, &agree)| !agree)
        .filter_map(|(id, _)| {
            let human = session.overrides().get(id)?;
            let item = session.item(*id)?;
            Some((human.value(), item.rating.value()))
        })
        .collect();

    if pairs.is_empty() {
        return None;
    }

    let higher = pairs.iter().filter(|&&(human, ai)| human > ai).count();
    let lower = pairs.len() - higher;
    let direction = match higher.cmp(&lower) {
        std::cmp::Ordering::Greater => TrendDirection::HumansHigher,
        std::cmp::Ordering::Less => TrendDirection::HumansLower,
        std::cmp::Ordering::Equal => TrendDirection::Balanced,
    };

    Some(DisagreementTrend {
        higher,
        lower,
        direction,
    })
}
