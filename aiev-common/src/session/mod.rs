//! Review session state machine
//!
//! A session holds the rated items plus the reviewer's input:
//! agree/disagree feedback per item and, for disagreed items, an override
//! rating. Submission is gated on every disagreed item having an override
//! and freezes the session until [`ReviewSession::reset`].
//!
//! Invariant: every id in the override map is present in the feedback map
//! with value `false`.

mod summary;


pub use summary::Summary;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::Item;
use crate::rating::{ItemId, Rating};
use crate::{Error, Result};

/// Which items must have feedback before submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionPolicy {
    /// Only disagreed items need an override rating
    #[default]
    Lenient,
    /// Additionally every item needs feedback
    Strict,
}

/// Review session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Accepting feedback and override ratings
    Reviewing,
    /// Summary computed, input frozen until reset
    Submitted,
}

/// Review session (in-memory state)
#[derive(Debug, Clone)]
pub struct ReviewSession {
    session_id: Uuid,
    items: Vec<Item>,
    policy: SubmissionPolicy,
    feedback: BTreeMap<ItemId, bool>,
    overrides: BTreeMap<ItemId, Rating>,
    summary: Option<Summary>,
    started_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub policy: SubmissionPolicy,
    pub items: Vec<Item>,
    pub feedback: BTreeMap<ItemId, bool>,
    pub overrides: BTreeMap<ItemId, Rating>,
    pub can_submit: bool,
    pub missing_ratings: Vec<ItemId>,
    pub missing_feedback: Vec<ItemId>,
    pub summary: Option<Summary>,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ReviewSession {
    /// Create new review session over `items`
    pub fn new(items: Vec<Item>, policy: SubmissionPolicy) -> Self {
        let session = Self {
            session_id: Uuid::new_v4(),
            items,
            policy,
            feedback: BTreeMap::new(),
            overrides: BTreeMap::new(),
            summary: None,
            started_at: Utc::now(),
            submitted_at: None,
        };
        info!(
            session_id = %session.session_id,
            items = session.items.len(),
            policy = ?policy,
            "Review session created"
        );
        session
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Look up an item by id
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn policy(&self) -> SubmissionPolicy {
        self.policy
    }

    pub fn feedback(&self) -> &BTreeMap<ItemId, bool> {
        &self.feedback
    }

    pub fn overrides(&self) -> &BTreeMap<ItemId, Rating> {
        &self.overrides
    }

    /// Summary of the last submission, if submitted
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn phase(&self) -> SessionPhase {
        if self.summary.is_some() {
            SessionPhase::Submitted
        } else {
            SessionPhase::Reviewing
        }
    }

    /// Record agree/disagree for an item
    ///
    /// Agreeing drops any override rating held for the item.
    pub fn set_feedback(&mut self, id: ItemId, agree: bool) -> Result<()> {
        self.ensure_reviewing()?;
        self.ensure_known(id)?;

        self.feedback.insert(id, agree);
        if agree && self.overrides.remove(&id).is_some() {
            debug!(
                session_id = %self.session_id,
                item_id = id,
                "Override rating cleared on agree"
            );
        }

        debug!(session_id = %self.session_id, item_id = id, agree, "Feedback recorded");
        Ok(())
    }

    /// Record the reviewer's own rating for a disagreed item
    ///
    /// Fails without touching state unless the item is marked as disagree.
    pub fn set_override_rating(&mut self, id: ItemId, rating: Rating) -> Result<()> {
        self.ensure_reviewing()?;
        self.ensure_known(id)?;

        if self.feedback.get(&id) != Some(&false) {
            return Err(Error::OverrideNotAllowed(id));
        }

        self.overrides.insert(id, rating);
        debug!(
            session_id = %self.session_id,
            item_id = id,
            rating = rating.value(),
            "Override rating recorded"
        );
        Ok(())
    }

    /// Disagreed items still lacking an override rating, ascending by id
    pub fn missing_ratings(&self) -> Vec<ItemId> {
        self.feedback
            .iter()
            .filter(|&(id, &agree)| !agree && !self.overrides.contains_key(id))
            .map(|(&id, _)| id)
            .collect()
    }

    /// Items without feedback, in item order
    pub fn missing_feedback(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .map(|item| item.id)
            .filter(|id| !self.feedback.contains_key(id))
            .collect()
    }

    /// Whether [`submit`](Self::submit) would succeed on the current input
    pub fn can_submit(&self) -> bool {
        self.blocking_counts().is_none()
    }

    /// Compute the summary and freeze the session
    pub fn submit(&mut self) -> Result<&Summary> {
        self.ensure_reviewing()?;

        if let Some((missing_ratings, missing_feedback)) = self.blocking_counts() {
            info!(
                session_id = %self.session_id,
                missing_ratings,
                missing_feedback,
                "Submission blocked"
            );
            return Err(Error::SubmissionBlocked {
                missing_ratings,
                missing_feedback,
            });
        }

        let summary = Summary::from_feedback(self.feedback.values());
        info!(
            session_id = %self.session_id,
            feedback_count = summary.feedback_count,
            agreement_rate = summary.agreement_rate,
            disagreement_rate = summary.disagreement_rate,
            "Review session submitted"
        );
        self.submitted_at = Some(Utc::now());
        Ok(self.summary.insert(summary))
    }

    /// Clear feedback, overrides and summary; items are kept
    pub fn reset(&mut self) {
        self.feedback.clear();
        self.overrides.clear();
        self.summary = None;
        self.submitted_at = None;
        info!(session_id = %self.session_id, "Review session reset");
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            phase: self.phase(),
            policy: self.policy,
            items: self.items.clone(),
            feedback: self.feedback.clone(),
            overrides: self.overrides.clone(),
            can_submit: self.can_submit(),
            missing_ratings: self.missing_ratings(),
            missing_feedback: self.missing_feedback(),
            summary: self.summary.clone(),
            started_at: self.started_at,
            submitted_at: self.submitted_at,
        }
    }

    /// `(missing_ratings, missing_feedback)` when submission is blocked
    fn blocking_counts(&self) -> Option<(usize, usize)> {
        let missing_ratings = self.missing_ratings().len();
        let missing_feedback = match self.policy {
            SubmissionPolicy::Lenient => 0,
            SubmissionPolicy::Strict => self.missing_feedback().len(),
        };

        if missing_ratings == 0 && missing_feedback == 0 {
            None
        } else {
            Some((missing_ratings, missing_feedback))
        }
    }

    fn ensure_reviewing(&self) -> Result<()> {
        match self.phase() {
            SessionPhase::Reviewing => Ok(()),
            SessionPhase::Submitted => Err(Error::AlreadySubmitted),
        }
    }

    fn ensure_known(&self, id: ItemId) -> Result<()> {
        if self.item(id).is_some() {
            Ok(())
        } else {
            Err(Error::UnknownItem(id))
        }
    }
}
