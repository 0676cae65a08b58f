//! Rating scale and item identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identifier of one before/after image pair
pub type ItemId = u32;

/// Quality rating on the 1..=5 scale
///
/// Used both for the precomputed AI rating and for human override ratings.
/// Deserialization goes through [`Rating::new`], so out-of-range values in
/// request bodies are rejected before they reach a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest rating on the scale
    pub const MIN: u8 = 1;
    /// Highest rating on the scale
    pub const MAX: u8 = 5;

    /// Create a rating, failing outside 1..=5
    pub fn new(value: i64) -> Result<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::InvalidRating(value))
        }
    }

    /// Numeric value (1..=5)
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}
