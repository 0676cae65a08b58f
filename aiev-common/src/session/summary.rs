//! Agreement summary computed at submission time

use serde::{Deserialize, Serialize};

/// Read-only agreement snapshot
///
/// Rates are percentages of `feedback_count`, rounded to one decimal with
/// ties to even (1 of 16 gives 6.2, not 6.3). Both rates are 0.0 when no
/// feedback was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub feedback_count: usize,
    pub agreement_count: usize,
    pub disagreement_count: usize,
    pub agreement_rate: f64,
    pub disagreement_rate: f64,
}

impl Summary {
    /// Compute from agree/disagree flags
    pub fn from_feedback<'a, I>(feedback: I) -> Self
    where
        I: IntoIterator<Item = &'a bool>,
    {
        let mut agreement_count = 0;
        let mut disagreement_count = 0;
        for &agree in feedback {
            if agree {
                agreement_count += 1;
            } else {
                disagreement_count += 1;
            }
        }
        let feedback_count = agreement_count + disagreement_count;

        Self {
            feedback_count,
            agreement_count,
            disagreement_count,
            agreement_rate: percentage(agreement_count, feedback_count),
            disagreement_rate: percentage(disagreement_count, feedback_count),
        }
    }
}

/// `part / total * 100`, rounded to one decimal; 0.0 for an empty total
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_one_decimal(part as f64 / total as f64 * 100.0)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_three_of_five() {
        let summary = Summary::from_feedback(&[true, false, true, true, false]);
        assert_eq!(summary.feedback_count, 5);
        assert_eq!(summary.agreement_count, 3);
        assert_eq!(summary.disagreement_count, 2);
        assert_eq!(summary.agreement_rate, 60.0);
        assert_eq!(summary.disagreement_rate, 40.0);
    }

    #[test]
    fn test_summary_empty_feedback_is_zero() {
        let summary = Summary::from_feedback(&[] as &[bool]);
        assert_eq!(summary.feedback_count, 0);
        assert_eq!(summary.agreement_rate, 0.0);
        assert_eq!(summary.disagreement_rate, 0.0);
    }

    #[test]
    fn test_summary_rounds_to_one_decimal() {
        // 1/3 and 2/3
        let summary = Summary::from_feedback(&[true, false, false]);
        assert_eq!(summary.agreement_rate, 33.3);
        assert_eq!(summary.disagreement_rate, 66.7);
    }

    #[test]
    fn test_summary_rounds_exact_halves_to_even() {
        // 1/16 = 6.25% and 15/16 = 93.75%
        let flags: Vec<bool> = (0..16).map(|i| i == 0).collect();
        let summary = Summary::from_feedback(&flags);
        assert_eq!(summary.agreement_rate, 6.2);
        assert_eq!(summary.disagreement_rate, 93.8);

        // 1/8 = 12.5% needs no rounding
        let flags: Vec<bool> = (0..8).map(|i| i == 0).collect();
        assert_eq!(Summary::from_feedback(&flags).agreement_rate, 12.5);
    }

    #[test]
    fn test_summary_rates_sum_to_hundred() {
        for total in 1..=7usize {
            for agree in 0..=total {
                let flags: Vec<bool> = (0..total).map(|i| i < agree).collect();
                let summary = Summary::from_feedback(&flags);
                let sum = summary.agreement_rate + summary.disagreement_rate;
                assert!(
                    (sum - 100.0).abs() <= 0.1 + f64::EPSILON,
                    "rates for {agree}/{total} sum to {sum}"
                );
            }
        }
    }
}
