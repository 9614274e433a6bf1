//! Extraction parameters and their boundary checks.

use crate::model::SequenceError;

/// Default maximum difference between adjacent ROLL values.
pub const DEFAULT_DIFF: f64 = 4.0;

/// Default minimum number of rows a run needs to become a group.
pub const DEFAULT_RECURRENCE: usize = 9;

/// Validated `(diff, recurrence)` pair handed to the extractor.
///
/// Both values are at least 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionParams {
    diff: f64,
    recurrence: usize,
}

impl ExtractionParams {
    pub fn new(diff: f64, recurrence: usize) -> Result<Self, SequenceError> {
        if !diff.is_finite() || diff < 1.0 {
            return Err(SequenceError::InvalidParameter {
                name: "diff",
                value: diff.to_string(),
            });
        }
        if recurrence < 1 {
            return Err(SequenceError::InvalidParameter {
                name: "recurrence",
                value: recurrence.to_string(),
            });
        }
        Ok(Self { diff, recurrence })
    }

    pub fn diff(&self) -> f64 {
        self.diff
    }

    pub fn recurrence(&self) -> usize {
        self.recurrence
    }
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self {
            diff: DEFAULT_DIFF,
            recurrence: DEFAULT_RECURRENCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = ExtractionParams::default();
        assert_eq!(params.diff(), 4.0);
        assert_eq!(params.recurrence(), 9);
    }

    #[test]
    fn test_lower_bound_is_inclusive() {
        let params = ExtractionParams::new(1.0, 1).expect("1 is the smallest allowed value");
        assert_eq!(params.diff(), 1.0);
        assert_eq!(params.recurrence(), 1);
    }

    #[test]
    fn test_zero_and_negative_diff_rejected() {
        for diff in [0.0, -3.0, 0.5, f64::NAN] {
            assert!(
                ExtractionParams::new(diff, 9).is_err(),
                "diff {} should be rejected",
                diff
            );
        }
    }

    #[test]
    fn test_zero_recurrence_rejected() {
        let err = ExtractionParams::new(4.0, 0).expect_err("recurrence 0 is invalid");
        assert_eq!(err.to_string(), "Invalid recurrence: 0 (must be at least 1)");
    }
}
