use serde::{Deserialize, Serialize};

/// Score deductions applied per finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    /// Points deducted per error.
    pub error: u32,
    /// Points deducted per warning.
    pub warning: u32,
}

impl ScoreWeights {
    pub const fn new(error: u32, warning: u32) -> Self {
        Self { error, warning }
    }
}

/// Verdict produced by every validator.
///
/// Invariant: `is_valid() == errors().is_empty()`. The score starts at 100,
/// drops by the configured weight per finding, and is floored at 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    score: u8,
}

impl ValidationResult {
    /// A passing result with no findings and a score of 100.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            score: 100,
        }
    }

    /// A failing result carrying a single error and a score of 0.
    ///
    /// Used when the document cannot be examined at all (unknown entity
    /// type, unreadable payload).
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![error.into()],
            warnings: Vec::new(),
            score: 0,
        }
    }

    /// Build a result from collected findings.
    pub fn from_findings(errors: Vec<String>, warnings: Vec<String>, weights: ScoreWeights) -> Self {
        let deduction = u64::from(weights.error) * errors.len() as u64
            + u64::from(weights.warning) * warnings.len() as u64;
        let score = 100u64.saturating_sub(deduction) as u8;
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            score,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Compliance score in `0..=100`.
    pub fn score(&self) -> u8 {
        self.score
    }

    /// Merge two verdicts for the same entity.
    ///
    /// Findings are concatenated with `self` first; the score is the lower
    /// of the two.
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.is_valid = self.is_valid && other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.score = self.score.min(other.score);
        self
    }
}

/// Accumulates findings while a validator walks a document.
#[derive(Debug, Default)]
pub(crate) struct Findings {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Findings {
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Fold another validator's errors in, prefixing each message.
    pub fn absorb_errors(&mut self, prefix: &str, result: &ValidationResult) {
        self.errors
            .extend(result.errors().iter().map(|e| format!("{prefix}: {e}")));
    }

    pub fn finish(self, weights: ScoreWeights) -> ValidationResult {
        ValidationResult::from_findings(self.errors, self.warnings, weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_floored_at_zero() {
        let errors = (0..10).map(|i| format!("e{i}")).collect();
        let result = ValidationResult::from_findings(errors, vec![], ScoreWeights::new(25, 0));
        assert_eq!(result.score(), 0);
        assert!(!result.is_valid());
    }

    #[test]
    fn warnings_do_not_invalidate() {
        let result =
            ValidationResult::from_findings(vec![], vec!["w".into()], ScoreWeights::new(15, 5));
        assert!(result.is_valid());
        assert_eq!(result.score(), 95);
    }

    #[test]
    fn merge_keeps_order_and_min_score() {
        let a = ValidationResult::from_findings(
            vec!["a1".into()],
            vec!["aw".into()],
            ScoreWeights::new(15, 5),
        );
        let b = ValidationResult::from_findings(vec![], vec!["bw".into()], ScoreWeights::new(25, 10));
        let merged = a.merge(b);
        assert!(!merged.is_valid());
        assert_eq!(merged.errors(), ["a1"]);
        assert_eq!(merged.warnings(), ["aw", "bw"]);
        assert_eq!(merged.score(), 80);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_string(&ValidationResult::valid()).unwrap();
        assert!(json.contains("\"isValid\":true"));
        assert!(json.contains("\"score\":100"));
    }
}
