//! Tax Registration Number (TRN) validation.
//!
//! A TRN is 15 digits. The first digit is 1, 2 or 3 and the last digit is a
//! weighted checksum over the first fourteen:
//!
//! ```text
//! check = (Σ_{i=1..14} digit_i * i) mod 10
//! ```

use super::result::{Findings, ScoreWeights, ValidationResult};

/// Number of digits in a TRN.
pub const TRN_LENGTH: usize = 15;

const TRN_WEIGHTS: ScoreWeights = ScoreWeights::new(25, 0);

/// Remove the separators people commonly type into a TRN (spaces, dashes).
pub fn normalize_trn(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Compute the check digit for a 14-digit TRN prefix.
///
/// Returns `None` if the prefix is not exactly 14 ASCII digits.
pub fn trn_check_digit(prefix: &str) -> Option<u8> {
    if prefix.len() != TRN_LENGTH - 1 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let sum: u32 = prefix
        .bytes()
        .enumerate()
        .map(|(i, b)| u32::from(b - b'0') * (i as u32 + 1))
        .sum();
    Some((sum % 10) as u8)
}

/// Validate a TRN. Produces errors only; the score loses 25 points per error.
pub fn validate_trn(input: &str) -> ValidationResult {
    let mut findings = Findings::default();
    let trn = normalize_trn(input);

    if trn.is_empty() {
        findings.error("TRN is required");
        return findings.finish(TRN_WEIGHTS);
    }

    let all_digits = trn.bytes().all(|b| b.is_ascii_digit());

    let length = trn.chars().count();
    if length != TRN_LENGTH {
        findings.error(format!(
            "TRN must be exactly {TRN_LENGTH} digits, got {length}"
        ));
    }

    if !all_digits {
        findings.error("TRN must contain digits only");
    }

    if !matches!(trn.as_bytes()[0], b'1' | b'2' | b'3') {
        findings.error("TRN must start with 1, 2 or 3");
    }

    if trn.len() == TRN_LENGTH && all_digits {
        let (prefix, check) = trn.split_at(TRN_LENGTH - 1);
        // Both halves are known to be ASCII digits here.
        let expected = trn_check_digit(prefix);
        let actual = check.bytes().next().map(|b| b - b'0');
        if expected != actual {
            findings.error("TRN checksum digit is invalid");
        }
    }

    findings.finish(TRN_WEIGHTS)
}

/// Shorthand for `validate_trn(input).is_valid()`.
pub fn is_valid_trn(input: &str) -> bool {
    validate_trn(input).is_valid()
}
