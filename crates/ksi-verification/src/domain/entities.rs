//! # Verification Results
//!
//! Outcomes and the closed taxonomy of verification error codes.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Outcome
// =============================================================================

/// Three-valued verdict of a rule or policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationOutcome {
    /// Check passed.
    Ok,
    /// Check failed; the signature is invalid.
    Fail,
    /// Check could not decide.
    Na,
}

// =============================================================================
// Error codes
// =============================================================================

/// Reason attached to a `Fail` or `Na` verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationErrorCode {
    /// Wrong document.
    Gen01,
    /// Verification inconclusive.
    Gen02,
    /// Inconsistent aggregation hash chains.
    Int01,
    /// Inconsistent aggregation hash chain aggregation times.
    Int02,
    /// Calendar hash chain input hash mismatch.
    Int03,
    /// Calendar hash chain aggregation time mismatch.
    Int04,
    /// Calendar hash chain shape inconsistent with aggregation time.
    Int05,
    /// Calendar authentication record aggregation time mismatch.
    Int06,
    /// Publication record publication time mismatch.
    Int07,
    /// Calendar authentication record aggregation hash mismatch.
    Int08,
    /// Publication record publication hash mismatch.
    Int09,
    /// Aggregation hash chain index mismatch.
    Int10,
    /// Extender response calendar root hash mismatch.
    Pub01,
    /// Extender response inconsistent.
    Pub02,
    /// Extender response input hash mismatch.
    Pub03,
    /// Certificate not found.
    Key01,
    /// PKI signature not verified with certificate.
    Key02,
    /// Certificate not valid at aggregation time.
    Key03,
    /// Calendar root hash mismatch.
    Cal01,
    /// Aggregation hash chain root hash and calendar hash chain input hash mismatch.
    Cal02,
    /// Aggregation time mismatch.
    Cal03,
    /// Calendar hash chain right links are inconsistent.
    Cal04,
}

impl VerificationErrorCode {
    /// Short code such as `INT-01`.
    pub fn code(self) -> &'static str {
        use VerificationErrorCode::*;
        match self {
            Gen01 => "GEN-1",
            Gen02 => "GEN-2",
            Int01 => "INT-01",
            Int02 => "INT-02",
            Int03 => "INT-03",
            Int04 => "INT-04",
            Int05 => "INT-05",
            Int06 => "INT-06",
            Int07 => "INT-07",
            Int08 => "INT-08",
            Int09 => "INT-09",
            Int10 => "INT-10",
            Pub01 => "PUB-01",
            Pub02 => "PUB-02",
            Pub03 => "PUB-03",
            Key01 => "KEY-01",
            Key02 => "KEY-02",
            Key03 => "KEY-03",
            Cal01 => "CAL-01",
            Cal02 => "CAL-02",
            Cal03 => "CAL-03",
            Cal04 => "CAL-04",
        }
    }

    /// Human-readable description.
    pub fn message(self) -> &'static str {
        use VerificationErrorCode::*;
        match self {
            Gen01 => "Wrong document",
            Gen02 => "Verification inconclusive",
            Int01 => "Inconsistent aggregation hash chains",
            Int02 => "Inconsistent aggregation hash chain aggregation times",
            Int03 => "Calendar hash chain input hash mismatch",
            Int04 => "Calendar hash chain aggregation time mismatch",
            Int05 => "Calendar hash chain shape inconsistent with aggregation time",
            Int06 => "Calendar authentication record aggregation time mismatch",
            Int07 => "Publication record publication time mismatch",
            Int08 => "Calendar authentication record aggregation hash mismatch",
            Int09 => "Publication record publication hash mismatch",
            Int10 => "Aggregation hash chain index mismatch",
            Pub01 => "Extender response calendar root hash mismatch",
            Pub02 => "Extender response inconsistent",
            Pub03 => "Extender response input hash mismatch",
            Key01 => "Certificate not found",
            Key02 => "PKI signature not verified with certificate",
            Key03 => "Certificate not valid at aggregation time",
            Cal01 => "Calendar root hash mismatch",
            Cal02 => "Aggregation hash chain root hash and calendar hash chain input hash mismatch",
            Cal03 => "Aggregation time mismatch",
            Cal04 => "Calendar hash chain right links are inconsistent",
        }
    }
}

impl fmt::Display for VerificationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.message())
    }
}

// =============================================================================
// Result
// =============================================================================

/// Verdict of one rule, or of a whole policy with its rule trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Rule or policy name.
    pub rule_name: String,
    /// Verdict.
    pub outcome: VerificationOutcome,
    /// Reason for a `Fail` or `Na`.
    pub error: Option<VerificationErrorCode>,
    /// Rule results in evaluation order (policies only).
    pub child_results: Vec<VerificationResult>,
}

impl VerificationResult {
    /// Passed.
    pub fn ok(rule_name: impl Into<String>) -> Self {
        Self::new(rule_name, VerificationOutcome::Ok, None)
    }

    /// Failed with `code`.
    pub fn fail(rule_name: impl Into<String>, code: VerificationErrorCode) -> Self {
        Self::new(rule_name, VerificationOutcome::Fail, Some(code))
    }

    /// Inconclusive with `code`.
    pub fn na(rule_name: impl Into<String>, code: VerificationErrorCode) -> Self {
        Self::new(rule_name, VerificationOutcome::Na, Some(code))
    }

    fn new(
        rule_name: impl Into<String>,
        outcome: VerificationOutcome,
        error: Option<VerificationErrorCode>,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            outcome,
            error,
            child_results: Vec::new(),
        }
    }

    /// Policy result: the final verdict plus every rule result on the way.
    pub fn with_children(
        rule_name: impl Into<String>,
        last: &VerificationResult,
        child_results: Vec<VerificationResult>,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            outcome: last.outcome,
            error: last.error,
            child_results,
        }
    }

    /// True for `Ok`.
    pub fn is_ok(&self) -> bool {
        self.outcome == VerificationOutcome::Ok
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.rule_name, self.outcome)?;
        if let Some(code) = self.error {
            write!(f, " [{}]", code)?;
        }
        Ok(())
    }
}
