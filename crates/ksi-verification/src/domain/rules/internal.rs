//! # Internal Consistency Rules
//!
//! Checks that need nothing but the signature (and optionally the
//! document hash). Each is vacuously `Ok` when the part it inspects is
//! absent.

use ksi_crypto::hash;
use ksi_signature::{ChainResult, SignatureError};
use tracing::warn;

use super::{check, Rule};
use crate::domain::context::VerificationContext;
use crate::domain::entities::{VerificationErrorCode, VerificationResult};
use crate::domain::errors::Result;

// =============================================================================
// Aggregation chains
// =============================================================================

/// Document hash equals the hash the signature was issued for (GEN-1).
///
/// For RFC 3161 signatures that is the record's input hash, otherwise the
/// lowest aggregation chain's input hash.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentHashRule;

impl Rule for DocumentHashRule {
    fn name(&self) -> &str {
        "DocumentHashVerificationRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let Some(document_hash) = context.document_hash() else {
            return Ok(VerificationResult::ok(self.name()));
        };
        let signature = context.signature();
        let expected = match signature.rfc3161_record() {
            Some(record) => record.input_hash(),
            None => signature.input_hash(),
        };
        Ok(check(self, document_hash == expected, VerificationErrorCode::Gen01))
    }
}

/// RFC 3161 record output leads to the lowest aggregation chain (INT-01).
#[derive(Clone, Copy, Debug, Default)]
pub struct AggregationChainInputHashRule;

impl Rule for AggregationChainInputHashRule {
    fn name(&self) -> &str {
        "AggregationChainInputHashVerificationRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let signature = context.signature();
        let Some(record) = signature.rfc3161_record() else {
            return Ok(VerificationResult::ok(self.name()));
        };
        let chain_input = signature.input_hash();
        let record_output = record.output_hash(record.input_hash())?;
        let expected = hash(chain_input.algorithm(), &record_output.imprint())
            .map_err(SignatureError::from)?;
        Ok(check(self, &expected == chain_input, VerificationErrorCode::Int01))
    }
}

/// Every aggregation chain's output feeds the next chain's input (INT-01).
#[derive(Clone, Copy, Debug, Default)]
pub struct AggregationHashChainConsistencyRule;

impl Rule for AggregationHashChainConsistencyRule {
    fn name(&self) -> &str {
        "AggregationHashChainConsistencyRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let chains = context.signature().aggregation_chains();
        let mut previous: Option<ChainResult> = None;
        for (position, chain) in chains.iter().enumerate() {
            let input = match previous {
                Some(result) => {
                    if &result.hash != chain.input_hash() {
                        warn!(
                            position,
                            expected = %result.hash,
                            actual = %chain.input_hash(),
                            "Aggregation hash chain output does not match next input"
                        );
                        return Ok(VerificationResult::fail(self.name(), VerificationErrorCode::Int01));
                    }
                    result
                }
                None => ChainResult::new(0, chain.input_hash().clone()),
            };
            previous = match chain.output_hash(&input) {
                Ok(result) => Some(result),
                Err(SignatureError::LevelOverflow(level)) => {
                    warn!(position, level, "Aggregation hash chain level exceeds 255");
                    return Ok(VerificationResult::fail(self.name(), VerificationErrorCode::Int01));
                }
                Err(e) => return Err(e.into()),
            };
        }
        Ok(VerificationResult::ok(self.name()))
    }
}

/// All aggregation chains carry the same aggregation time (INT-02).
#[derive(Clone, Copy, Debug, Default)]
pub struct AggregationHashChainTimeConsistencyRule;

impl Rule for AggregationHashChainTimeConsistencyRule {
    fn name(&self) -> &str {
        "AggregationHashChainTimeConsistencyRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let signature = context.signature();
        let time = signature.aggregation_time();
        let consistent = signature
            .aggregation_chains()
            .iter()
            .all(|c| c.aggregation_time() == time)
            && signature
                .rfc3161_record()
                .map_or(true, |r| r.aggregation_time() == time);
        Ok(check(self, consistent, VerificationErrorCode::Int02))
    }
}

/// Chain indices match link shapes and nest from the lowest chain up (INT-10).
#[derive(Clone, Copy, Debug, Default)]
pub struct AggregationHashChainIndexRule;

impl Rule for AggregationHashChainIndexRule {
    fn name(&self) -> &str {
        "AggregationHashChainIndexRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let chains = context.signature().aggregation_chains();

        let shapes_match = chains
            .iter()
            .all(|c| c.shape().is_some() && c.shape() == c.chain_index().last().copied());

        // lower index = upper index + one element
        let nested = chains.windows(2).all(|pair| {
            let (lower, upper) = (pair[0].chain_index(), pair[1].chain_index());
            lower.len() == upper.len() + 1 && lower.starts_with(upper)
        });

        Ok(check(self, shapes_match && nested, VerificationErrorCode::Int10))
    }
}

// =============================================================================
// Calendar chain
// =============================================================================

/// Calendar chain input equals the aggregation root (INT-03).
#[derive(Clone, Copy, Debug, Default)]
pub struct CalendarHashChainInputHashRule;

impl Rule for CalendarHashChainInputHashRule {
    fn name(&self) -> &str {
        "CalendarHashChainInputHashVerificationRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let signature = context.signature();
        let Some(calendar) = signature.calendar_chain() else {
            return Ok(VerificationResult::ok(self.name()));
        };
        let root = match signature.aggregation_root() {
            Ok(root) => root,
            Err(SignatureError::LevelOverflow(_)) => {
                return Ok(VerificationResult::fail(self.name(), VerificationErrorCode::Int01));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(check(self, calendar.input_hash() == &root.hash, VerificationErrorCode::Int03))
    }
}

/// Calendar chain aggregation time equals the signature's (INT-04).
#[derive(Clone, Copy, Debug, Default)]
pub struct CalendarHashChainAggregationTimeRule;

impl Rule for CalendarHashChainAggregationTimeRule {
    fn name(&self) -> &str {
        "CalendarHashChainAggregationTimeRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let signature = context.signature();
        let passed = signature
            .calendar_chain()
            .map_or(true, |c| c.aggregation_time() == signature.aggregation_time());
        Ok(check(self, passed, VerificationErrorCode::Int04))
    }
}

/// Registration time implied by the calendar shape equals the aggregation time (INT-05).
#[derive(Clone, Copy, Debug, Default)]
pub struct CalendarHashChainRegistrationTimeRule;

impl Rule for CalendarHashChainRegistrationTimeRule {
    fn name(&self) -> &str {
        "CalendarHashChainRegistrationTimeRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let signature = context.signature();
        let passed = signature
            .calendar_chain()
            .map_or(true, |c| c.registration_time() == signature.aggregation_time());
        Ok(check(self, passed, VerificationErrorCode::Int05))
    }
}

// =============================================================================
// Records anchored to the calendar chain
// =============================================================================

/// Calendar authentication record publication time equals the calendar's (INT-06).
#[derive(Clone, Copy, Debug, Default)]
pub struct CalendarAuthenticationRecordPublicationTimeRule;

impl Rule for CalendarAuthenticationRecordPublicationTimeRule {
    fn name(&self) -> &str {
        "CalendarAuthenticationRecordAggregationTimeRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let signature = context.signature();
        let passed = match (signature.calendar_authentication_record(), signature.calendar_chain()) {
            (Some(record), Some(calendar)) => {
                record.publication_data().publication_time() == calendar.publication_time()
            }
            _ => true,
        };
        Ok(check(self, passed, VerificationErrorCode::Int06))
    }
}

/// Calendar authentication record hash equals the calendar output (INT-08).
#[derive(Clone, Copy, Debug, Default)]
pub struct CalendarAuthenticationRecordHashRule;

impl Rule for CalendarAuthenticationRecordHashRule {
    fn name(&self) -> &str {
        "CalendarAuthenticationRecordAggregationHashRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let signature = context.signature();
        let passed = match (signature.calendar_authentication_record(), signature.calendar_chain()) {
            (Some(record), Some(calendar)) => {
                record.publication_data().publication_hash() == calendar.output_hash()
            }
            _ => true,
        };
        Ok(check(self, passed, VerificationErrorCode::Int08))
    }
}

/// Publication record time equals the calendar publication time (INT-07).
#[derive(Clone, Copy, Debug, Default)]
pub struct SignaturePublicationRecordPublicationTimeRule;

impl Rule for SignaturePublicationRecordPublicationTimeRule {
    fn name(&self) -> &str {
        "SignaturePublicationRecordPublicationTimeRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let signature = context.signature();
        let passed = match (signature.publication_record(), signature.calendar_chain()) {
            (Some(record), Some(calendar)) => {
                record.publication_data().publication_time() == calendar.publication_time()
            }
            _ => true,
        };
        Ok(check(self, passed, VerificationErrorCode::Int07))
    }
}

/// Publication record hash equals the calendar output (INT-09).
#[derive(Clone, Copy, Debug, Default)]
pub struct SignaturePublicationRecordPublicationHashRule;

impl Rule for SignaturePublicationRecordPublicationHashRule {
    fn name(&self) -> &str {
        "SignaturePublicationRecordPublicationHashRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let signature = context.signature();
        let passed = match (signature.publication_record(), signature.calendar_chain()) {
            (Some(record), Some(calendar)) => {
                record.publication_data().publication_hash() == calendar.output_hash()
            }
            _ => true,
        };
        Ok(check(self, passed, VerificationErrorCode::Int09))
    }
}
