//! # Calendar-Based Rules
//!
//! Compare the signature with a calendar chain fetched from the extender
//! for the signature's own publication time (or the calendar head when
//! the signature has no calendar chain yet).

use ksi_signature::CalendarHashChain;

use super::{check, Rule};
use crate::domain::context::VerificationContext;
use crate::domain::entities::{VerificationErrorCode, VerificationResult};
use crate::domain::errors::Result;

fn extended_for_signature(context: &VerificationContext<'_>) -> Result<CalendarHashChain> {
    let publication_time = context
        .signature()
        .calendar_chain()
        .map(|c| c.publication_time());
    context.extended_calendar_chain(publication_time)
}

/// Extended calendar root equals the signature's calendar output (CAL-01).
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtendedSignatureCalendarChainRootHashRule;

impl Rule for ExtendedSignatureCalendarChainRootHashRule {
    fn name(&self) -> &str {
        "ExtendedSignatureCalendarChainRootHashRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let Some(calendar) = context.signature().calendar_chain() else {
            return Ok(VerificationResult::ok(self.name()));
        };
        let extended = extended_for_signature(context)?;
        Ok(check(
            self,
            extended.output_hash() == calendar.output_hash(),
            VerificationErrorCode::Cal01,
        ))
    }
}

/// Extended calendar chain starts from the aggregation root (CAL-02).
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtendedSignatureCalendarChainInputHashRule;

impl Rule for ExtendedSignatureCalendarChainInputHashRule {
    fn name(&self) -> &str {
        "ExtendedSignatureCalendarChainInputHashRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let extended = extended_for_signature(context)?;
        let root = context.signature().aggregation_root()?;
        Ok(check(
            self,
            extended.input_hash() == &root.hash,
            VerificationErrorCode::Cal02,
        ))
    }
}

/// Extended calendar chain aggregation time equals the signature's (CAL-03).
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtendedSignatureCalendarChainAggregationTimeRule;

impl Rule for ExtendedSignatureCalendarChainAggregationTimeRule {
    fn name(&self) -> &str {
        "ExtendedSignatureCalendarChainAggregationTimeRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let extended = extended_for_signature(context)?;
        Ok(check(
            self,
            extended.aggregation_time() == context.signature().aggregation_time(),
            VerificationErrorCode::Cal03,
        ))
    }
}

/// Extended calendar chain agrees with the signature's on every right link (CAL-04).
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtendedSignatureCalendarChainRightLinksMatchRule;

impl Rule for ExtendedSignatureCalendarChainRightLinksMatchRule {
    fn name(&self) -> &str {
        "ExtendedSignatureCalendarHashChainRightLinksMatchRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let Some(calendar) = context.signature().calendar_chain() else {
            return Ok(VerificationResult::ok(self.name()));
        };
        let extended = extended_for_signature(context)?;
        Ok(check(
            self,
            calendar.right_links_match(&extended),
            VerificationErrorCode::Cal04,
        ))
    }
}
