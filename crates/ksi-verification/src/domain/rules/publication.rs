//! # Publication-Based Rules
//!
//! Trust the calendar through a publication: the signature's own record,
//! a record from the publications file, or one supplied by the caller.
//! Unextended signatures are checked against a calendar chain fetched
//! from the extender.

use ksi_signature::{CalendarHashChain, PublicationData};

use super::{applicable, check, Rule};
use crate::domain::context::VerificationContext;
use crate::domain::entities::{VerificationErrorCode, VerificationResult};
use crate::domain::errors::{Result, VerificationError};

// =============================================================================
// Signature publication record
// =============================================================================

/// Signature carries a publication record; `Na` otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignaturePublicationRecordExistenceRule;

impl Rule for SignaturePublicationRecordExistenceRule {
    fn name(&self) -> &str {
        "SignaturePublicationRecordExistenceRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        Ok(applicable(self, context.signature().publication_record().is_some()))
    }
}

/// Caller allows contacting the extender; `Na` otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtendingPermittedRule;

impl Rule for ExtendingPermittedRule {
    fn name(&self) -> &str {
        "ExtendingPermittedVerificationRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        Ok(applicable(self, context.is_extending_allowed()))
    }
}

// =============================================================================
// Publications file
// =============================================================================

/// Publications file lists the signature's publication; `Na` otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct PublicationsFileContainsSignaturePublicationRule;

impl Rule for PublicationsFileContainsSignaturePublicationRule {
    fn name(&self) -> &str {
        "PublicationsFileContainsSignaturePublicationRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let Some(record) = context.signature().publication_record() else {
            return Ok(applicable(self, false));
        };
        Ok(applicable(self, context.trust_store()?.contains(record)))
    }
}

/// Nearest file publication after the aggregation time, and the calendar
/// chain extended to it. `None` when the file has no such publication.
fn file_publication(
    context: &VerificationContext<'_>,
) -> Result<Option<(PublicationData, CalendarHashChain)>> {
    let aggregation_time = context.signature().aggregation_time();
    let Some(record) = context.trust_store()?.nearest_publication_after(aggregation_time) else {
        return Ok(None);
    };
    let publication = record.publication_data().clone();
    let extended = context.extended_calendar_chain(Some(publication.publication_time()))?;
    Ok(Some((publication, extended)))
}

/// Extended calendar root equals the file's published hash (PUB-01).
#[derive(Clone, Copy, Debug, Default)]
pub struct PublicationsFilePublicationHashMatchesExtenderResponseRule;

impl Rule for PublicationsFilePublicationHashMatchesExtenderResponseRule {
    fn name(&self) -> &str {
        "PublicationsFilePublicationHashMatchesExtenderResponseRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let Some((publication, extended)) = file_publication(context)? else {
            return Ok(applicable(self, false));
        };
        Ok(hash_matches(self, &publication, &extended))
    }
}

/// Extended chain has the file publication's time and registers the
/// signature's aggregation time (PUB-02).
#[derive(Clone, Copy, Debug, Default)]
pub struct PublicationsFilePublicationTimeMatchesExtenderResponseRule;

impl Rule for PublicationsFilePublicationTimeMatchesExtenderResponseRule {
    fn name(&self) -> &str {
        "PublicationsFilePublicationTimeMatchesExtenderResponseRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let Some((publication, extended)) = file_publication(context)? else {
            return Ok(applicable(self, false));
        };
        Ok(time_matches(self, context, &publication, &extended))
    }
}

/// Extended chain starts from the signature's aggregation root (PUB-03).
#[derive(Clone, Copy, Debug, Default)]
pub struct PublicationsFileExtendedSignatureInputHashRule;

impl Rule for PublicationsFileExtendedSignatureInputHashRule {
    fn name(&self) -> &str {
        "PublicationsFileExtendedSignatureInputHashRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let Some((_, extended)) = file_publication(context)? else {
            return Ok(applicable(self, false));
        };
        input_hash_matches(self, context, &extended)
    }
}

// =============================================================================
// User-provided publication
// =============================================================================

fn user_publication<'c>(context: &'c VerificationContext<'_>) -> Result<&'c PublicationData> {
    context
        .user_publication()
        .ok_or(VerificationError::MissingContext("user publication"))
}

/// Caller supplied a publication; `Na` otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct UserProvidedPublicationExistenceRule;

impl Rule for UserProvidedPublicationExistenceRule {
    fn name(&self) -> &str {
        "UserProvidedPublicationExistenceRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        Ok(applicable(self, context.user_publication().is_some()))
    }
}

/// Signature's publication record is the user publication; `Na` otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct UserProvidedPublicationVerificationRule;

impl Rule for UserProvidedPublicationVerificationRule {
    fn name(&self) -> &str {
        "UserProvidedPublicationVerificationRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let user = user_publication(context)?;
        let record = context
            .signature()
            .publication_record()
            .ok_or(VerificationError::MissingContext("signature publication record"))?;
        Ok(applicable(self, record.publication_data().same_publication(user)))
    }
}

/// Signature predates the user publication; `Na` when it does not, since
/// such a publication cannot prove anything about it.
#[derive(Clone, Copy, Debug, Default)]
pub struct UserProvidedPublicationCreationTimeRule;

impl Rule for UserProvidedPublicationCreationTimeRule {
    fn name(&self) -> &str {
        "UserProvidedPublicationCreationTimeVerificationRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let user = user_publication(context)?;
        Ok(applicable(
            self,
            context.signature().aggregation_time() < user.publication_time(),
        ))
    }
}

/// Extended calendar root equals the user's published hash (PUB-01).
#[derive(Clone, Copy, Debug, Default)]
pub struct UserProvidedPublicationHashMatchesExtendedResponseRule;

impl Rule for UserProvidedPublicationHashMatchesExtendedResponseRule {
    fn name(&self) -> &str {
        "UserProvidedPublicationHashMatchesExtendedResponseRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let user = user_publication(context)?;
        let extended = context.extended_calendar_chain(Some(user.publication_time()))?;
        Ok(hash_matches(self, user, &extended))
    }
}

/// Extended chain has the user publication's time and registers the
/// signature's aggregation time (PUB-02).
#[derive(Clone, Copy, Debug, Default)]
pub struct UserProvidedPublicationTimeMatchesExtendedResponseRule;

impl Rule for UserProvidedPublicationTimeMatchesExtendedResponseRule {
    fn name(&self) -> &str {
        "UserProvidedPublicationTimeMatchesExtendedResponseRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let user = user_publication(context)?;
        let extended = context.extended_calendar_chain(Some(user.publication_time()))?;
        Ok(time_matches(self, context, user, &extended))
    }
}

/// Chain extended to the user publication starts from the aggregation root (PUB-03).
#[derive(Clone, Copy, Debug, Default)]
pub struct UserProvidedPublicationExtendedSignatureInputHashRule;

impl Rule for UserProvidedPublicationExtendedSignatureInputHashRule {
    fn name(&self) -> &str {
        "UserProvidedPublicationExtendedSignatureInputHashRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let user = user_publication(context)?;
        let extended = context.extended_calendar_chain(Some(user.publication_time()))?;
        input_hash_matches(self, context, &extended)
    }
}

// =============================================================================
// Shared comparisons
// =============================================================================

fn hash_matches(
    rule: &dyn Rule,
    publication: &PublicationData,
    extended: &CalendarHashChain,
) -> VerificationResult {
    check(
        rule,
        extended.output_hash() == publication.publication_hash(),
        VerificationErrorCode::Pub01,
    )
}

fn time_matches(
    rule: &dyn Rule,
    context: &VerificationContext<'_>,
    publication: &PublicationData,
    extended: &CalendarHashChain,
) -> VerificationResult {
    check(
        rule,
        extended.publication_time() == publication.publication_time()
            && extended.registration_time() == context.signature().aggregation_time(),
        VerificationErrorCode::Pub02,
    )
}

fn input_hash_matches(
    rule: &dyn Rule,
    context: &VerificationContext<'_>,
    extended: &CalendarHashChain,
) -> Result<VerificationResult> {
    let root = context.signature().aggregation_root()?;
    Ok(check(rule, extended.input_hash() == &root.hash, VerificationErrorCode::Pub03))
}
