//! # Key-Based Rules
//!
//! Trust the calendar through the PKI signature on its authentication
//! record.

use tracing::warn;

use super::{applicable, check, Rule};
use crate::domain::context::VerificationContext;
use crate::domain::entities::{VerificationErrorCode, VerificationResult};
use crate::domain::errors::{Result, VerificationError};

/// Signature has a calendar hash chain; `Na` otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct CalendarHashChainExistenceRule;

impl Rule for CalendarHashChainExistenceRule {
    fn name(&self) -> &str {
        "CalendarHashChainExistenceRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        Ok(applicable(self, context.signature().calendar_chain().is_some()))
    }
}

/// Signature has a calendar authentication record; `Na` otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct CalendarAuthenticationRecordExistenceRule;

impl Rule for CalendarAuthenticationRecordExistenceRule {
    fn name(&self) -> &str {
        "CalendarAuthenticationRecordExistenceRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        Ok(applicable(
            self,
            context.signature().calendar_authentication_record().is_some(),
        ))
    }
}

/// Trust store knows the certificate that signed the record (KEY-01).
#[derive(Clone, Copy, Debug, Default)]
pub struct CertificateExistenceRule;

impl Rule for CertificateExistenceRule {
    fn name(&self) -> &str {
        "CertificateExistenceRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let record = context
            .signature()
            .calendar_authentication_record()
            .ok_or(VerificationError::MissingContext("calendar authentication record"))?;
        let certificate_id = record.signature_data().certificate_id();
        let found = context
            .trust_store()?
            .find_certificate_by_id(certificate_id)
            .is_some();
        Ok(check(self, found, VerificationErrorCode::Key01))
    }
}

/// PKI signature over the record's publication data verifies (KEY-02).
///
/// Provider failures of any kind are a `Fail`, not an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct CalendarAuthenticationRecordSignatureRule;

impl Rule for CalendarAuthenticationRecordSignatureRule {
    fn name(&self) -> &str {
        "CalendarAuthenticationRecordSignatureVerificationRule"
    }

    fn verify(&self, context: &VerificationContext<'_>) -> Result<VerificationResult> {
        let record = context
            .signature()
            .calendar_authentication_record()
            .ok_or(VerificationError::MissingContext("calendar authentication record"))?;
        let signature_data = record.signature_data();

        let Some(certificate) = context
            .trust_store()?
            .find_certificate_by_id(signature_data.certificate_id())
        else {
            return Ok(VerificationResult::fail(self.name(), VerificationErrorCode::Key01));
        };

        let signed_bytes = record.signed_bytes()?;
        let verdict = context.crypto_provider()?.verify_signature(
            signature_data.signature_type(),
            &signed_bytes,
            signature_data.signature_value(),
            certificate.x509_certificate(),
        );

        match verdict {
            Ok(()) => Ok(VerificationResult::ok(self.name())),
            Err(e) => {
                warn!(error = %e, "Calendar authentication record signature rejected");
                Ok(VerificationResult::fail(self.name(), VerificationErrorCode::Key02))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::VerificationOutcome;
    use crate::test_support::*;
    use ksi_crypto::MockCryptoProvider;
    use ksi_signature::{CalendarAuthenticationRecord, Signature, SignatureData};

    #[test]
    fn test_existence_rules() {
        let bare = sample_signature();
        let context = VerificationContext::for_signature(&bare);
        let result = CalendarHashChainExistenceRule.verify(&context).unwrap();
        assert_eq!(result.outcome, VerificationOutcome::Na);
        assert_eq!(result.error, Some(VerificationErrorCode::Gen02));

        let signed = with_auth_record(&bare);
        let context = VerificationContext::for_signature(&signed);
        assert!(CalendarHashChainExistenceRule.verify(&context).unwrap().is_ok());
        assert!(CalendarAuthenticationRecordExistenceRule.verify(&context).unwrap().is_ok());
    }

    #[test]
    fn test_signature_verified_with_trusted_certificate() {
        let signature = with_auth_record(&sample_signature());
        let file = publications_file(vec![]);
        let provider = MockCryptoProvider::accepting();
        let context = VerificationContext::builder()
            .signature(&signature)
            .trust_store(&file)
            .crypto_provider(&provider)
            .build()
            .unwrap();
        assert!(CertificateExistenceRule.verify(&context).unwrap().is_ok());
        assert!(CalendarAuthenticationRecordSignatureRule.verify(&context).unwrap().is_ok());
    }

    #[test]
    fn test_provider_rejection_is_key02() {
        let signature = with_auth_record(&sample_signature());
        let file = publications_file(vec![]);
        let provider = MockCryptoProvider::rejecting();
        let context = VerificationContext::builder()
            .signature(&signature)
            .trust_store(&file)
            .crypto_provider(&provider)
            .build()
            .unwrap();
        let result = CalendarAuthenticationRecordSignatureRule.verify(&context).unwrap();
        assert_eq!(result.outcome, VerificationOutcome::Fail);
        assert_eq!(result.error, Some(VerificationErrorCode::Key02));
    }

    #[test]
    fn test_unsupported_signature_type_is_key02() {
        let base = sample_signature();
        let calendar = calendar_for(&base, AGGREGATION_TIME);
        let record = CalendarAuthenticationRecord::new(
            calendar.publication_data(),
            SignatureData::new("1.2.3.4", vec![1], CERTIFICATE_ID.to_vec(), None),
        );
        let signature = Signature::from_parts(
            base.aggregation_chains().to_vec(),
            Some(calendar),
            Some(record),
            None,
            None,
            None,
        )
        .unwrap();
        let file = publications_file(vec![]);
        let provider = MockCryptoProvider::accepting();
        let context = VerificationContext::builder()
            .signature(&signature)
            .trust_store(&file)
            .crypto_provider(&provider)
            .build()
            .unwrap();
        let result = CalendarAuthenticationRecordSignatureRule.verify(&context).unwrap();
        assert_eq!(result.error, Some(VerificationErrorCode::Key02));
    }

    #[test]
    fn test_unknown_certificate_is_key01() {
        let base = sample_signature();
        let calendar = calendar_for(&base, AGGREGATION_TIME);
        let record = CalendarAuthenticationRecord::new(
            calendar.publication_data(),
            SignatureData::new(ksi_crypto::OID_SHA256_WITH_RSA, vec![1], vec![9, 9], None),
        );
        let signature = Signature::from_parts(
            base.aggregation_chains().to_vec(),
            Some(calendar),
            Some(record),
            None,
            None,
            None,
        )
        .unwrap();
        let file = publications_file(vec![]);
        let context = VerificationContext::builder()
            .signature(&signature)
            .trust_store(&file)
            .build()
            .unwrap();
        assert_eq!(
            CertificateExistenceRule.verify(&context).unwrap().error,
            Some(VerificationErrorCode::Key01)
        );
    }

    #[test]
    fn test_missing_trust_store_is_error() {
        let signature = with_auth_record(&sample_signature());
        let context = VerificationContext::for_signature(&signature);
        assert!(matches!(
            CertificateExistenceRule.verify(&context),
            Err(VerificationError::MissingContext(_))
        ));
    }
}
