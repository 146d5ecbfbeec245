//! # Verification Flows
//!
//! Each standard policy run against the captured signature with the
//! trust anchor it needs.

#[cfg(test)]
mod tests {
    use ksi_crypto::MockCryptoProvider;
    use ksi_signature::{CertificateRecord, PublicationData};
    use ksi_verification::{
        MockExtender, Policy, VerificationContext, VerificationErrorCode, VerificationOutcome,
    };

    use crate::fixtures::*;

    // =============================================================================
    // KEY-BASED
    // =============================================================================

    #[test]
    fn test_key_based_with_known_certificate() {
        init_tracing();
        let signature = signature();
        let file = publications_file(vec![publication()]);
        let provider = MockCryptoProvider::accepting();
        let context = VerificationContext::builder()
            .signature(&signature)
            .document_hash(document_hash())
            .trust_store(&file)
            .crypto_provider(&provider)
            .build()
            .unwrap();

        let result = Policy::key_based().evaluate(&context).unwrap();
        assert!(result.is_ok(), "{}", result);
    }

    #[test]
    fn test_key_based_unknown_certificate_fails_key01() {
        let signature = signature();
        let file = publications_file_with_certificates(
            vec![publication()],
            vec![CertificateRecord::new(vec![0xDE, 0xAD, 0xBE, 0xEF], vec![0x30])],
        );
        let provider = MockCryptoProvider::accepting();
        let context = VerificationContext::builder()
            .signature(&signature)
            .trust_store(&file)
            .crypto_provider(&provider)
            .build()
            .unwrap();

        let result = Policy::key_based().evaluate(&context).unwrap();
        assert_eq!(result.outcome, VerificationOutcome::Fail);
        assert_eq!(result.error, Some(VerificationErrorCode::Key01));
    }

    #[test]
    fn test_key_based_rejected_signature_fails_key02() {
        let signature = signature();
        let file = publications_file(vec![publication()]);
        let provider = MockCryptoProvider::rejecting();
        let context = VerificationContext::builder()
            .signature(&signature)
            .trust_store(&file)
            .crypto_provider(&provider)
            .build()
            .unwrap();

        let result = Policy::key_based().evaluate(&context).unwrap();
        assert_eq!(result.error, Some(VerificationErrorCode::Key02));
    }

    // =============================================================================
    // PUBLICATIONS FILE
    // =============================================================================

    #[test]
    fn test_file_based_via_extender() {
        let signature = signature();
        let file = publications_file(vec![publication()]);
        let extender = extender();
        let context = VerificationContext::builder()
            .signature(&signature)
            .trust_store(&file)
            .extender(&extender)
            .extending_allowed(true)
            .build()
            .unwrap();

        let result = Policy::publications_file_based().evaluate(&context).unwrap();
        assert!(result.is_ok(), "{}", result);
        // Three rules share one extender round trip.
        assert_eq!(extender.request_count(), 1);
        assert_eq!(
            extender.requests.lock()[0],
            (AGGREGATION_TIME, Some(PUBLICATION_TIME))
        );
    }

    #[test]
    fn test_file_based_without_extending_is_na() {
        let signature = signature();
        let file = publications_file(vec![publication()]);
        let context = VerificationContext::builder()
            .signature(&signature)
            .trust_store(&file)
            .build()
            .unwrap();

        let result = Policy::publications_file_based().evaluate(&context).unwrap();
        assert_eq!(result.outcome, VerificationOutcome::Na);
        assert_eq!(result.error, Some(VerificationErrorCode::Gen02));
    }

    #[test]
    fn test_file_based_picks_nearest_later_publication() {
        let signature = signature();
        let file = publications_file(vec![
            PublicationData::new(AGGREGATION_TIME - 1, other_hash(b"before")),
            PublicationData::new(PUBLICATION_TIME + 86_400, other_hash(b"next day")),
            publication(),
        ]);
        let extender = extender();
        let context = VerificationContext::builder()
            .signature(&signature)
            .trust_store(&file)
            .extender(&extender)
            .extending_allowed(true)
            .build()
            .unwrap();

        assert!(Policy::publications_file_based().evaluate(&context).unwrap().is_ok());
    }

    #[test]
    fn test_file_based_wrong_published_hash_fails_pub01() {
        let signature = signature();
        let file = publications_file(vec![PublicationData::new(
            PUBLICATION_TIME,
            other_hash(b"forged newspaper"),
        )]);
        let extender = extender();
        let context = VerificationContext::builder()
            .signature(&signature)
            .trust_store(&file)
            .extender(&extender)
            .extending_allowed(true)
            .build()
            .unwrap();

        let result = Policy::publications_file_based().evaluate(&context).unwrap();
        assert_eq!(result.error, Some(VerificationErrorCode::Pub01));
    }

    #[test]
    fn test_extended_signature_found_in_file() {
        let extended = signature().extend(calendar_chain(), None).unwrap();
        let file = publications_file(vec![publication()]);
        let context = VerificationContext::builder()
            .signature(&extended)
            .trust_store(&file)
            .build()
            .unwrap();

        assert!(Policy::publications_file_based().evaluate(&context).unwrap().is_ok());
    }

    // =============================================================================
    // CALENDAR AND USER PUBLICATION
    // =============================================================================

    #[test]
    fn test_calendar_based() {
        let signature = signature();
        let extender = extender();
        let context = VerificationContext::builder()
            .signature(&signature)
            .document_hash(document_hash())
            .extender(&extender)
            .build()
            .unwrap();

        let result = Policy::calendar_based().evaluate(&context).unwrap();
        assert!(result.is_ok(), "{}", result);
        assert_eq!(extender.request_count(), 1);
    }

    #[test]
    fn test_calendar_based_unreachable_extender_is_error() {
        let signature = signature();
        let extender = MockExtender::default();
        let context = VerificationContext::builder()
            .signature(&signature)
            .extender(&extender)
            .build()
            .unwrap();

        assert!(Policy::calendar_based().evaluate(&context).is_err());
    }

    #[test]
    fn test_user_publication_via_extender() {
        let signature = signature();
        let extender = extender();
        let context = VerificationContext::builder()
            .signature(&signature)
            .user_publication(publication())
            .extender(&extender)
            .extending_allowed(true)
            .build()
            .unwrap();

        let result = Policy::user_publication_based().evaluate(&context).unwrap();
        assert!(result.is_ok(), "{}", result);
    }

    #[test]
    fn test_user_publication_matches_extended_signature() {
        let extended = signature().extend(calendar_chain(), None).unwrap();
        let context = VerificationContext::builder()
            .signature(&extended)
            .user_publication(publication())
            .build()
            .unwrap();

        assert!(Policy::user_publication_based().evaluate(&context).unwrap().is_ok());
    }

    #[test]
    fn test_user_publication_before_aggregation_is_na() {
        let signature = signature();
        let extender = extender();
        let context = VerificationContext::builder()
            .signature(&signature)
            .user_publication(PublicationData::new(AGGREGATION_TIME - 3_600, other_hash(b"old")))
            .extender(&extender)
            .extending_allowed(true)
            .build()
            .unwrap();

        let result = Policy::user_publication_based().evaluate(&context).unwrap();
        assert_eq!(result.outcome, VerificationOutcome::Na);
        assert_eq!(extender.request_count(), 0);
    }
}
