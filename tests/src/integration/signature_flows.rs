//! # Signature Flows
//!
//! The captured signature parses, folds to the calendar input, re-encodes
//! byte for byte, and extends to its publication.

#[cfg(test)]
mod tests {
    use ksi_signature::{PublicationRecord, Signature, SignatureError};
    use ksi_verification::{
        Policy, SignatureFactory, VerificationContext, VerificationErrorCode, VerificationOutcome,
    };

    use crate::fixtures::*;

    // =============================================================================
    // STRUCTURE
    // =============================================================================

    #[test]
    fn test_chains_are_ordered_lowest_first() {
        let signature = signature();
        let indices: Vec<&[u64]> = signature
            .aggregation_chains()
            .iter()
            .map(|c| c.chain_index())
            .collect();
        assert_eq!(
            indices,
            vec![&[11, 469_688_175, 9][..], &[11, 469_688_175][..], &[11][..]]
        );
    }

    #[test]
    fn test_chain_shapes_match_their_index() {
        for chain in signature().aggregation_chains() {
            assert_eq!(chain.shape(), chain.chain_index().last().copied());
        }
    }

    #[test]
    fn test_aggregation_root_is_calendar_input() {
        init_tracing();
        let signature = signature();
        let root = signature.aggregation_root().unwrap();

        assert_eq!(root.hash, imprint(AGGREGATION_ROOT_HEX));
        assert_eq!(signature.calendar_chain().unwrap().input_hash(), &root.hash);
    }

    #[test]
    fn test_calendar_chain_registers_aggregation_time() {
        let calendar = calendar_chain();
        assert_eq!(calendar.output_hash(), &imprint(CALENDAR_OUTPUT_HEX));
        assert_eq!(calendar.registration_time(), AGGREGATION_TIME);
        assert_eq!(calendar.aggregation_time(), AGGREGATION_TIME);
    }

    #[test]
    fn test_authentication_record_signs_calendar_output() {
        let signature = signature();
        let record = signature.calendar_authentication_record().unwrap();
        assert_eq!(record.publication_data(), &publication());
        assert_eq!(record.signature_data().signature_type(), "1.2.840.113549.1.1.11");
        assert!(!signature.is_extended());
    }

    #[test]
    fn test_identity_outermost_first() {
        assert_eq!(signature().identity(), vec!["GT", "GT", "release test", "anon"]);
    }

    // =============================================================================
    // ENCODING
    // =============================================================================

    #[test]
    fn test_reencoding_is_byte_exact() {
        let signature = signature();
        let expected: Vec<Vec<u8>> = response_children()
            .iter()
            .filter(|t| t.tag_type() >= 0x800)
            .map(|t| t.encode().unwrap())
            .collect();
        let actual: Vec<Vec<u8>> = signature
            .tag()
            .children()
            .unwrap()
            .iter()
            .map(|t| t.encode().unwrap())
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_parse_of_encoding_is_identical() {
        let signature = signature();
        let bytes = signature.encode().unwrap();
        let parsed = Signature::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, signature);
        assert_eq!(parsed.encode().unwrap(), bytes);
    }

    #[test]
    fn test_reader_rejects_trailing_bytes() {
        let mut bytes = signature().encode().unwrap();
        bytes.extend_from_slice(&[0x01, 0x00]);
        assert!(Signature::from_reader(bytes.as_slice()).is_err());
    }

    // =============================================================================
    // VERIFICATION AND EXTENSION
    // =============================================================================

    #[test]
    fn test_internal_policy_passes() {
        let signature = signature();
        let context = VerificationContext::builder()
            .signature(&signature)
            .document_hash(document_hash())
            .build()
            .unwrap();
        let result = Policy::internal().evaluate(&context).unwrap();

        assert!(result.is_ok(), "{}", result);
        assert!(result.child_results.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn test_wrong_document_fails_gen01() {
        let signature = signature();
        let context = VerificationContext::builder()
            .signature(&signature)
            .document_hash(other_hash(b"another document"))
            .build()
            .unwrap();
        let result = Policy::internal().evaluate(&context).unwrap();

        assert_eq!(result.outcome, VerificationOutcome::Fail);
        assert_eq!(result.error, Some(VerificationErrorCode::Gen01));
    }

    #[test]
    fn test_factory_accepts_response_children() {
        let signature = SignatureFactory::new()
            .from_aggregation_response(&response_children())
            .unwrap();
        assert_eq!(signature, crate::fixtures::signature());
    }

    #[test]
    fn test_extend_to_own_publication() {
        let signature = signature();
        let extended = signature.extend(calendar_chain(), None).unwrap();

        assert!(extended.is_extended());
        assert!(extended.calendar_authentication_record().is_none());
        assert_eq!(
            extended.publication_record().unwrap().publication_data(),
            &publication()
        );
        assert_eq!(extended.aggregation_chains(), signature.aggregation_chains());

        let context = VerificationContext::for_signature(&extended);
        assert!(Policy::internal().evaluate(&context).unwrap().is_ok());
    }

    #[test]
    fn test_extend_with_file_record_keeps_references() {
        let record = PublicationRecord::new(
            0x703,
            publication(),
            vec!["ref".to_string()],
            vec!["https://example.org/pub".to_string()],
        );
        let extended = signature().extend(calendar_chain(), Some(record)).unwrap();
        let attached = extended.publication_record().unwrap();

        assert_eq!(attached.tag().tag_type(), 0x803);
        assert_eq!(attached.references(), &["ref".to_string()]);
    }

    #[test]
    fn test_splice_requires_matching_output() {
        let signature = signature();
        let lowest = signature.aggregation_chains()[2].clone();
        assert!(matches!(
            signature.with_lowest_chain(lowest),
            Err(SignatureError::ChainOutputMismatch { .. })
        ));
    }
}
