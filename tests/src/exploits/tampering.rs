//! # Tampered Signatures and Responses
//!
//! Every scenario starts from the captured signature or a correctly
//! authenticated gateway response and changes one field.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use ksi_service::{KsiService, MockTransport, PduVersion, ServiceConfig, ServiceError};
    use ksi_signature::{
        AggregationHashChain, AggregationLink, CalendarAuthenticationRecord, CalendarHashChain,
        LinkDirection, PublicationData, PublicationRecord, SiblingData, Signature,
    };
    use ksi_verification::{
        Policy, VerificationContext, VerificationErrorCode, VerificationOutcome, VerificationResult,
        MockExtender,
    };

    use crate::fixtures::*;

    fn internal(signature: &Signature) -> VerificationResult {
        let context = VerificationContext::builder()
            .signature(signature)
            .document_hash(document_hash())
            .build()
            .unwrap();
        Policy::internal().evaluate(&context).unwrap()
    }

    fn assert_fails(result: &VerificationResult, code: VerificationErrorCode) {
        assert_eq!(result.outcome, VerificationOutcome::Fail, "{}", result);
        assert_eq!(result.error, Some(code));
    }

    /// Signature with `chains`, keeping the captured calendar parts.
    fn with_chains(chains: Vec<AggregationHashChain>) -> Signature {
        let original = signature();
        Signature::from_parts(
            chains,
            original.calendar_chain().cloned(),
            original.calendar_authentication_record().cloned(),
            None,
            None,
            None,
        )
        .unwrap()
    }

    fn replace_sibling(chain: &AggregationHashChain, position: usize) -> AggregationHashChain {
        let mut links = chain.links().to_vec();
        let link = &links[position];
        links[position] = AggregationLink::new(
            link.direction(),
            link.level_correction(),
            SiblingData::Hash(other_hash(b"substituted sibling")),
        );
        AggregationHashChain::new(
            chain.aggregation_time(),
            chain.chain_index().to_vec(),
            chain.input_hash().clone(),
            chain.algorithm(),
            links,
        )
        .unwrap()
    }

    // =============================================================================
    // AGGREGATION
    // =============================================================================

    #[test]
    fn test_substituted_sibling_in_middle_chain() {
        init_tracing();
        let mut chains = signature().aggregation_chains().to_vec();
        chains[1] = replace_sibling(&chains[1], 2);

        assert_fails(&internal(&with_chains(chains)), VerificationErrorCode::Int01);
    }

    #[test]
    fn test_substituted_sibling_in_top_chain() {
        let mut chains = signature().aggregation_chains().to_vec();
        chains[2] = replace_sibling(&chains[2], 0);

        // The chains still connect; only the calendar input gives it away.
        assert_fails(&internal(&with_chains(chains)), VerificationErrorCode::Int03);
    }

    #[test]
    fn test_dropped_middle_chain() {
        let mut chains = signature().aggregation_chains().to_vec();
        chains.remove(1);

        assert_fails(&internal(&with_chains(chains)), VerificationErrorCode::Int01);
    }

    #[test]
    fn test_foreign_lowest_chain_cannot_be_spliced() {
        let signature = signature();
        let foreign = replace_sibling(&signature.aggregation_chains()[0], 0);
        assert!(signature.with_lowest_chain(foreign).is_err());
    }

    // =============================================================================
    // CALENDAR
    // =============================================================================

    #[test]
    fn test_authentication_record_for_other_root() {
        let original = signature();
        let record = original.calendar_authentication_record().unwrap();
        let forged = CalendarAuthenticationRecord::new(
            PublicationData::new(PUBLICATION_TIME, other_hash(b"other calendar root")),
            record.signature_data().clone(),
        );
        let tampered = Signature::from_parts(
            original.aggregation_chains().to_vec(),
            original.calendar_chain().cloned(),
            Some(forged),
            None,
            None,
            None,
        )
        .unwrap();

        assert_fails(&internal(&tampered), VerificationErrorCode::Int08);
    }

    #[test]
    fn test_authentication_record_for_other_time() {
        let original = signature();
        let record = original.calendar_authentication_record().unwrap();
        let forged = CalendarAuthenticationRecord::new(
            PublicationData::new(PUBLICATION_TIME + 1, imprint(CALENDAR_OUTPUT_HEX)),
            record.signature_data().clone(),
        );
        let tampered = Signature::from_parts(
            original.aggregation_chains().to_vec(),
            original.calendar_chain().cloned(),
            Some(forged),
            None,
            None,
            None,
        )
        .unwrap();

        assert_fails(&internal(&tampered), VerificationErrorCode::Int06);
    }

    #[test]
    fn test_publication_record_with_other_hash() {
        let forged = PublicationRecord::new(
            0x803,
            PublicationData::new(PUBLICATION_TIME, other_hash(b"other publication")),
            vec![],
            vec![],
        );
        let tampered = signature().extend(calendar_chain(), Some(forged)).unwrap();

        assert_fails(&internal(&tampered), VerificationErrorCode::Int09);
    }

    #[test]
    fn test_extender_rewrites_right_link() {
        let signature = signature();
        let calendar = calendar_chain();
        let mut links = calendar.links().to_vec();
        let position = links
            .iter()
            .position(|l| l.direction == LinkDirection::Right)
            .unwrap();
        links[position].sibling = other_hash(b"rewritten history");
        let rewritten = CalendarHashChain::new(
            calendar.publication_time(),
            Some(calendar.aggregation_time()),
            calendar.input_hash().clone(),
            links,
        )
        .unwrap();

        let extender = MockExtender::with_response(Some(PUBLICATION_TIME), rewritten);
        let context = VerificationContext::builder()
            .signature(&signature)
            .extender(&extender)
            .build()
            .unwrap();

        let result = Policy::calendar_based().evaluate(&context).unwrap();
        assert_fails(&result, VerificationErrorCode::Cal04);
    }

    // =============================================================================
    // GATEWAY RESPONSES
    // =============================================================================

    #[test]
    fn test_flipped_mac_bit() {
        let config = ServiceConfig::for_testing();
        let mut response = aggregation_response_pdu(&config, 1);
        let last = response.len() - 1;
        response[last] ^= 0x01;

        let transport = MockTransport::default();
        transport.push_aggregation_response(response);
        let service = KsiService::new(config, transport).with_request_ids(|| 1);

        assert!(matches!(service.sign(&document_hash()), Err(ServiceError::MacMismatch)));
    }

    #[test]
    fn test_response_authenticated_with_other_key() {
        let config = ServiceConfig {
            pdu_version: PduVersion::V1,
            ..ServiceConfig::for_testing()
        };
        let impostor = ServiceConfig {
            login_key: b"guessed-key".to_vec(),
            ..config.clone()
        };

        let transport = Arc::new(MockTransport::default());
        transport.push_aggregation_response(aggregation_response_pdu(&impostor, 1));
        let service = KsiService::new(config, Arc::clone(&transport)).with_request_ids(|| 1);

        assert!(matches!(service.sign(&document_hash()), Err(ServiceError::MacMismatch)));
        assert_eq!(transport.aggregation_requests.lock().len(), 1);
    }

    #[test]
    fn test_signature_for_other_document() {
        let config = ServiceConfig::for_testing();
        let transport = MockTransport::default();
        transport.push_aggregation_response(aggregation_response_pdu(&config, 1));
        let service = KsiService::new(config, transport).with_request_ids(|| 1);

        assert!(matches!(
            service.sign(&other_hash(b"what the client asked for")),
            Err(ServiceError::InvalidPdu(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// A single flipped bit either breaks the response or leaves the
        /// signed content untouched (outer PDU flags are not authenticated).
        #[test]
        fn test_any_flipped_bit_is_caught(position in any::<prop::sample::Index>(), bit in 0u8..8) {
            let config = ServiceConfig::for_testing();
            let mut response = aggregation_response_pdu(&config, 1);
            let offset = position.index(response.len());
            response[offset] ^= 1 << bit;

            let transport = MockTransport::default();
            transport.push_aggregation_response(response);
            let service = KsiService::new(config, transport).with_request_ids(|| 1);

            if let Ok(signed) = service.sign(&document_hash()) {
                prop_assert_eq!(signed, signature());
            }
        }
    }
}
