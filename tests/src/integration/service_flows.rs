//! # Service Flows
//!
//! `KsiService` over a scripted transport: signing, extension and the
//! service acting as the extender of a verification policy.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ksi_service::{
        KsiService, MockTransport, Pdu, PduKind, PduVersion, ServiceConfig, ServiceError,
    };
    use ksi_verification::{Policy, SignatureFactory, VerificationContext};

    use crate::fixtures::*;

    const REQUEST_ID: u64 = 7;

    fn config(version: PduVersion) -> ServiceConfig {
        ServiceConfig {
            pdu_version: version,
            ..ServiceConfig::for_testing()
        }
    }

    fn service(config: ServiceConfig, transport: Arc<MockTransport>) -> KsiService {
        KsiService::new(config, transport).with_request_ids(|| REQUEST_ID)
    }

    #[test]
    fn test_sign_end_to_end_both_versions() {
        init_tracing();
        for version in [PduVersion::V1, PduVersion::V2] {
            let config = config(version);
            let transport = Arc::new(MockTransport::default());
            transport.push_aggregation_response(aggregation_response_pdu(&config, REQUEST_ID));

            let signature = service(config.clone(), Arc::clone(&transport))
                .sign(&document_hash())
                .unwrap();
            assert_eq!(signature, crate::fixtures::signature());

            let requests = transport.aggregation_requests.lock();
            assert_eq!(requests.len(), 1);
            let request = Pdu::from_bytes(&requests[0], PduKind::Aggregation, version).unwrap();
            let payload = request.aggregation_request().unwrap();
            assert_eq!(payload.request_id(), REQUEST_ID);
            assert_eq!(payload.request_hash(), &document_hash());
            assert!(request.verify_mac(&config.login_key).unwrap());
        }
    }

    #[test]
    fn test_signed_signature_verifies_with_file() {
        let config = config(PduVersion::V2);
        let transport = Arc::new(MockTransport::default());
        transport.push_aggregation_response(aggregation_response_pdu(&config, REQUEST_ID));
        transport.push_extension_response(extend_response_pdu(&config, REQUEST_ID, &calendar_chain()));
        let service = service(config, Arc::clone(&transport));

        let signature = service.sign(&document_hash()).unwrap();
        let file = publications_file(vec![publication()]);
        let context = VerificationContext::builder()
            .signature(&signature)
            .document_hash(document_hash())
            .trust_store(&file)
            .extender(&service)
            .extending_allowed(true)
            .build()
            .unwrap();

        let result = Policy::publications_file_based().evaluate(&context).unwrap();
        assert!(result.is_ok(), "{}", result);
        assert_eq!(transport.extension_requests.lock().len(), 1);
    }

    #[test]
    fn test_extend_then_attach_publication() {
        let config = config(PduVersion::V1);
        let transport = Arc::new(MockTransport::default());
        transport.push_extension_response(extend_response_pdu(&config, REQUEST_ID, &calendar_chain()));
        let service = service(config, Arc::clone(&transport));

        let chain = service.extend(AGGREGATION_TIME, Some(PUBLICATION_TIME)).unwrap();
        assert_eq!(chain.registration_time(), AGGREGATION_TIME);

        let extended = signature().extend(chain, None).unwrap();
        let context = VerificationContext::builder()
            .signature(&extended)
            .user_publication(publication())
            .build()
            .unwrap();
        assert!(Policy::user_publication_based().evaluate(&context).unwrap().is_ok());

        let requests = transport.extension_requests.lock();
        let request = Pdu::from_bytes(&requests[0], PduKind::Extension, PduVersion::V1).unwrap();
        let payload = request.extend_request().unwrap();
        assert_eq!(payload.aggregation_time(), AGGREGATION_TIME);
        assert_eq!(payload.publication_time(), Some(PUBLICATION_TIME));
    }

    #[test]
    fn test_key_based_factory_in_service() {
        let config = config(PduVersion::V2);
        let transport = Arc::new(MockTransport::default());
        transport.push_aggregation_response(aggregation_response_pdu(&config, REQUEST_ID));
        let factory = SignatureFactory::with_verifier(Policy::internal());
        let service = service(config, transport).with_factory(factory);

        assert!(service.sign(&document_hash()).is_ok());
    }

    #[test]
    fn test_response_for_another_request_rejected() {
        let config = config(PduVersion::V2);
        let transport = Arc::new(MockTransport::default());
        transport.push_aggregation_response(aggregation_response_pdu(&config, RESPONSE_REQUEST_ID));

        let result = service(config, transport).sign(&document_hash());
        assert!(matches!(
            result,
            Err(ServiceError::RequestIdMismatch { expected: REQUEST_ID, actual: RESPONSE_REQUEST_ID })
        ));
    }

    #[test]
    fn test_publications_file_download() {
        let transport = MockTransport::default().with_publications_file(publications_file_bytes(
            vec![publication()],
            vec![],
        ));
        let service = KsiService::new(ServiceConfig::for_testing(), transport);

        let file = service.get_publications_file().unwrap();
        assert_eq!(file.publications().len(), 1);
        assert_eq!(file.latest_publication().unwrap().publication_data(), &publication());
    }
}
