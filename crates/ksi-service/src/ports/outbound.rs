//! # Outbound Ports (Driven Ports / SPI)
//!
//! The byte transport to the aggregator, the extender and the
//! publications file location. Implementations own connection handling,
//! timeouts and retries; the service only sees request and response bytes.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::errors::{Result, ServiceError};

/// Synchronous transport to the KSI gateways.
pub trait KsiTransport: Send + Sync {
    /// Deliver an aggregation request PDU and return the response bytes.
    fn send_aggregation(&self, request: &[u8]) -> Result<Vec<u8>>;

    /// Deliver an extend request PDU and return the response bytes.
    fn send_extension(&self, request: &[u8]) -> Result<Vec<u8>>;

    /// Fetch the raw publications file.
    fn get_publications_file(&self) -> Result<Vec<u8>>;
}

impl<T: KsiTransport + ?Sized> KsiTransport for Arc<T> {
    fn send_aggregation(&self, request: &[u8]) -> Result<Vec<u8>> {
        (**self).send_aggregation(request)
    }

    fn send_extension(&self, request: &[u8]) -> Result<Vec<u8>> {
        (**self).send_extension(request)
    }

    fn get_publications_file(&self) -> Result<Vec<u8>> {
        (**self).get_publications_file()
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Transport answering from queued responses and recording requests.
#[derive(Default)]
pub struct MockTransport {
    /// Responses returned by `send_aggregation`, front first.
    pub aggregation_responses: Mutex<VecDeque<Vec<u8>>>,
    /// Responses returned by `send_extension`, front first.
    pub extension_responses: Mutex<VecDeque<Vec<u8>>>,
    /// Publications file bytes.
    pub publications_file: Option<Vec<u8>>,
    /// Aggregation requests received.
    pub aggregation_requests: Mutex<Vec<Vec<u8>>>,
    /// Extend requests received.
    pub extension_requests: Mutex<Vec<Vec<u8>>>,
}

impl MockTransport {
    /// Queue an aggregation response.
    pub fn push_aggregation_response(&self, response: Vec<u8>) {
        self.aggregation_responses.lock().push_back(response);
    }

    /// Queue an extend response.
    pub fn push_extension_response(&self, response: Vec<u8>) {
        self.extension_responses.lock().push_back(response);
    }

    /// Serve `bytes` as the publications file.
    pub fn with_publications_file(mut self, bytes: Vec<u8>) -> Self {
        self.publications_file = Some(bytes);
        self
    }
}

impl KsiTransport for MockTransport {
    fn send_aggregation(&self, request: &[u8]) -> Result<Vec<u8>> {
        self.aggregation_requests.lock().push(request.to_vec());
        self.aggregation_responses
            .lock()
            .pop_front()
            .ok_or_else(|| ServiceError::Transport("no aggregation response queued".to_string()))
    }

    fn send_extension(&self, request: &[u8]) -> Result<Vec<u8>> {
        self.extension_requests.lock().push(request.to_vec());
        self.extension_responses
            .lock()
            .pop_front()
            .ok_or_else(|| ServiceError::Transport("no extend response queued".to_string()))
    }

    fn get_publications_file(&self) -> Result<Vec<u8>> {
        self.publications_file
            .clone()
            .ok_or_else(|| ServiceError::Transport("no publications file".to_string()))
    }
}
