//! Mock availability lookups.

#![allow(dead_code)]

use async_trait::async_trait;
use domainforge_error::{DomainforgeResult, ProviderError, ProviderErrorKind};
use domainforge_interface::AvailabilityLookup;
use parking_lot::Mutex;
use std::collections::HashSet;

/// Lookup answering from fixed sets, recording every call.
#[derive(Default)]
pub struct MockLookup {
    available: HashSet<String>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_available(mut self, domain: &str) -> Self {
        self.available.insert(domain.to_string());
        self
    }

    pub fn with_failing(mut self, domain: &str) -> Self {
        self.failing.insert(domain.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl AvailabilityLookup for MockLookup {
    async fn is_available(&self, domain: &str) -> DomainforgeResult<bool> {
        self.calls.lock().push(domain.to_string());
        if self.failing.contains(domain) {
            Err(ProviderError::new(
                "mock",
                ProviderErrorKind::Http("connection reset".to_string()),
            ))?
        }
        Ok(self.available.contains(domain))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
