use std::collections::BTreeMap;

use x509_cert::Certificate;

use super::{normalize_state, Error, TrustStore};
use crate::x509::country_name;

/// In-memory CSCA certificates keyed by issuing state.
#[derive(Debug, Clone, Default)]
pub struct CscaRegistry {
    certificates: BTreeMap<String, Vec<Certificate>>,
}

impl CscaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, state: &str, certificate: Certificate) {
        self.certificates
            .entry(normalize_state(state))
            .or_default()
            .push(certificate);
    }

    pub fn with_certificate(mut self, state: &str, certificate: Certificate) -> Self {
        self.insert(state, certificate);
        self
    }

    /// Register a certificate under the countryName of its subject. Returns false, without
    /// registering, if the subject carries no countryName.
    pub fn insert_by_country_name(&mut self, certificate: Certificate) -> bool {
        let Some(state) = country_name(&certificate).map(normalize_state) else {
            return false;
        };
        self.insert(&state, certificate);
        true
    }

    pub fn len(&self) -> usize {
        self.certificates.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

impl TrustStore for CscaRegistry {
    fn certificates_for(&self, state: &str) -> Result<Vec<Certificate>, Error> {
        Ok(self
            .certificates
            .get(&normalize_state(state))
            .cloned()
            .unwrap_or_default())
    }
}
