//! Country Signing CA lookup.
//!
//! A [TrustStore] answers which CSCA certificates a state has published. A store that cannot be
//! reached at all reports [Error::Unavailable]; a reachable store that knows nothing about the
//! state returns no candidates.
use x509_cert::Certificate;

mod directory;
mod registry;

pub use directory::CscaDirectory;
pub use registry::CscaRegistry;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("could not open CSCA store {location}: {message}")]
    Unavailable { location: String, message: String },
    #[error("could not decode CSCA certificate {location}: {message}")]
    Decode { location: String, message: String },
}

pub trait TrustStore {
    /// Candidate CSCA certificates for the issuing state `state`.
    fn certificates_for(&self, state: &str) -> Result<Vec<Certificate>, Error>;
}

impl<T: TrustStore + ?Sized> TrustStore for Box<T> {
    fn certificates_for(&self, state: &str) -> Result<Vec<Certificate>, Error> {
        (**self).certificates_for(state)
    }
}

impl<T: TrustStore + ?Sized> TrustStore for &T {
    fn certificates_for(&self, state: &str) -> Result<Vec<Certificate>, Error> {
        (**self).certificates_for(state)
    }
}

/// Canonical form of an MRZ state code: `d<<` and `D` both are `D`.
pub fn normalize_state(state: &str) -> String {
    state
        .chars()
        .filter(|c| *c != '<' && !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Stores consulted in order. Candidates of every store that could be reached are returned.
#[derive(Default)]
pub struct TrustStores {
    stores: Vec<Box<dyn TrustStore + Send + Sync>>,
}

impl TrustStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, store: impl TrustStore + Send + Sync + 'static) -> Self {
        self.push(store);
        self
    }

    pub fn push(&mut self, store: impl TrustStore + Send + Sync + 'static) {
        self.stores.push(Box::new(store));
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl TrustStore for TrustStores {
    fn certificates_for(&self, state: &str) -> Result<Vec<Certificate>, Error> {
        let mut candidates = Vec::new();
        let mut first_error = None;
        let mut reached = self.stores.is_empty();

        for store in &self.stores {
            match store.certificates_for(state) {
                Ok(certificates) => {
                    reached = true;
                    candidates.extend(certificates);
                }
                Err(e) => {
                    tracing::warn!("skipping CSCA store: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if !reached => Err(e),
            _ => Ok(candidates),
        }
    }
}
