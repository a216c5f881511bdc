use crate::lds;
use crate::trust;
use crate::x509;

/// Why a check failed. The display text is the reason recorded in the status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    NotPresent(String),
    #[error("sanity check failed")]
    StructuralMismatch,
    #[error("Authentication of DG{0} failed")]
    IntegrityFailure(u8),
    #[error("{0}")]
    SignatureFailure(String),
    #[error("CSCA for {0} not found")]
    TrustNotFound(String),
    #[error("Could not open CSCA certificate")]
    TrustStoreUnavailable,
    #[error("{0}")]
    DecodeFailure(String),
    #[error("{0}")]
    TransportFailure(String),
}

impl From<lds::Error> for Error {
    fn from(e: lds::Error) -> Self {
        match e {
            lds::Error::FileNotPresent(_) => Error::NotPresent(e.to_string()),
            lds::Error::Decode { .. } => Error::DecodeFailure(e.to_string()),
        }
    }
}

impl From<lds::TransportError> for Error {
    fn from(e: lds::TransportError) -> Self {
        Error::TransportFailure(e.to_string())
    }
}

impl From<lds::UnsupportedDigestAlgorithm> for Error {
    fn from(e: lds::UnsupportedDigestAlgorithm) -> Self {
        Error::DecodeFailure(e.to_string())
    }
}

impl From<trust::Error> for Error {
    fn from(e: trust::Error) -> Self {
        match e {
            trust::Error::Unavailable { .. } => Error::TrustStoreUnavailable,
            trust::Error::Decode { .. } => Error::DecodeFailure(e.to_string()),
        }
    }
}

impl From<x509::Error> for Error {
    fn from(e: x509::Error) -> Self {
        match e {
            x509::Error::Mismatch => Error::SignatureFailure(e.to_string()),
            _ => Error::DecodeFailure(e.to_string()),
        }
    }
}
