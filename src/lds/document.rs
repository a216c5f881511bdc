use std::collections::BTreeMap;

use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::Certificate;

use crate::bac::BacKeySpec;

use super::FileId;

/// Failures of the decoded-document accessors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("EF.{0} not present")]
    FileNotPresent(FileId),
    #[error("could not decode EF.{file}: {message}")]
    Decode { file: FileId, message: String },
}

/// Decoded accessors of a travel document, as provided by the LDS codec.
///
/// Implementations hold files that were read from a chip or loaded from a saved document. The
/// verification engine only ever reads through this trait.
pub trait Document {
    fn has_file(&self, id: FileId) -> bool;

    /// Raw encoded bytes of a file, exactly as they are hashed in EF.SOD.
    fn bytes(&self, id: FileId) -> Result<Vec<u8>, Error>;

    /// Tag list of EF.COM.
    fn tag_list(&self) -> Result<Vec<u32>, Error>;

    /// Name of the digest algorithm in EF.SOD, e.g. `SHA-256`.
    fn hash_algorithm(&self) -> Result<String, Error>;

    /// The data group hashes stored in EF.SOD, keyed by data group number.
    fn stored_hashes(&self) -> Result<BTreeMap<u8, Vec<u8>>, Error>;

    /// The document signer certificate embedded in EF.SOD.
    fn signing_certificate(&self) -> Result<Certificate, Error>;

    /// Check the signature over the EF.SOD content using the given certificate's key.
    fn verify_sod_signature(&self, certificate: &Certificate) -> Result<bool, Error>;

    /// Issuing state from the MRZ in DG1, if DG1 could be read.
    fn issuing_state(&self) -> Option<String>;

    /// Whether the document declares EAC (chip authentication info in DG14).
    fn declares_eac(&self) -> bool;

    /// Whether EAC was performed while reading the document.
    fn eac_was_performed(&self) -> bool;

    /// The active authentication public key from DG15.
    fn aa_public_key(&self) -> Result<SubjectPublicKeyInfoOwned, Error>;
}

/// The challenge could not be sent to, or answered by, the chip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("AA failed ({0})")]
pub struct TransportError(pub String);

/// Live challenge-response with the chip's active authentication key.
pub trait ActiveAuthenticator {
    /// Returns whether the chip's response verifies under `public_key`.
    fn challenge(&self, public_key: &SubjectPublicKeyInfoOwned) -> Result<bool, TransportError>;
}

impl<F> ActiveAuthenticator for F
where
    F: Fn(&SubjectPublicKeyInfoOwned) -> Result<bool, TransportError>,
{
    fn challenge(&self, public_key: &SubjectPublicKeyInfoOwned) -> Result<bool, TransportError> {
        self(public_key)
    }
}

/// The reading session a document was obtained in.
pub trait Session {
    /// The BAC key that opened the session, if access control was used.
    fn bac_key(&self) -> Option<&BacKeySpec>;

    /// The live chip, if the session is still connected.
    fn active_authenticator(&self) -> Option<&dyn ActiveAuthenticator>;
}

/// A session replayed from a saved document: no chip to talk to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySession {
    pub bac_key: Option<BacKeySpec>,
}

impl Session for ReplaySession {
    fn bac_key(&self) -> Option<&BacKeySpec> {
        self.bac_key.as_ref()
    }

    fn active_authenticator(&self) -> Option<&dyn ActiveAuthenticator> {
        None
    }
}

/// A session with a connected chip.
pub struct LiveSession<A> {
    pub bac_key: Option<BacKeySpec>,
    pub authenticator: A,
}

impl<A: ActiveAuthenticator> Session for LiveSession<A> {
    fn bac_key(&self) -> Option<&BacKeySpec> {
        self.bac_key.as_ref()
    }

    fn active_authenticator(&self) -> Option<&dyn ActiveAuthenticator> {
        Some(&self.authenticator)
    }
}
