//! A travel document saved after reading, with everything needed to verify it again offline.
//!
//! The bundle holds the already decoded LDS structures next to the raw file bytes, so replaying
//! a verification does not need a TLV codec:
//!
//! ```json
//! {
//!   "files": { "DG1": "615b5f1f58...", "DG15": "6f59..." },
//!   "tagList": [97, 111],
//!   "digestAlgorithm": "SHA-256",
//!   "dataGroupHashes": { "1": "c3ab8f...", "15": "0b1e..." },
//!   "documentSigner": "3082...",
//!   "signatureAlgorithm": "1.2.840.10045.4.3.2",
//!   "signedContent": "3181...",
//!   "signature": "3045...",
//!   "issuingState": "NLD"
//! }
//! ```
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use const_oid::ObjectIdentifier;
use der::{asn1::AnyRef, Decode, Encode, Tag, TagNumber, Tagged};
use serde::{Deserialize, Serialize};
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::Certificate;

use crate::bac::BacKeySpec;
use crate::lds::{self, Document, FileId, ReplaySession};
use crate::x509;

const DG15_TAG: Tag = Tag::Application {
    constructed: true,
    number: TagNumber::N15,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed document bundle: {0}")]
    Json(#[from] serde_json::Error),
}

/// Bytes written as a hex string.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexBytes(#[serde(with = "hex")] pub Vec<u8>);

impl std::fmt::Debug for HexBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for HexBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentBundle {
    /// Raw file contents, as read from the chip.
    pub files: BTreeMap<FileId, HexBytes>,
    /// The EF.COM tag list.
    pub tag_list: Vec<u32>,
    /// EF.SOD digest algorithm name.
    pub digest_algorithm: String,
    /// EF.SOD data group hashes.
    pub data_group_hashes: BTreeMap<u8, HexBytes>,
    /// DER encoded document signer certificate.
    pub document_signer: HexBytes,
    /// OID of the EF.SOD signature algorithm.
    pub signature_algorithm: String,
    /// The signed attributes the EF.SOD signature was made over.
    pub signed_content: HexBytes,
    pub signature: HexBytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuing_state: Option<String>,
    #[serde(default)]
    pub eac_declared: bool,
    #[serde(default)]
    pub eac_performed: bool,
    /// Key used to open the session the document was read in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bac_key: Option<BacKeySpec>,
}

impl DocumentBundle {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The session the document was read in. A saved document has no chip to challenge.
    pub fn replay_session(&self) -> ReplaySession {
        ReplaySession {
            bac_key: self.bac_key.clone(),
        }
    }

    fn decode_error(file: FileId, e: impl ToString) -> lds::Error {
        lds::Error::Decode {
            file,
            message: e.to_string(),
        }
    }
}

impl Document for DocumentBundle {
    fn has_file(&self, id: FileId) -> bool {
        self.files.contains_key(&id)
    }

    fn bytes(&self, id: FileId) -> Result<Vec<u8>, lds::Error> {
        self.files
            .get(&id)
            .map(|bytes| bytes.0.clone())
            .ok_or(lds::Error::FileNotPresent(id))
    }

    fn tag_list(&self) -> Result<Vec<u32>, lds::Error> {
        Ok(self.tag_list.clone())
    }

    fn hash_algorithm(&self) -> Result<String, lds::Error> {
        Ok(self.digest_algorithm.clone())
    }

    fn stored_hashes(&self) -> Result<BTreeMap<u8, Vec<u8>>, lds::Error> {
        Ok(self
            .data_group_hashes
            .iter()
            .map(|(number, hash)| (*number, hash.0.clone()))
            .collect())
    }

    fn signing_certificate(&self) -> Result<Certificate, lds::Error> {
        Certificate::from_der(&self.document_signer.0)
            .map_err(|e| Self::decode_error(FileId::Sod, format!("document signer: {e}")))
    }

    fn verify_sod_signature(&self, certificate: &Certificate) -> Result<bool, lds::Error> {
        let algorithm = ObjectIdentifier::new(&self.signature_algorithm)
            .map_err(|e| Self::decode_error(FileId::Sod, format!("signature algorithm: {e}")))?;

        match x509::verify_signature(
            &certificate.tbs_certificate.subject_public_key_info,
            &algorithm,
            &self.signed_content.0,
            &self.signature.0,
        ) {
            Ok(()) => Ok(true),
            Err(x509::Error::Mismatch) => Ok(false),
            Err(e) => Err(Self::decode_error(FileId::Sod, e)),
        }
    }

    fn issuing_state(&self) -> Option<String> {
        self.issuing_state.clone()
    }

    fn declares_eac(&self) -> bool {
        self.eac_declared
    }

    fn eac_was_performed(&self) -> bool {
        self.eac_performed
    }

    fn aa_public_key(&self) -> Result<SubjectPublicKeyInfoOwned, lds::Error> {
        let dg15 = FileId::DataGroup(15);
        decode_dg15(&self.bytes(dg15)?).map_err(|e| Self::decode_error(dg15, e))
    }
}

/// Decode the active authentication public key from EF.DG15.
pub fn decode_dg15(bytes: &[u8]) -> Result<SubjectPublicKeyInfoOwned, der::Error> {
    let outer = AnyRef::from_der(bytes)?;
    outer.tag().assert_eq(DG15_TAG)?;
    SubjectPublicKeyInfoOwned::from_der(outer.value())
}

/// Encode an active authentication public key as EF.DG15.
pub fn encode_dg15(public_key: &SubjectPublicKeyInfoOwned) -> Result<Vec<u8>, der::Error> {
    let spki = public_key.to_der()?;
    AnyRef::new(DG15_TAG, &spki)?.to_der()
}
