//! Outcome of a verification run: one [CheckResult] per [CheckKind].
use std::collections::BTreeMap;
use std::fmt;

use der::EncodePem;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use x509_cert::Certificate;

/// The security checks performed on a travel document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumString,
)]
pub enum CheckKind {
    /// Basic Access Control was used to read the document.
    #[strum(serialize = "BAC")]
    Bac,
    /// Active Authentication of the chip.
    #[strum(serialize = "AA")]
    Aa,
    /// Extended Access Control to the sensitive data groups.
    #[strum(serialize = "EAC")]
    Eac,
    /// The data group hashes stored in EF.SOD match the data groups.
    #[strum(serialize = "HT")]
    Ht,
    /// The document signer signature over EF.SOD.
    #[strum(serialize = "DS")]
    Ds,
    /// The country signing CA signed the document signer certificate.
    #[strum(serialize = "CS")]
    Cs,
}

impl CheckKind {
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// The check has not been run.
    #[default]
    Unknown,
    /// The check was not (or could not be) performed.
    NotChecked,
    /// The document does not claim the feature the check is about.
    NotPresent,
    Succeeded,
    Failed,
}

/// Verdict of a single check, with a human readable reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CheckResult {
    pub fn new(verdict: Verdict, reason: Option<String>) -> Self {
        Self { verdict, reason }
    }

    pub fn succeeded() -> Self {
        Self::new(Verdict::Succeeded, None)
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::new(Verdict::Failed, Some(reason.into()))
    }

    pub fn not_checked(reason: impl Into<String>) -> Self {
        Self::new(Verdict::NotChecked, Some(reason.into()))
    }

    pub fn not_present(reason: impl Into<String>) -> Self {
        Self::new(Verdict::NotPresent, Some(reason.into()))
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{} ({reason})", self.verdict),
            None => write!(f, "{}", self.verdict),
        }
    }
}

/// Stored and computed digest of one data group.
///
/// `computed` is absent for a data group that could not be read, e.g. one protected by EAC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashMatchResult {
    #[serde(serialize_with = "hex_string")]
    pub stored: Vec<u8>,
    #[serde(serialize_with = "optional_hex_string")]
    pub computed: Option<Vec<u8>>,
}

impl HashMatchResult {
    pub fn new(stored: Vec<u8>, computed: Vec<u8>) -> Self {
        Self {
            stored,
            computed: Some(computed),
        }
    }

    pub fn unread(stored: Vec<u8>) -> Self {
        Self {
            stored,
            computed: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.computed.as_ref() == Some(&self.stored)
    }
}

fn hex_string<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

fn optional_hex_string<S: Serializer>(
    bytes: &Option<Vec<u8>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match bytes {
        Some(bytes) => hex_string(bytes, serializer),
        None => serializer.serialize_none(),
    }
}

/// PEM encoded certificates, in chain order.
struct PemChain<'a>(&'a [Certificate]);

impl Serialize for PemChain<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for certificate in self.0 {
            let pem = certificate
                .to_pem(Default::default())
                .map_err(S::Error::custom)?;
            seq.serialize_element(&pem)?;
        }
        seq.end()
    }
}

/// Immutable snapshot of all six checks.
///
/// A status is never updated in place: [VerificationStatus::with] returns a new value, so an
/// observer holding a snapshot never sees a partially updated status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationStatus {
    results: [CheckResult; 6],
    hash_results: BTreeMap<u8, HashMatchResult>,
    certificate_chain: Vec<Certificate>,
}

impl VerificationStatus {
    pub fn with(&self, kind: CheckKind, verdict: Verdict, reason: Option<String>) -> Self {
        self.with_result(kind, CheckResult::new(verdict, reason))
    }

    pub fn with_result(&self, kind: CheckKind, result: CheckResult) -> Self {
        let mut next = self.clone();
        next.results[kind.index()] = result;
        next
    }

    /// Replace the per data group hash comparisons recorded by the hash table check.
    pub fn with_hash_results(&self, hash_results: BTreeMap<u8, HashMatchResult>) -> Self {
        let mut next = self.clone();
        next.hash_results = hash_results;
        next
    }

    /// Replace the certificate chain validated by the country signer check, document signer
    /// first and CSCA last.
    pub fn with_certificate_chain(&self, certificate_chain: Vec<Certificate>) -> Self {
        let mut next = self.clone();
        next.certificate_chain = certificate_chain;
        next
    }

    pub fn get(&self, kind: CheckKind) -> &CheckResult {
        &self.results[kind.index()]
    }

    pub fn verdict(&self, kind: CheckKind) -> Verdict {
        self.get(kind).verdict
    }

    pub fn reason(&self, kind: CheckKind) -> Option<&str> {
        self.get(kind).reason.as_deref()
    }

    /// All checks, in [CheckKind] order.
    pub fn iter(&self) -> impl Iterator<Item = (CheckKind, &CheckResult)> + '_ {
        CheckKind::iter().map(move |kind| (kind, self.get(kind)))
    }

    pub fn hash_results(&self) -> &BTreeMap<u8, HashMatchResult> {
        &self.hash_results
    }

    /// Empty unless the country signer check succeeded.
    pub fn certificate_chain(&self) -> &[Certificate] {
        &self.certificate_chain
    }
}

impl Serialize for VerificationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(8))?;
        for (kind, result) in self.iter() {
            map.serialize_entry(&kind.to_string(), result)?;
        }
        map.serialize_entry("hashes", &self.hash_results)?;
        map.serialize_entry("certificateChain", &PemChain(&self.certificate_chain))?;
        map.end()
    }
}
