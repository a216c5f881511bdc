//! Passive authentication: the hash table in EF.SOD, the document signer signature over it and
//! the CSCA that issued the document signer certificate.
use std::collections::{BTreeMap, BTreeSet};

use x509_cert::Certificate;

use crate::lds::{data_group_number_for_tag, DigestAlgorithm, Document, FileId};
use crate::trust::{normalize_state, TrustStore};
use crate::verdict::HashMatchResult;
use crate::x509::{common_name_or_unknown, issuer_signed_subject};

use super::Error;

/// Compare every hash stored in EF.SOD with the digest of its data group, in data group order.
///
/// Comparisons made before a failure are kept in `hash_results`. A group skipped because of EAC
/// is recorded with its stored hash only.
pub(super) fn hash_table<D: Document + ?Sized>(
    document: &D,
    eac_protected_data_groups: &BTreeSet<u8>,
    hash_results: &mut BTreeMap<u8, HashMatchResult>,
) -> Result<(), Error> {
    let listed = document
        .tag_list()?
        .into_iter()
        .map(data_group_number_for_tag)
        .collect::<Result<BTreeSet<u8>, _>>()
        .map_err(|e| {
            tracing::warn!("EF.COM: {e}");
            Error::StructuralMismatch
        })?;
    let stored = document.stored_hashes()?;

    if !listed.iter().eq(stored.keys()) {
        tracing::warn!(?listed, hashed = ?stored.keys().collect::<Vec<_>>(), "EF.COM and EF.SOD disagree");
        return Err(Error::StructuralMismatch);
    }

    let algorithm: DigestAlgorithm = document.hash_algorithm()?.parse()?;
    let eac_performed = document.eac_was_performed();

    for (&number, stored_hash) in &stored {
        let id = FileId::data_group(number).map_err(|_| Error::StructuralMismatch)?;
        let bytes = if document.has_file(id) {
            document.bytes(id).ok()
        } else {
            None
        };

        let Some(bytes) = bytes else {
            if eac_protected_data_groups.contains(&number) && !eac_performed {
                tracing::debug!("skipping EF.{id}, it is protected by EAC");
                hash_results.insert(number, HashMatchResult::unread(stored_hash.clone()));
                continue;
            }
            return Err(Error::IntegrityFailure(number));
        };

        let result = HashMatchResult::new(stored_hash.clone(), algorithm.digest(&bytes));
        let matched = result.is_match();
        hash_results.insert(number, result);
        if !matched {
            return Err(Error::IntegrityFailure(number));
        }
    }
    Ok(())
}

/// Verify the EF.SOD signature and hand back the document signer certificate.
pub(super) fn document_signer<D: Document + ?Sized>(document: &D) -> Result<Certificate, Error> {
    let certificate = document.signing_certificate()?;
    if document.verify_sod_signature(&certificate)? {
        Ok(certificate)
    } else {
        Err(Error::SignatureFailure("DS Signature incorrect".into()))
    }
}

/// The first CSCA of `state` that signed the document signer certificate.
pub(super) fn country_signer<T: TrustStore + ?Sized>(
    document_signer: &Certificate,
    state: &str,
    trust_store: &T,
) -> Result<Certificate, Error> {
    let state = normalize_state(state);
    let candidates = trust_store.certificates_for(&state)?;

    let mut first_error = None;
    for csca in candidates {
        match issuer_signed_subject(document_signer, &csca) {
            Ok(()) => {
                tracing::debug!(csca = common_name_or_unknown(&csca), "CSCA found");
                return Ok(csca);
            }
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    Err(first_error.map_or(Error::TrustNotFound(state), Error::from))
}
