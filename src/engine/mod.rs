//! The verification pipeline.
//!
//! Checks run in a fixed order: BAC, EAC, AA, then passive authentication (HT, DS, CS). The
//! passive authentication checks depend on each other, a failed hash table means the signature
//! is not checked, and a failed signature means the certificate chain is not checked.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::lds::{Document, Session};
use crate::trust::TrustStore;
use crate::verdict::{CheckKind, CheckResult, VerificationStatus};

mod access;
mod error;
mod passive;

pub use error::Error;

/// Data groups that are only readable after EAC: fingerprints (DG3) and iris (DG4).
pub const DEFAULT_EAC_PROTECTED_DATA_GROUPS: [u8; 2] = [3, 4];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOptions {
    /// Data groups whose absence is expected when EAC was not performed.
    pub eac_protected_data_groups: BTreeSet<u8>,
}

impl Default for VerificationOptions {
    fn default() -> Self {
        Self {
            eac_protected_data_groups: DEFAULT_EAC_PROTECTED_DATA_GROUPS.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VerificationEngine {
    options: VerificationOptions,
}

impl VerificationEngine {
    pub fn new(options: VerificationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &VerificationOptions {
        &self.options
    }

    /// Run every check against `document`.
    ///
    /// Never fails: a check that cannot be completed is reported as failed, with the cause as
    /// its reason. Running twice on the same inputs gives equal statuses.
    pub fn run<D, T, S>(&self, document: &D, trust_store: &T, session: &S) -> VerificationStatus
    where
        D: Document + ?Sized,
        T: TrustStore + ?Sized,
        S: Session + ?Sized,
    {
        let issuing_state = document.issuing_state();
        let span = tracing::info_span!("verify", issuing_state = issuing_state.as_deref());
        let _entered = span.enter();

        let mut status = VerificationStatus::default()
            .with_result(
                CheckKind::Bac,
                outcome(CheckKind::Bac, access::basic_access_control(session)),
            )
            .with_result(
                CheckKind::Eac,
                outcome(CheckKind::Eac, access::extended_access_control(document)),
            )
            .with_result(
                CheckKind::Aa,
                outcome(CheckKind::Aa, access::active_authentication(document, session)),
            );

        let mut hash_results = BTreeMap::new();
        let hash_table = passive::hash_table(
            document,
            &self.options.eac_protected_data_groups,
            &mut hash_results,
        );
        status = status.with_hash_results(hash_results);

        if let Err(e) = hash_table {
            tracing::warn!(check = %CheckKind::Ht, "{e}");
            return status
                .with_result(CheckKind::Ht, CheckResult::failed(e.to_string()))
                .with_result(
                    CheckKind::Ds,
                    CheckResult::not_checked("hash table not verified"),
                )
                .with_result(
                    CheckKind::Cs,
                    CheckResult::not_checked("hash table not verified"),
                );
        }
        status = status.with_result(
            CheckKind::Ht,
            outcome(CheckKind::Ht, Ok(CheckResult::succeeded())),
        );

        let signer = match passive::document_signer(document) {
            Ok(signer) => signer,
            Err(e) => {
                tracing::warn!(check = %CheckKind::Ds, "{e}");
                return status
                    .with_result(CheckKind::Ds, CheckResult::failed(e.to_string()))
                    .with_result(
                        CheckKind::Cs,
                        CheckResult::not_checked("document signer not verified"),
                    );
            }
        };
        status = status.with_result(
            CheckKind::Ds,
            outcome(CheckKind::Ds, Ok(CheckResult::succeeded())),
        );

        let Some(state) = issuing_state.as_deref() else {
            return status.with_result(
                CheckKind::Cs,
                CheckResult::not_checked("issuing state unknown"),
            );
        };
        match passive::country_signer(&signer, state, trust_store) {
            Ok(csca) => status
                .with_certificate_chain(vec![signer, csca])
                .with_result(
                    CheckKind::Cs,
                    outcome(CheckKind::Cs, Ok(CheckResult::succeeded())),
                ),
            Err(e) => status.with_result(CheckKind::Cs, outcome(CheckKind::Cs, Err(e))),
        }
    }
}

fn outcome(kind: CheckKind, result: Result<CheckResult, Error>) -> CheckResult {
    match result {
        Ok(result) => {
            tracing::debug!(check = %kind, verdict = %result.verdict);
            result
        }
        Err(e) => {
            tracing::warn!(check = %kind, "{e}");
            CheckResult::failed(e.to_string())
        }
    }
}
