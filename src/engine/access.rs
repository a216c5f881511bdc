//! Checks about how the chip was accessed: BAC, EAC and active authentication.
use crate::lds::{Document, Session};
use crate::verdict::CheckResult;

use super::Error;

const AA_DATA_GROUP: u8 = 15;

pub(super) fn basic_access_control<S: Session + ?Sized>(session: &S) -> Result<CheckResult, Error> {
    match session.bac_key() {
        Some(_) => Ok(CheckResult::succeeded()),
        None => Err(Error::NotPresent("BAC not used".into())),
    }
}

pub(super) fn extended_access_control<D: Document + ?Sized>(
    document: &D,
) -> Result<CheckResult, Error> {
    if !document.declares_eac() {
        return Ok(CheckResult::not_present("EAC not declared"));
    }
    if document.eac_was_performed() {
        Ok(CheckResult::succeeded())
    } else {
        Err(Error::NotPresent("EAC not performed".into()))
    }
}

/// Challenge the chip when a live session is available. A document whose EF.SOD does not
/// protect DG15 cannot be actively authenticated at all.
pub(super) fn active_authentication<D, S>(document: &D, session: &S) -> Result<CheckResult, Error>
where
    D: Document + ?Sized,
    S: Session + ?Sized,
{
    if !document.stored_hashes()?.contains_key(&AA_DATA_GROUP) {
        return Err(Error::NotPresent("AA not supported (no DG15 hash)".into()));
    }

    let Some(authenticator) = session.active_authenticator() else {
        return Ok(CheckResult::not_checked("no live chip session"));
    };

    let public_key = document.aa_public_key()?;
    if authenticator.challenge(&public_key)? {
        Ok(CheckResult::succeeded())
    } else {
        Err(Error::SignatureFailure("Response to AA incorrect".into()))
    }
}
