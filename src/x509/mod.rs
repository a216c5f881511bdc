//! The X.509 pieces of passive authentication: verifying signatures made with document signer
//! and CSCA keys, and reading certificates.
pub mod signature;
mod util;

pub use self::signature::{issuer_signed_subject, verify_signature, Error};
pub use util::{common_name_or_unknown, country_name, load_certificates, public_key};
