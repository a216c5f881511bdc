use const_oid::{AssociatedOid, ObjectIdentifier};
use der::Encode;
use p256::NistP256;
use p384::NistP384;
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use sha2::{Digest, Sha256, Sha384, Sha512};
use signature::Verifier;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::Certificate;

use super::util::{common_name_or_unknown, public_key};

pub const ECDSA_WITH_SHA256: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");
pub const ECDSA_WITH_SHA384: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");
pub const SHA256_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
pub const SHA384_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");
pub const SHA512_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unsupported signature algorithm {0}")]
    UnsupportedAlgorithm(ObjectIdentifier),
    #[error("could not decode public key: {0}")]
    PublicKey(String),
    #[error("could not decode signature: {0}")]
    Signature(String),
    #[error("could not encode signed data: {0}")]
    Encoding(String),
    #[error("signature does not match")]
    Mismatch,
}

/// Verify `signature` over `message` with the given subject public key.
///
/// ECDSA signatures are expected in their DER encoding, RSA signatures use PKCS#1 v1.5.
pub fn verify_signature(
    public_key: &SubjectPublicKeyInfoOwned,
    algorithm: &ObjectIdentifier,
    message: &[u8],
    signature: &[u8],
) -> Result<(), Error> {
    if *algorithm == ECDSA_WITH_SHA256 {
        verify_p256(public_key, message, signature)
    } else if *algorithm == ECDSA_WITH_SHA384 {
        verify_p384(public_key, message, signature)
    } else if *algorithm == SHA256_WITH_RSA_ENCRYPTION {
        verify_rsa::<Sha256>(public_key, message, signature)
    } else if *algorithm == SHA384_WITH_RSA_ENCRYPTION {
        verify_rsa::<Sha384>(public_key, message, signature)
    } else if *algorithm == SHA512_WITH_RSA_ENCRYPTION {
        verify_rsa::<Sha512>(public_key, message, signature)
    } else {
        Err(Error::UnsupportedAlgorithm(*algorithm))
    }
}

/// Check that the issuer certificate signed the subject certificate.
pub fn issuer_signed_subject(subject: &Certificate, issuer: &Certificate) -> Result<(), Error> {
    let tbs = subject
        .tbs_certificate
        .to_der()
        .map_err(|e| Error::Encoding(e.to_string()))?;

    let result = verify_signature(
        &issuer.tbs_certificate.subject_public_key_info,
        &subject.signature_algorithm.oid,
        &tbs,
        subject.signature.raw_bytes(),
    );

    if let Err(e) = &result {
        tracing::debug!(
            subject = common_name_or_unknown(subject),
            issuer = common_name_or_unknown(issuer),
            "subject certificate signature could not be validated: {e}"
        );
    }
    result
}

fn verify_p256(
    spki: &SubjectPublicKeyInfoOwned,
    message: &[u8],
    signature: &[u8],
) -> Result<(), Error> {
    let key: ecdsa::VerifyingKey<NistP256> =
        public_key(spki).map_err(|e| Error::PublicKey(format!("{e:#}")))?;
    let signature = p256::ecdsa::Signature::from_der(signature)
        .map_err(|e| Error::Signature(e.to_string()))?;
    key.verify(message, &signature).map_err(|_| Error::Mismatch)
}

fn verify_p384(
    spki: &SubjectPublicKeyInfoOwned,
    message: &[u8],
    signature: &[u8],
) -> Result<(), Error> {
    let key: ecdsa::VerifyingKey<NistP384> =
        public_key(spki).map_err(|e| Error::PublicKey(format!("{e:#}")))?;
    let signature = p384::ecdsa::Signature::from_der(signature)
        .map_err(|e| Error::Signature(e.to_string()))?;
    key.verify(message, &signature).map_err(|_| Error::Mismatch)
}

fn verify_rsa<D>(
    spki: &SubjectPublicKeyInfoOwned,
    message: &[u8],
    signature: &[u8],
) -> Result<(), Error>
where
    D: Digest + AssociatedOid,
{
    let der = spki
        .to_der()
        .map_err(|e| Error::PublicKey(e.to_string()))?;
    let key =
        RsaPublicKey::from_public_key_der(&der).map_err(|e| Error::PublicKey(e.to_string()))?;
    let signature = rsa::pkcs1v15::Signature::try_from(signature)
        .map_err(|e| Error::Signature(e.to_string()))?;
    rsa::pkcs1v15::VerifyingKey::<D>::new(key)
        .verify(message, &signature)
        .map_err(|_| Error::Mismatch)
}
