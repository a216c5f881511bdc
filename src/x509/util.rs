use anyhow::{Context, Error};
use const_oid::{
    db::rfc4519::{COMMON_NAME, COUNTRY_NAME},
    AssociatedOid, ObjectIdentifier,
};
use der::{
    asn1::{Ia5StringRef, PrintableStringRef, TeletexStringRef, Utf8StringRef},
    referenced::OwnedToRef,
    Decode, Tag, Tagged,
};
use ecdsa::{PrimeCurve, VerifyingKey};
use elliptic_curve::{
    sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint},
    AffinePoint, CurveArithmetic, FieldBytesSize, PublicKey,
};
use x509_cert::{attr::AttributeValue, spki::SubjectPublicKeyInfoOwned, Certificate};

const PEM_BOUNDARY: &[u8] = b"-----BEGIN";

/// Get an elliptic curve public key from a subject public key info for verification.
pub fn public_key<C>(spki: &SubjectPublicKeyInfoOwned) -> Result<VerifyingKey<C>, Error>
where
    C: AssociatedOid + CurveArithmetic + PrimeCurve,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    spki.owned_to_ref()
        .try_into()
        .map(|key: PublicKey<C>| key.into())
        .context("could not parse public key from PKCS8 SPKI")
}

/// Decode one DER certificate, or every certificate of a PEM file.
pub fn load_certificates(bytes: &[u8]) -> Result<Vec<Certificate>, Error> {
    let trimmed = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map_or(&[][..], |start| &bytes[start..]);

    if trimmed.starts_with(PEM_BOUNDARY) {
        Certificate::load_pem_chain(bytes).context("could not decode PEM certificates")
    } else {
        Certificate::from_der(bytes)
            .map(|certificate| vec![certificate])
            .context("could not decode DER certificate")
    }
}

/// Get the first CommonName of the X.509 certificate, or return "Unknown".
pub fn common_name_or_unknown(certificate: &Certificate) -> &str {
    subject_attribute(certificate, COMMON_NAME).unwrap_or("Unknown")
}

/// The subject countryName, which for CSCA and document signer certificates is the issuing state.
pub fn country_name(certificate: &Certificate) -> Option<&str> {
    subject_attribute(certificate, COUNTRY_NAME)
}

fn subject_attribute(certificate: &Certificate, oid: ObjectIdentifier) -> Option<&str> {
    certificate
        .tbs_certificate
        .subject
        .0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .filter_map(|attribute| {
            if attribute.oid == oid {
                attribute_value_to_str(&attribute.value)
            } else {
                None
            }
        })
        .next()
}

pub fn attribute_value_to_str(av: &AttributeValue) -> Option<&str> {
    match av.tag() {
        Tag::PrintableString => PrintableStringRef::try_from(av).ok().map(|s| s.as_str()),
        Tag::Utf8String => Utf8StringRef::try_from(av).ok().map(|s| s.as_str()),
        Tag::Ia5String => Ia5StringRef::try_from(av).ok().map(|s| s.as_str()),
        Tag::TeletexString => TeletexStringRef::try_from(av).ok().map(|s| s.as_str()),
        _ => None,
    }
}
