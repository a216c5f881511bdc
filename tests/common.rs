#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use der::Encode;
use p256::NistP256;
use rand::random;
use signature::Signer;
use time::macros::date;
use x509_cert::builder::{Builder, CertificateBuilder, Profile};
use x509_cert::name::Name;
use x509_cert::spki::{SignatureBitStringEncoding, SubjectPublicKeyInfoOwned};
use x509_cert::time::Validity;
use x509_cert::Certificate;

use mrtd::bac::BacKeySpec;
use mrtd::bundle::{encode_dg15, DocumentBundle};
use mrtd::lds::{DigestAlgorithm, FileId, TransportError};
use mrtd::x509::signature::ECDSA_WITH_SHA256;

pub const TD3_MRZ: &str = "P<NLDDE<BRUIJN<<WILLEKE<LISELOTTE<<<<<<<<<<<1234567897NLD7110195F1108280<<<<<<<<<<<<<<02";

/// A country's CSCA and one document signer it issued.
pub struct Issuer {
    pub country: String,
    pub csca: Certificate,
    pub document_signer: Certificate,
    signer_key: p256::ecdsa::SigningKey,
}

/// The chip of a document, holding the active authentication private key.
pub struct Chip {
    key: p256::ecdsa::SigningKey,
}

fn certificate(
    subject_key: &p256::ecdsa::SigningKey,
    issuer_key: &p256::ecdsa::SigningKey,
    profile: Profile,
    subject: Name,
) -> Result<Certificate> {
    let spki = SubjectPublicKeyInfoOwned::from_key(*subject_key.verifying_key())?;
    let mut builder = CertificateBuilder::new(
        profile,
        random::<u64>().into(),
        Validity::from_now(Duration::from_secs(600))?,
        subject,
        spki,
        issuer_key,
    )?;
    let signature: ecdsa::Signature<NistP256> = issuer_key.sign(&builder.finalize()?);
    Ok(builder.assemble(signature.to_der().to_bitstring()?)?)
}

impl Issuer {
    pub fn new(country: &str) -> Result<Self> {
        let csca_key = p256::ecdsa::SigningKey::random(&mut rand::thread_rng());
        let signer_key = p256::ecdsa::SigningKey::random(&mut rand::thread_rng());
        let csca_name: Name = format!("CN=CSCA {country},C={country}").parse()?;
        let signer_name: Name = format!("CN=Document Signer {country},C={country}").parse()?;

        let csca = certificate(&csca_key, &csca_key, Profile::Root, csca_name.clone())
            .context("could not create CSCA certificate")?;
        let leaf = Profile::Leaf {
            issuer: csca_name,
            enable_key_agreement: false,
            enable_key_encipherment: false,
        };
        let document_signer = certificate(&signer_key, &csca_key, leaf, signer_name)
            .context("could not create document signer certificate")?;

        Ok(Self {
            country: country.to_string(),
            csca,
            document_signer,
            signer_key,
        })
    }

    /// Issue a document holding `data_groups`, with EF.SOD hashes over all of them.
    pub fn issue(&self, data_groups: &[(u8, Vec<u8>)]) -> Result<DocumentBundle> {
        let mut files = BTreeMap::new();
        let mut tag_list = Vec::new();
        let mut hashes = BTreeMap::new();
        let mut signed_content = Vec::new();

        for (number, bytes) in data_groups {
            let id = FileId::data_group(*number)?;
            let hash = DigestAlgorithm::SHA256.digest(bytes);
            tag_list.push(id.tag().context("data group without tag")?);
            signed_content.push(*number);
            signed_content.extend_from_slice(&hash);
            files.insert(id, bytes.clone().into());
            hashes.insert(*number, hash.into());
        }

        let signature: ecdsa::Signature<NistP256> = self.signer_key.sign(&signed_content);

        Ok(DocumentBundle {
            files,
            tag_list,
            digest_algorithm: DigestAlgorithm::SHA256.to_string(),
            data_group_hashes: hashes,
            document_signer: self.document_signer.to_der()?.into(),
            signature_algorithm: ECDSA_WITH_SHA256.to_string(),
            signed_content: signed_content.into(),
            signature: signature.to_der().as_bytes().to_vec().into(),
            issuing_state: Some(self.country.clone()),
            eac_declared: false,
            eac_performed: false,
            bac_key: Some(bac_key()),
        })
    }

    /// A passport with DG1, DG2 and the active authentication key of `chip` in DG15.
    pub fn passport(&self, chip: &Chip) -> Result<DocumentBundle> {
        self.issue(&[
            (1, dg1()),
            (2, b"\x75\x06\x7f\x61\x03\x02\x01\x01".to_vec()),
            (15, encode_dg15(&chip.public_key()?)?),
        ])
    }
}

impl Chip {
    pub fn new() -> Self {
        Self {
            key: p256::ecdsa::SigningKey::random(&mut rand::thread_rng()),
        }
    }

    pub fn public_key(&self) -> Result<SubjectPublicKeyInfoOwned> {
        Ok(SubjectPublicKeyInfoOwned::from_key(*self.key.verifying_key())?)
    }

    /// Sign a reader challenge and check the response under `public_key`, as a reader does.
    pub fn challenge(
        &self,
        public_key: &SubjectPublicKeyInfoOwned,
    ) -> std::result::Result<bool, TransportError> {
        let challenge: [u8; 8] = random();
        let response: ecdsa::Signature<NistP256> = self.key.sign(&challenge);
        Ok(mrtd::x509::verify_signature(
            public_key,
            &ECDSA_WITH_SHA256,
            &challenge,
            response.to_der().as_bytes(),
        )
        .is_ok())
    }
}

pub fn dg1() -> Vec<u8> {
    let mut dg1 = vec![0x61, 0x5B, 0x5F, 0x1F, 0x58];
    dg1.extend_from_slice(TD3_MRZ.as_bytes());
    dg1
}

pub fn bac_key() -> BacKeySpec {
    BacKeySpec::new("123456789", date!(1971 - 10 - 19), date!(2011 - 08 - 28))
        .expect("valid document number")
}
