use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

/// Digest algorithms that may protect the data groups in EF.SOD.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum DigestAlgorithm {
    #[serde(rename = "SHA-1")]
    SHA1,
    #[serde(rename = "SHA-224")]
    SHA224,
    #[serde(rename = "SHA-256")]
    SHA256,
    #[serde(rename = "SHA-384")]
    SHA384,
    #[serde(rename = "SHA-512")]
    SHA512,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported digest algorithm: {0}")]
pub struct UnsupportedDigestAlgorithm(pub String);

impl DigestAlgorithm {
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::SHA1 => Sha1::digest(data).to_vec(),
            DigestAlgorithm::SHA224 => Sha224::digest(data).to_vec(),
            DigestAlgorithm::SHA256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::SHA384 => Sha384::digest(data).to_vec(),
            DigestAlgorithm::SHA512 => Sha512::digest(data).to_vec(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::SHA1 => "SHA-1",
            DigestAlgorithm::SHA224 => "SHA-224",
            DigestAlgorithm::SHA256 => "SHA-256",
            DigestAlgorithm::SHA384 => "SHA-384",
            DigestAlgorithm::SHA512 => "SHA-512",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the names used by EF.SOD decoders, e.g. `SHA-256`, `SHA256` or `sha256`.
impl FromStr for DigestAlgorithm {
    type Err = UnsupportedDigestAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-')
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "SHA1" => Ok(DigestAlgorithm::SHA1),
            "SHA224" => Ok(DigestAlgorithm::SHA224),
            "SHA256" => Ok(DigestAlgorithm::SHA256),
            "SHA384" => Ok(DigestAlgorithm::SHA384),
            "SHA512" => Ok(DigestAlgorithm::SHA512),
            _ => Err(UnsupportedDigestAlgorithm(s.to_string())),
        }
    }
}
