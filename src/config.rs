//! Configuration with TOML file support.
//!
//! Every section and key is optional:
//!
//! ```toml
//! [trust]
//! csca_directories = ["/etc/mrtd/csca"]
//!
//! [verification]
//! eac_protected_data_groups = [3, 4]
//!
//! [mrz]
//! timeout_ms = 3000
//! capacity = 256
//! reference_year = 2026
//! ```
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{VerificationOptions, DEFAULT_EAC_PROTECTED_DATA_GROUPS};
use crate::lds::{MAX_DATA_GROUP, MIN_DATA_GROUP};
use crate::mrz::{MrzOptions, DEFAULT_CAPACITY, DEFAULT_TIMEOUT_MS};
use crate::trust::{CscaDirectory, TrustStores};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("DG{0} is not a data group")]
    NotADataGroup(u8),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub trust: TrustConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub mrz: MrzConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrustConfig {
    /// Directories of `<state>.cer` files, consulted in order.
    #[serde(default)]
    pub csca_directories: Vec<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerificationConfig {
    #[serde(default = "default_eac_protected_data_groups")]
    pub eac_protected_data_groups: BTreeSet<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MrzConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Defaults to the current year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_year: Option<i32>,
}

fn default_eac_protected_data_groups() -> BTreeSet<u8> {
    DEFAULT_EAC_PROTECTED_DATA_GROUPS.into()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            eac_protected_data_groups: default_eac_protected_data_groups(),
        }
    }
}

impl Default for MrzConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            capacity: default_capacity(),
            reference_year: None,
        }
    }
}

impl Config {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        let config: Config = toml::from_str(s)?;
        if let Some(n) = config
            .verification
            .eac_protected_data_groups
            .iter()
            .find(|n| !(MIN_DATA_GROUP..=MAX_DATA_GROUP).contains(*n))
        {
            return Err(Error::NotADataGroup(*n));
        }
        Ok(config)
    }

    /// One [CscaDirectory] per configured directory, plus `extra` directories after them.
    pub fn trust_stores<I, P>(&self, extra: I) -> TrustStores
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.trust
            .csca_directories
            .iter()
            .cloned()
            .chain(extra.into_iter().map(Into::into))
            .fold(TrustStores::new(), |stores, directory| {
                stores.with_store(CscaDirectory::new(directory))
            })
    }

    pub fn verification_options(&self) -> VerificationOptions {
        VerificationOptions {
            eac_protected_data_groups: self.verification.eac_protected_data_groups.clone(),
        }
    }

    pub fn mrz_options(&self) -> MrzOptions {
        let defaults = MrzOptions::default();
        MrzOptions {
            timeout_ms: self.mrz.timeout_ms,
            capacity: self.mrz.capacity,
            reference_year: self.mrz.reference_year.unwrap_or(defaults.reference_year),
        }
    }
}
