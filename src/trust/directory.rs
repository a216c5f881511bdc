use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use x509_cert::Certificate;

use super::{normalize_state, Error, TrustStore};
use crate::x509::load_certificates;

const EXTENSIONS: [&str; 3] = ["cer", "der", "pem"];

/// A directory holding one certificate file per state, e.g. `nld.cer` or `d.pem`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CscaDirectory {
    root: PathBuf,
}

impl CscaDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    fn unavailable(&self, message: impl ToString) -> Error {
        Error::Unavailable {
            location: self.root.display().to_string(),
            message: message.to_string(),
        }
    }
}

impl TrustStore for CscaDirectory {
    fn certificates_for(&self, state: &str) -> Result<Vec<Certificate>, Error> {
        if !self.root.is_dir() {
            return Err(self.unavailable("not a directory"));
        }

        let stem = normalize_state(state).to_ascii_lowercase();
        if stem.is_empty() || !stem.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Ok(vec![]);
        }

        let mut certificates = Vec::new();
        let mut undecodable = None;
        for extension in EXTENSIONS {
            let path = self.root.join(format!("{stem}.{extension}"));
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(self.unavailable(e)),
            };
            match load_certificates(&bytes) {
                Ok(loaded) => {
                    tracing::debug!(path = %path.display(), count = loaded.len(), "loaded CSCA certificates");
                    certificates.extend(loaded);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "skipping undecodable CSCA file: {e:#}");
                    undecodable.get_or_insert(Error::Decode {
                        location: path.display().to_string(),
                        message: format!("{e:#}"),
                    });
                }
            }
        }

        match undecodable {
            Some(e) if certificates.is_empty() => Err(e),
            _ => Ok(certificates),
        }
    }
}
