//! Security verification of electronic travel documents (ICAO 9303 e-passports and ID cards),
//! and recognition of MRZ input from keyboard-wedge scanners.
//!
//! The [engine::VerificationEngine] runs the access control checks (BAC, EAC, active
//! authentication) and passive authentication (hash table, document signer, country signing CA)
//! over any [lds::Document], and reports an immutable [verdict::VerificationStatus].
//!
//! ```ignore
//! use mrtd::{bundle::DocumentBundle, engine::VerificationEngine, trust::CscaDirectory};
//!
//! let bundle = DocumentBundle::from_json_file("passport.json")?;
//! let status = VerificationEngine::default().run(
//!     &bundle,
//!     &CscaDirectory::new("/etc/mrtd/csca"),
//!     &bundle.replay_session(),
//! );
//! ```
pub mod bac;
pub mod bundle;
pub mod config;
pub mod engine;
pub mod lds;
pub mod mrz;
pub mod trust;
pub mod verdict;
pub mod x509;
