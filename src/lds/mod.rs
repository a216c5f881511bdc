//! Logical Data Structure: file identifiers, digest algorithms and the decoded-document
//! collaborators consumed by the verification engine.
mod digest;
mod document;
mod file_id;

pub use digest::{DigestAlgorithm, UnsupportedDigestAlgorithm};
pub use document::{
    ActiveAuthenticator, Document, Error, LiveSession, ReplaySession, Session, TransportError,
};
pub use file_id::{
    data_group_number_for_tag, Error as FileIdError, FileId, MAX_DATA_GROUP, MIN_DATA_GROUP,
};
