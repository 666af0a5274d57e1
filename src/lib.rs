//! LMS stateful hash-based signatures (RFC 8554).
//!
//! Supports the `LMS_SHA256_M32_H10` parameter set layered over
//! `LMOTS_SHA256_N32_W8`: a height-10 Merkle tree of 1024 one-time
//! signature key pairs. Signing is stateful: every signature consumes
//! one leaf, and the leaf counter must never regress.

pub mod lmots;
pub mod lms;

// Re-export main types
pub use lms::{
    FilePersister, InMemoryPersister, LmsAlgorithmType, LmsError, LmsParameters, LmsPrivateKey,
    LmsPublicKey, LmotsAlgorithmType, NullPersister, ParameterMetadata, PersistError,
    StatePersister,
};
