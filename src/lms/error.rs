// Error types for the LMS signature layer

use thiserror::Error;

use crate::lms::persist::PersistError;

#[derive(Debug, Error)]
pub enum LmsError {
    /// Unsupported parameter set, malformed length, or a context used
    /// outside its contract.
    #[error("bad input: {0}")]
    BadInput(&'static str),

    /// Caller-provided buffer is smaller than the exact known length.
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },

    /// Every one-time key under this tree has been consumed.
    #[error("all {leaf_count} one-time keys have been consumed")]
    OutOfPrivateKeys { leaf_count: u32 },

    /// Signature rejected.
    #[error("signature verification failed")]
    VerifyFailed,

    /// A crypto primitive collaborator failed (in practice the RNG;
    /// the SHA-256 backend is infallible).
    #[error("crypto primitive failure: {0}")]
    InternalCryptoError(String),

    /// The persistence collaborator refused to record the advanced
    /// counter. The consumed slot stays consumed.
    #[error("counter persistence failed: {0}")]
    PersistFailed(String),
}

impl From<rand::Error> for LmsError {
    fn from(err: rand::Error) -> Self {
        LmsError::InternalCryptoError(err.to_string())
    }
}

impl From<PersistError> for LmsError {
    fn from(err: PersistError) -> Self {
        LmsError::PersistFailed(err.to_string())
    }
}
