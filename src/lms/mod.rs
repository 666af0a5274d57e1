// LMS Merkle-tree composition layer over the LM-OTS one-time primitive
//
// The modules here cover the five core concerns: byte-exact wire
// framing (codec), domain-separated node hashing (hasher), full-tree
// construction (tree), the stateful signer (private), and the
// verifier (public). The persistence seam for the leaf counter lives
// in persist.

pub mod codec;
pub mod config;
pub mod error;
pub mod hasher;
pub mod persist;
pub mod private;
pub mod public;
pub(crate) mod tree;

pub use config::{LmsAlgorithmType, LmsParameters, LmotsAlgorithmType, ParameterMetadata};
pub use error::LmsError;
pub use persist::{FilePersister, InMemoryPersister, NullPersister, PersistError, StatePersister};
pub use private::LmsPrivateKey;
pub use public::LmsPublicKey;
