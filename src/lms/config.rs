// Parameter set configuration and derived wire-format sizes

use serde::{Deserialize, Serialize};

/// Length of the `I` key identifier in bytes.
pub const I_KEY_ID_LEN: usize = 16;
/// Length of the `q` leaf index field in bytes.
pub const Q_LEAF_ID_LEN: usize = 4;
/// Length of the LMS algorithm type field in bytes.
pub const TYPE_LEN: usize = 4;
/// Length of the LM-OTS algorithm type field in bytes.
pub const OTS_TYPE_LEN: usize = 4;

// Serialised public key layout (RFC 8554 section 5.3):
// lms_type (4) || ots_type (4) || I (16) || T[1] (m)
pub const PUBLIC_KEY_TYPE_OFFSET: usize = 0;
pub const PUBLIC_KEY_OTS_TYPE_OFFSET: usize = PUBLIC_KEY_TYPE_OFFSET + TYPE_LEN;
pub const PUBLIC_KEY_I_KEY_ID_OFFSET: usize = PUBLIC_KEY_OTS_TYPE_OFFSET + OTS_TYPE_LEN;
pub const PUBLIC_KEY_ROOT_NODE_OFFSET: usize = PUBLIC_KEY_I_KEY_ID_OFFSET + I_KEY_ID_LEN;

// Serialised signature layout (RFC 8554 section 5.4):
// q (4) || ots_signature || lms_type (4) || path (H * m)
pub const SIG_Q_LEAF_ID_OFFSET: usize = 0;
pub const SIG_OTS_SIG_OFFSET: usize = SIG_Q_LEAF_ID_OFFSET + Q_LEAF_ID_LEN;

/// LMS algorithm typecodes from RFC 8554 section 5.1.
///
/// Only `LMS_SHA256_M32_H10` is implemented. Other heights widen this
/// enum rather than plugging in at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LmsAlgorithmType {
    Sha256M32H10 = 6,
}

/// LM-OTS algorithm typecodes from RFC 8554 section 4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LmotsAlgorithmType {
    Sha256N32W8 = 4,
}

impl LmsAlgorithmType {
    pub const fn typecode(self) -> u32 {
        self as u32
    }

    /// Decode a wire typecode, rejecting everything but the supported set.
    pub fn from_typecode(typecode: u32) -> Option<Self> {
        match typecode {
            6 => Some(LmsAlgorithmType::Sha256M32H10),
            _ => None,
        }
    }

    /// Merkle tree height `H`.
    pub const fn tree_height(self) -> u32 {
        match self {
            LmsAlgorithmType::Sha256M32H10 => 10,
        }
    }

    /// Node length `m` in bytes.
    pub const fn node_bytes(self) -> usize {
        match self {
            LmsAlgorithmType::Sha256M32H10 => 32,
        }
    }

    /// Number of leaves, `2^H`.
    pub const fn leaf_count(self) -> u32 {
        1 << self.tree_height()
    }

    /// Size of the 1-indexed node array, `2^(H+1)`. Index 0 is unused.
    pub const fn node_count(self) -> u32 {
        1 << (self.tree_height() + 1)
    }
}

impl LmotsAlgorithmType {
    pub const fn typecode(self) -> u32 {
        self as u32
    }

    pub fn from_typecode(typecode: u32) -> Option<Self> {
        match typecode {
            4 => Some(LmotsAlgorithmType::Sha256N32W8),
            _ => None,
        }
    }

    /// Hash output length `n` in bytes.
    pub const fn hash_len(self) -> usize {
        match self {
            LmotsAlgorithmType::Sha256N32W8 => 32,
        }
    }

    /// Winternitz width `w` in bits.
    pub const fn winternitz_width(self) -> u32 {
        match self {
            LmotsAlgorithmType::Sha256N32W8 => 8,
        }
    }

    /// Number of Winternitz chains `p` (message digits plus checksum digits).
    pub const fn chain_count(self) -> usize {
        match self {
            LmotsAlgorithmType::Sha256N32W8 => 34,
        }
    }

    /// Length of the per-signature randomizer `C` in bytes.
    pub const fn c_random_len(self) -> usize {
        self.hash_len()
    }

    /// Serialised LM-OTS signature length:
    /// `ots_type (4) || C (n) || y[0..p] (p * n)`.
    pub const fn signature_len(self) -> usize {
        OTS_TYPE_LEN + self.c_random_len() + self.chain_count() * self.hash_len()
    }
}

/// Exact serialised public key length for a parameter pair.
pub const fn public_key_len(lms_type: LmsAlgorithmType) -> usize {
    PUBLIC_KEY_ROOT_NODE_OFFSET + lms_type.node_bytes()
}

/// Exact serialised signature length for a parameter pair.
pub const fn signature_len(lms_type: LmsAlgorithmType, ots_type: LmotsAlgorithmType) -> usize {
    Q_LEAF_ID_LEN
        + ots_type.signature_len()
        + TYPE_LEN
        + lms_type.tree_height() as usize * lms_type.node_bytes()
}

/// Offset of the `lms_type` field inside a serialised signature.
pub const fn sig_type_offset(ots_type: LmotsAlgorithmType) -> usize {
    SIG_OTS_SIG_OFFSET + ots_type.signature_len()
}

/// Offset of the authentication path inside a serialised signature.
pub const fn sig_path_offset(ots_type: LmotsAlgorithmType) -> usize {
    sig_type_offset(ots_type) + TYPE_LEN
}

/// The parameter pair plus the key identifier `I`, shared by both the
/// public and the private context. Immutable once a key exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LmsParameters {
    pub lms_type: LmsAlgorithmType,
    pub ots_type: LmotsAlgorithmType,
    pub key_id: [u8; I_KEY_ID_LEN],
}

/// Summary of a parameter pair for reporting surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterMetadata {
    pub lms_typecode: u32,
    pub ots_typecode: u32,
    pub tree_height: u32,
    pub leaf_count: u32,
    pub hash_function: String,
    pub signature_len: usize,
    pub public_key_len: usize,
}

impl LmsParameters {
    pub fn new(
        lms_type: LmsAlgorithmType,
        ots_type: LmotsAlgorithmType,
        key_id: [u8; I_KEY_ID_LEN],
    ) -> Self {
        Self {
            lms_type,
            ots_type,
            key_id,
        }
    }

    pub fn metadata(&self) -> ParameterMetadata {
        ParameterMetadata {
            lms_typecode: self.lms_type.typecode(),
            ots_typecode: self.ots_type.typecode(),
            tree_height: self.lms_type.tree_height(),
            leaf_count: self.lms_type.leaf_count(),
            hash_function: "SHA-256".to_string(),
            signature_len: signature_len(self.lms_type, self.ots_type),
            public_key_len: public_key_len(self.lms_type),
        }
    }
}
