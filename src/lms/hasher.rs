// Domain-separated SHA-256 constructions for Merkle node values
//
// RFC 8554 section 5.3: leaf nodes (r >= 2^H) hash an OTS public key,
// internal nodes (1 <= r < 2^H) hash their two children. Both bind the
// key identifier I and the 1-indexed node position r.

use sha2::{Digest, Sha256};

use crate::lms::codec::encode_uint_be;
use crate::lms::config::{I_KEY_ID_LEN, Q_LEAF_ID_LEN};

/// Domain separator for leaf nodes.
pub const D_LEAF: [u8; 2] = [0x82, 0x82];
/// Domain separator for internal nodes.
pub const D_INTR: [u8; 2] = [0x83, 0x83];

/// `H(I || u32str(r) || D_LEAF || K)` where `K` is the OTS public key
/// of leaf `r - 2^H`.
pub(crate) fn leaf_node(
    key_id: &[u8; I_KEY_ID_LEN],
    r_node_idx: u32,
    ots_public_key: &[u8; 32],
) -> [u8; 32] {
    let mut r_bytes = [0u8; Q_LEAF_ID_LEN];
    encode_uint_be(r_node_idx, Q_LEAF_ID_LEN, &mut r_bytes);

    Sha256::new()
        .chain_update(key_id)
        .chain_update(r_bytes)
        .chain_update(D_LEAF)
        .chain_update(ots_public_key)
        .finalize()
        .into()
}

/// `H(I || u32str(r) || D_INTR || T[2r] || T[2r+1])`.
pub(crate) fn internal_node(
    key_id: &[u8; I_KEY_ID_LEN],
    r_node_idx: u32,
    left: &[u8; 32],
    right: &[u8; 32],
) -> [u8; 32] {
    let mut r_bytes = [0u8; Q_LEAF_ID_LEN];
    encode_uint_be(r_node_idx, Q_LEAF_ID_LEN, &mut r_bytes);

    Sha256::new()
        .chain_update(key_id)
        .chain_update(r_bytes)
        .chain_update(D_INTR)
        .chain_update(left)
        .chain_update(right)
        .finalize()
        .into()
}
