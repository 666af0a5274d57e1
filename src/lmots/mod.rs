// LM-OTS one-time signatures (RFC 8554 section 4), LMOTS_SHA256_N32_W8
//
// Winternitz chains over SHA-256: n = 32 byte hashes, w = 8 bit
// digits, p = 34 chains (32 message digits + 2 checksum digits),
// ls = 0. Each private key signs exactly one message; the LMS layer
// above enforces single use through its leaf counter.

mod private;
mod public;

pub use private::LmotsPrivateKey;
pub use public::LmotsPublicKey;

use sha2::{Digest, Sha256};

use crate::lms::codec::encode_uint_be;
use crate::lms::config::{I_KEY_ID_LEN, LmotsAlgorithmType, OTS_TYPE_LEN, Q_LEAF_ID_LEN};

/// Domain separator for public key aggregation.
pub const D_PBLC: [u8; 2] = [0x80, 0x80];
/// Domain separator for message digesting.
pub const D_MESG: [u8; 2] = [0x81, 0x81];
/// Appendix A tag byte for pseudorandom chain-secret derivation.
const D_PRIVATE: u8 = 0xff;

/// Offset of the randomizer `C` inside a serialised LM-OTS signature.
pub(crate) const SIG_C_OFFSET: usize = OTS_TYPE_LEN;

/// Parameter bundle naming one chain position under one tree:
/// the OTS typecode, the key identifier `I`, and the leaf index `q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LmotsParameters {
    pub ots_type: LmotsAlgorithmType,
    pub key_id: [u8; I_KEY_ID_LEN],
    pub q_leaf_id: u32,
}

impl LmotsParameters {
    pub fn new(ots_type: LmotsAlgorithmType, key_id: [u8; I_KEY_ID_LEN], q_leaf_id: u32) -> Self {
        Self {
            ots_type,
            key_id,
            q_leaf_id,
        }
    }

    fn q_bytes(&self) -> [u8; Q_LEAF_ID_LEN] {
        let mut out = [0u8; Q_LEAF_ID_LEN];
        encode_uint_be(self.q_leaf_id, Q_LEAF_ID_LEN, &mut out);
        out
    }
}

/// One Winternitz chain segment: iterate
/// `tmp = H(I || u32str(q) || u16str(i) || u8str(j) || tmp)`
/// for `j` in `[from, to)`.
pub(crate) fn chain(
    params: &LmotsParameters,
    chain_idx: u16,
    from: u32,
    to: u32,
    start: &[u8; 32],
) -> [u8; 32] {
    let q_bytes = params.q_bytes();
    let mut i_bytes = [0u8; 2];
    encode_uint_be(u32::from(chain_idx), 2, &mut i_bytes);

    let mut tmp = *start;
    for j in from..to {
        tmp = Sha256::new()
            .chain_update(params.key_id)
            .chain_update(q_bytes)
            .chain_update(i_bytes)
            .chain_update([j as u8])
            .chain_update(tmp)
            .finalize()
            .into();
    }
    tmp
}

/// `Q = H(I || u32str(q) || D_MESG || C || message)`.
pub(crate) fn message_digest(params: &LmotsParameters, c_random: &[u8], msg: &[u8]) -> [u8; 32] {
    Sha256::new()
        .chain_update(params.key_id)
        .chain_update(params.q_bytes())
        .chain_update(D_MESG)
        .chain_update(c_random)
        .chain_update(msg)
        .finalize()
        .into()
}

/// Winternitz digits of `Q || Cksm(Q)`: with `w = 8` every byte is one
/// digit, and the 16-bit checksum `sum(255 - Q[i])` (no left shift,
/// `ls = 0`) contributes the last two.
pub(crate) fn signature_digits(ots_type: LmotsAlgorithmType, digest: &[u8; 32]) -> Vec<u8> {
    let mut digits = Vec::with_capacity(ots_type.chain_count());
    digits.extend_from_slice(digest);

    let checksum: u16 = digest.iter().map(|&b| 255 - u16::from(b)).sum();
    let mut checksum_bytes = [0u8; 2];
    encode_uint_be(u32::from(checksum), 2, &mut checksum_bytes);
    digits.extend_from_slice(&checksum_bytes);

    debug_assert_eq!(digits.len(), ots_type.chain_count());
    digits
}

/// `K = H(I || u32str(q) || D_PBLC || y[0] || ... || y[p-1])`.
pub(crate) fn aggregate_public_key(params: &LmotsParameters, chain_ends: &[[u8; 32]]) -> [u8; 32] {
    let mut hasher = Sha256::new()
        .chain_update(params.key_id)
        .chain_update(params.q_bytes())
        .chain_update(D_PBLC);
    for end in chain_ends {
        hasher.update(end);
    }
    hasher.finalize().into()
}
