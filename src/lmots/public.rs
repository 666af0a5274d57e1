// LM-OTS public keys and candidate recovery from a signature

use crate::lmots::{
    aggregate_public_key, chain, message_digest, signature_digits, LmotsParameters, SIG_C_OFFSET,
};
use crate::lms::codec::decode_uint_be;
use crate::lms::config::OTS_TYPE_LEN;
use crate::lms::error::LmsError;

/// The 32-byte aggregated chain-end value `K`, plus the parameters it
/// was computed under. `K` is what the LMS layer hashes into a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LmotsPublicKey {
    params: LmotsParameters,
    k: [u8; 32],
}

impl LmotsPublicKey {
    pub(crate) fn new(params: LmotsParameters, k: [u8; 32]) -> Self {
        Self { params, k }
    }

    pub fn params(&self) -> &LmotsParameters {
        &self.params
    }

    /// The public key value `K`.
    pub fn key_value(&self) -> &[u8; 32] {
        &self.k
    }

    /// Recover the public key candidate `Kc` implied by
    /// `(msg, sig_bytes)` under `params` (RFC 8554 Algorithm 4b).
    ///
    /// `Kc` equals the true `K` exactly when the signature is valid;
    /// the caller compares through the Merkle root rather than here.
    pub fn candidate_from_signature(
        params: &LmotsParameters,
        msg: &[u8],
        sig_bytes: &[u8],
    ) -> Result<Self, LmsError> {
        let ots_type = params.ots_type;
        if sig_bytes.len() != ots_type.signature_len() {
            return Err(LmsError::BadInput("ots signature length mismatch"));
        }
        if decode_uint_be(OTS_TYPE_LEN, sig_bytes) != ots_type.typecode() {
            return Err(LmsError::VerifyFailed);
        }

        let n = ots_type.hash_len();
        let c_len = ots_type.c_random_len();
        let c_random = &sig_bytes[SIG_C_OFFSET..SIG_C_OFFSET + c_len];
        let y_bytes = &sig_bytes[SIG_C_OFFSET + c_len..];

        let digest = message_digest(params, c_random, msg);
        let digits = signature_digits(ots_type, &digest);

        // Walk each chain the remaining 255 - a[i] steps to its end
        let chain_ends: Vec<[u8; 32]> = digits
            .iter()
            .enumerate()
            .map(|(i, &digit)| {
                let mut y = [0u8; 32];
                y.copy_from_slice(&y_bytes[i * n..(i + 1) * n]);
                chain(params, i as u16, u32::from(digit), 255, &y)
            })
            .collect();

        Ok(Self::new(*params, aggregate_public_key(params, &chain_ends)))
    }
}
