// LM-OTS private keys: Appendix A derivation and one-shot signing

use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::lmots::{
    chain, message_digest, signature_digits, LmotsParameters, LmotsPublicKey, D_PRIVATE,
    SIG_C_OFFSET,
};
use crate::lms::codec::encode_uint_be;
use crate::lms::config::{I_KEY_ID_LEN, LmotsAlgorithmType, OTS_TYPE_LEN};
use crate::lms::error::LmsError;

/// One leaf's worth of Winternitz chain secrets.
///
/// The secrets are derived, not drawn: RFC 8554 Appendix A computes
/// `x[i] = H(I || u32str(q) || u16str(i) || u8str(0xff) || SEED)`, so
/// the whole tree reproduces from `(I, seed)`.
#[derive(Clone)]
pub struct LmotsPrivateKey {
    params: LmotsParameters,
    x_chain_secrets: Vec<[u8; 32]>,
}

impl LmotsPrivateKey {
    pub fn new(
        ots_type: LmotsAlgorithmType,
        key_id: [u8; I_KEY_ID_LEN],
        q_leaf_id: u32,
        seed: &[u8],
    ) -> Self {
        let params = LmotsParameters::new(ots_type, key_id, q_leaf_id);
        let mut q_bytes = [0u8; 4];
        encode_uint_be(q_leaf_id, 4, &mut q_bytes);

        let x_chain_secrets = (0..ots_type.chain_count())
            .map(|i| {
                let mut i_bytes = [0u8; 2];
                encode_uint_be(i as u32, 2, &mut i_bytes);
                Sha256::new()
                    .chain_update(key_id)
                    .chain_update(q_bytes)
                    .chain_update(i_bytes)
                    .chain_update([D_PRIVATE])
                    .chain_update(seed)
                    .finalize()
                    .into()
            })
            .collect();

        Self {
            params,
            x_chain_secrets,
        }
    }

    pub fn params(&self) -> &LmotsParameters {
        &self.params
    }

    /// Walk every chain to its end and aggregate into the public key
    /// value `K` (RFC 8554 Algorithm 1).
    pub fn public_key(&self) -> LmotsPublicKey {
        let chain_ends: Vec<[u8; 32]> = self
            .x_chain_secrets
            .iter()
            .enumerate()
            .map(|(i, x)| chain(&self.params, i as u16, 0, 255, x))
            .collect();
        LmotsPublicKey::new(self.params, crate::lmots::aggregate_public_key(&self.params, &chain_ends))
    }

    /// Sign `msg` into `sig_out` (RFC 8554 Algorithm 3):
    /// `ots_type (4) || C (32) || y[0..p] (p * 32)`. Returns the
    /// number of bytes written.
    ///
    /// Single-use enforcement lives in the LMS leaf counter; this
    /// type does not track consumption itself.
    pub fn sign<R: RngCore>(
        &self,
        rng: &mut R,
        msg: &[u8],
        sig_out: &mut [u8],
    ) -> Result<usize, LmsError> {
        let sig_len = self.params.ots_type.signature_len();
        if sig_out.len() < sig_len {
            return Err(LmsError::BufferTooSmall {
                needed: sig_len,
                got: sig_out.len(),
            });
        }

        let c_len = self.params.ots_type.c_random_len();
        let mut c_random = vec![0u8; c_len];
        rng.try_fill_bytes(&mut c_random)?;

        let digest = message_digest(&self.params, &c_random, msg);
        let digits = signature_digits(self.params.ots_type, &digest);

        encode_uint_be(self.params.ots_type.typecode(), OTS_TYPE_LEN, sig_out);
        sig_out[SIG_C_OFFSET..SIG_C_OFFSET + c_len].copy_from_slice(&c_random);

        let n = self.params.ots_type.hash_len();
        let y_offset = SIG_C_OFFSET + c_len;
        for (i, (&digit, x)) in digits.iter().zip(&self.x_chain_secrets).enumerate() {
            let y = chain(&self.params, i as u16, 0, u32::from(digit), x);
            sig_out[y_offset + i * n..y_offset + (i + 1) * n].copy_from_slice(&y);
        }

        Ok(sig_len)
    }
}

impl Drop for LmotsPrivateKey {
    fn drop(&mut self) {
        self.x_chain_secrets.zeroize();
    }
}
