// The stateful LMS signer: OTS key material plus the monotone leaf
// counter q_next_usable_key

use rand::RngCore;
use tracing::{debug, info};

use crate::lmots::{LmotsPrivateKey, LmotsPublicKey};
use crate::lms::codec::encode_uint_be;
use crate::lms::config::{
    self, LmsAlgorithmType, LmsParameters, LmotsAlgorithmType, ParameterMetadata, I_KEY_ID_LEN,
    Q_LEAF_ID_LEN, SIG_OTS_SIG_OFFSET, SIG_Q_LEAF_ID_OFFSET, TYPE_LEN,
};
use crate::lms::error::LmsError;
use crate::lms::persist::StatePersister;
use crate::lms::public::LmsPublicKey;
use crate::lms::tree::MerkleTree;

/// LMS private context: 1024 one-time key pairs under one identifier.
///
/// Signing consumes leaves in order; `q_next_usable_key` only ever
/// grows, and once a slot's counter advance has been handed to the
/// persister the slot is spent even if the signature never reaches
/// the caller.
#[derive(Clone)]
pub struct LmsPrivateKey {
    params: LmsParameters,
    ots_private_keys: Vec<LmotsPrivateKey>,
    ots_public_keys: Vec<LmotsPublicKey>,
    q_next_usable_key: u32,
}

impl LmsPrivateKey {
    /// Generate a fresh private context: draw `I` from `rng`, derive
    /// all `2^H` one-time keys from `(I, leaf index, seed)` and their
    /// public counterparts.
    ///
    /// On any failure nothing of the partial context survives.
    pub fn generate<R: RngCore>(
        lms_type: LmsAlgorithmType,
        ots_type: LmotsAlgorithmType,
        rng: &mut R,
        seed: &[u8],
    ) -> Result<Self, LmsError> {
        let mut key_id = [0u8; I_KEY_ID_LEN];
        rng.try_fill_bytes(&mut key_id)?;
        let params = LmsParameters::new(lms_type, ots_type, key_id);

        let leaf_count = lms_type.leaf_count() as usize;
        let mut ots_private_keys = Vec::with_capacity(leaf_count);
        let mut ots_public_keys = Vec::with_capacity(leaf_count);
        for q in 0..leaf_count as u32 {
            let sk = LmotsPrivateKey::new(ots_type, key_id, q, seed);
            ots_public_keys.push(sk.public_key());
            ots_private_keys.push(sk);
        }

        info!(
            key_id = %hex::encode(key_id),
            leaf_count,
            "generated LMS private key"
        );

        Ok(Self {
            params,
            ots_private_keys,
            ots_public_keys,
            q_next_usable_key: 0,
        })
    }

    pub fn params(&self) -> &LmsParameters {
        &self.params
    }

    pub fn metadata(&self) -> ParameterMetadata {
        self.params.metadata()
    }

    /// Leaf index the next signature will consume.
    pub fn q_next_usable_key(&self) -> u32 {
        self.q_next_usable_key
    }

    /// Signatures still available under this tree.
    pub fn remaining_signatures(&self) -> u32 {
        self.params.lms_type.leaf_count() - self.q_next_usable_key
    }

    /// Build the full Merkle tree and bind its root into a public
    /// context.
    pub fn compute_public_key(&self) -> LmsPublicKey {
        let tree = MerkleTree::build(&self.params, &self.ots_public_keys);
        info!(key_id = %hex::encode(self.params.key_id), "computed LMS public key");
        LmsPublicKey::new(self.params, *tree.root())
    }

    /// Sign `msg`, returning the exact-length serialised signature.
    pub fn sign<R: RngCore>(
        &mut self,
        rng: &mut R,
        msg: &[u8],
        persister: &mut dyn StatePersister,
    ) -> Result<Vec<u8>, LmsError> {
        let mut sig = vec![0u8; config::signature_len(self.params.lms_type, self.params.ots_type)];
        self.sign_into(rng, msg, persister, &mut sig)?;
        Ok(sig)
    }

    /// Sign `msg` into `sig_out`:
    /// `q (4) || ots signature || lms_type (4) || path (H * m)`.
    /// Returns the number of bytes written.
    ///
    /// Preconditions:
    /// - `sig_out` holds at least the exact signature length
    /// - a usable leaf remains (`q_next_usable_key < 2^H`)
    ///
    /// Postconditions:
    /// - the persister has recorded `q + 1` before any signature bytes
    ///   exist
    ///
    /// Invariants:
    /// - `q_next_usable_key` never decreases: a failure after the
    ///   advance loses the slot rather than risking a one-time key
    ///   reuse
    pub fn sign_into<R: RngCore>(
        &mut self,
        rng: &mut R,
        msg: &[u8],
        persister: &mut dyn StatePersister,
        sig_out: &mut [u8],
    ) -> Result<usize, LmsError> {
        let sig_len = config::signature_len(self.params.lms_type, self.params.ots_type);
        if sig_out.len() < sig_len {
            return Err(LmsError::BufferTooSmall {
                needed: sig_len,
                got: sig_out.len(),
            });
        }

        let leaf_count = self.params.lms_type.leaf_count();
        if self.q_next_usable_key >= leaf_count {
            return Err(LmsError::OutOfPrivateKeys { leaf_count });
        }

        let q_leaf_id = self.q_next_usable_key;
        // The advanced value must be durable before the signature is
        // released; from here on the slot is spent.
        self.q_next_usable_key = q_leaf_id + 1;
        persister.persist_counter(&self.params.key_id, self.q_next_usable_key)?;

        let ots_sig_len = self.params.ots_type.signature_len();
        self.ots_private_keys[q_leaf_id as usize].sign(
            rng,
            msg,
            &mut sig_out[SIG_OTS_SIG_OFFSET..SIG_OTS_SIG_OFFSET + ots_sig_len],
        )?;

        encode_uint_be(
            q_leaf_id,
            Q_LEAF_ID_LEN,
            &mut sig_out[SIG_Q_LEAF_ID_OFFSET..],
        );
        encode_uint_be(
            self.params.lms_type.typecode(),
            TYPE_LEN,
            &mut sig_out[config::sig_type_offset(self.params.ots_type)..],
        );

        let tree = MerkleTree::build(&self.params, &self.ots_public_keys);
        let path_offset = config::sig_path_offset(self.params.ots_type);
        let m = self.params.lms_type.node_bytes();
        for (h, sibling) in tree.authentication_path(q_leaf_id).iter().enumerate() {
            sig_out[path_offset + h * m..path_offset + (h + 1) * m].copy_from_slice(sibling);
        }

        debug!(
            key_id = %hex::encode(self.params.key_id),
            q = q_leaf_id,
            remaining = self.remaining_signatures(),
            "produced LMS signature"
        );

        Ok(sig_len)
    }
}
