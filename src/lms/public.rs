// The LMS public context: import/export and signature verification

use subtle::ConstantTimeEq;
use tracing::warn;

use crate::lmots::{LmotsParameters, LmotsPublicKey};
use crate::lms::codec::{decode_uint_be, encode_uint_be};
use crate::lms::config::{
    self, LmsAlgorithmType, LmsParameters, LmotsAlgorithmType, ParameterMetadata, I_KEY_ID_LEN,
    OTS_TYPE_LEN, PUBLIC_KEY_I_KEY_ID_OFFSET, PUBLIC_KEY_OTS_TYPE_OFFSET,
    PUBLIC_KEY_ROOT_NODE_OFFSET, PUBLIC_KEY_TYPE_OFFSET, Q_LEAF_ID_LEN, SIG_OTS_SIG_OFFSET,
    SIG_Q_LEAF_ID_OFFSET, TYPE_LEN,
};
use crate::lms::error::LmsError;
use crate::lms::hasher::{internal_node, leaf_node};

/// LMS public context: the parameter pair, the key identifier `I` and
/// the Merkle root `T[1]`. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LmsPublicKey {
    params: LmsParameters,
    t1_root: [u8; 32],
}

impl LmsPublicKey {
    pub(crate) fn new(params: LmsParameters, t1_root: [u8; 32]) -> Self {
        Self { params, t1_root }
    }

    pub fn params(&self) -> &LmsParameters {
        &self.params
    }

    pub fn metadata(&self) -> ParameterMetadata {
        self.params.metadata()
    }

    /// The root node value `T[1]`.
    pub fn t1_root(&self) -> &[u8; 32] {
        &self.t1_root
    }

    /// Import a serialised public key:
    /// `lms_type (4) || ots_type (4) || I (16) || T[1] (32)`.
    /// Trailing bytes beyond the 56 are ignored.
    pub fn from_bytes(key: &[u8]) -> Result<Self, LmsError> {
        let needed = config::public_key_len(LmsAlgorithmType::Sha256M32H10);
        if key.len() < needed {
            return Err(LmsError::BufferTooSmall {
                needed,
                got: key.len(),
            });
        }

        let lms_type = LmsAlgorithmType::from_typecode(decode_uint_be(
            TYPE_LEN,
            &key[PUBLIC_KEY_TYPE_OFFSET..],
        ))
        .ok_or(LmsError::BadInput("unsupported LMS algorithm type"))?;
        let ots_type = LmotsAlgorithmType::from_typecode(decode_uint_be(
            OTS_TYPE_LEN,
            &key[PUBLIC_KEY_OTS_TYPE_OFFSET..],
        ))
        .ok_or(LmsError::BadInput("unsupported LM-OTS algorithm type"))?;

        let mut key_id = [0u8; I_KEY_ID_LEN];
        key_id.copy_from_slice(
            &key[PUBLIC_KEY_I_KEY_ID_OFFSET..PUBLIC_KEY_I_KEY_ID_OFFSET + I_KEY_ID_LEN],
        );
        let mut t1_root = [0u8; 32];
        t1_root.copy_from_slice(
            &key[PUBLIC_KEY_ROOT_NODE_OFFSET..PUBLIC_KEY_ROOT_NODE_OFFSET + 32],
        );

        Ok(Self {
            params: LmsParameters::new(lms_type, ots_type, key_id),
            t1_root,
        })
    }

    /// Serialise into `key_out`, returning the number of bytes
    /// written (always 56).
    pub fn write_to(&self, key_out: &mut [u8]) -> Result<usize, LmsError> {
        let needed = config::public_key_len(self.params.lms_type);
        if key_out.len() < needed {
            return Err(LmsError::BufferTooSmall {
                needed,
                got: key_out.len(),
            });
        }

        encode_uint_be(
            self.params.lms_type.typecode(),
            TYPE_LEN,
            &mut key_out[PUBLIC_KEY_TYPE_OFFSET..],
        );
        encode_uint_be(
            self.params.ots_type.typecode(),
            OTS_TYPE_LEN,
            &mut key_out[PUBLIC_KEY_OTS_TYPE_OFFSET..],
        );
        key_out[PUBLIC_KEY_I_KEY_ID_OFFSET..PUBLIC_KEY_I_KEY_ID_OFFSET + I_KEY_ID_LEN]
            .copy_from_slice(&self.params.key_id);
        key_out[PUBLIC_KEY_ROOT_NODE_OFFSET..PUBLIC_KEY_ROOT_NODE_OFFSET + 32]
            .copy_from_slice(&self.t1_root);

        Ok(needed)
    }

    /// Serialise to the exact 56-byte wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; config::public_key_len(self.params.lms_type)];
        self.write_to(&mut out)
            .expect("buffer is sized to the exact key length");
        out
    }

    /// Verify `sig` over `msg` against this public key.
    ///
    /// Framing problems the caller could have checked (wrong overall
    /// length) are `BadInput`; everything learned by looking inside
    /// the signature is `VerifyFailed`.
    pub fn verify(&self, msg: &[u8], sig: &[u8]) -> Result<(), LmsError> {
        if sig.len() != config::signature_len(self.params.lms_type, self.params.ots_type) {
            return Err(LmsError::BadInput("signature length mismatch"));
        }

        let embedded_ots_type = decode_uint_be(OTS_TYPE_LEN, &sig[SIG_OTS_SIG_OFFSET..]);
        if embedded_ots_type != self.params.ots_type.typecode() {
            return Err(LmsError::VerifyFailed);
        }
        let embedded_lms_type = decode_uint_be(
            TYPE_LEN,
            &sig[config::sig_type_offset(self.params.ots_type)..],
        );
        if embedded_lms_type != self.params.lms_type.typecode() {
            return Err(LmsError::VerifyFailed);
        }

        let q_leaf_id = decode_uint_be(Q_LEAF_ID_LEN, &sig[SIG_Q_LEAF_ID_OFFSET..]);
        let leaf_count = self.params.lms_type.leaf_count();
        if q_leaf_id >= leaf_count {
            return Err(LmsError::VerifyFailed);
        }

        // Recover the OTS public key candidate implied by the
        // signature, then climb the tree with the supplied siblings
        let ots_params =
            LmotsParameters::new(self.params.ots_type, self.params.key_id, q_leaf_id);
        let ots_sig_len = self.params.ots_type.signature_len();
        let candidate = LmotsPublicKey::candidate_from_signature(
            &ots_params,
            msg,
            &sig[SIG_OTS_SIG_OFFSET..SIG_OTS_SIG_OFFSET + ots_sig_len],
        )
        .map_err(|err| {
            warn!(error = %err, "ots candidate recovery failed during verification");
            LmsError::VerifyFailed
        })?;

        let mut r_node_idx = leaf_count + q_leaf_id;
        let mut node = leaf_node(&self.params.key_id, r_node_idx, candidate.key_value());

        let path_offset = config::sig_path_offset(self.params.ots_type);
        let m = self.params.lms_type.node_bytes();
        for h in 0..self.params.lms_type.tree_height() as usize {
            let mut sibling = [0u8; 32];
            sibling.copy_from_slice(&sig[path_offset + h * m..path_offset + (h + 1) * m]);

            node = if r_node_idx & 1 == 1 {
                internal_node(&self.params.key_id, r_node_idx / 2, &sibling, &node)
            } else {
                internal_node(&self.params.key_id, r_node_idx / 2, &node, &sibling)
            };
            r_node_idx /= 2;
        }

        if bool::from(node[..].ct_eq(&self.t1_root[..])) {
            Ok(())
        } else {
            Err(LmsError::VerifyFailed)
        }
    }
}
