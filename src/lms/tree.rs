// Deterministic construction of the full Merkle node array
//
// The array is 1-indexed: node 1 is the root, nodes [2^H, 2^(H+1))
// are the leaves, index 0 is never used. Internal nodes are filled in
// descending index order so both children exist before their parent.

use crate::lmots::LmotsPublicKey;
use crate::lms::config::LmsParameters;
use crate::lms::hasher::{internal_node, leaf_node};

/// Full `2^(H+1)` node array, heap-allocated (64 KiB for H=10).
pub(crate) struct MerkleTree {
    nodes: Vec<[u8; 32]>,
    leaf_count: u32,
    tree_height: u32,
}

impl MerkleTree {
    /// Build the whole tree from the ordered OTS public keys.
    /// `ots_public_keys[i]` becomes leaf `2^H + i`.
    pub fn build(params: &LmsParameters, ots_public_keys: &[LmotsPublicKey]) -> Self {
        let leaf_count = params.lms_type.leaf_count();
        let node_count = params.lms_type.node_count();
        debug_assert_eq!(ots_public_keys.len(), leaf_count as usize);

        let mut nodes = vec![[0u8; 32]; node_count as usize];

        for (i, ots_pub) in ots_public_keys.iter().enumerate() {
            let r_node_idx = leaf_count + i as u32;
            nodes[r_node_idx as usize] =
                leaf_node(&params.key_id, r_node_idx, ots_pub.key_value());
        }

        for r_node_idx in (1..leaf_count).rev() {
            let left = nodes[(r_node_idx * 2) as usize];
            let right = nodes[(r_node_idx * 2 + 1) as usize];
            nodes[r_node_idx as usize] =
                internal_node(&params.key_id, r_node_idx, &left, &right);
        }

        Self {
            nodes,
            leaf_count,
            tree_height: params.lms_type.tree_height(),
        }
    }

    /// `T[1]`, the LMS public key value.
    pub fn root(&self) -> &[u8; 32] {
        &self.nodes[1]
    }

    /// The `H` sibling values climbing from leaf `q` to the root,
    /// ascending height: `(2^H + q) ^ 1`, `((2^H + q) / 2) ^ 1`, ...
    pub fn authentication_path(&self, q_leaf_id: u32) -> Vec<[u8; 32]> {
        debug_assert!(q_leaf_id < self.leaf_count);

        let mut path = Vec::with_capacity(self.tree_height as usize);
        let mut r_node_idx = self.leaf_count + q_leaf_id;
        for _ in 0..self.tree_height {
            path.push(self.nodes[(r_node_idx ^ 1) as usize]);
            r_node_idx >>= 1;
        }
        path
    }
}
