use alloy_primitives::B256;

use crate::error::MerkleResult;
use crate::hash::NodeHashFn;

use super::tree::{check_leaf_node, parent_index, sibling_index};

/// Collects the sibling digests on the walk from a leaf index to the root.
///
/// The returned proof contains neither the leaf itself nor the root. Fails
/// with `InvalidArgument` when `index` does not address a leaf.
pub fn get_proof(tree: &[B256], index: usize) -> MerkleResult<Vec<B256>> {
    check_leaf_node(tree.len(), index)?;

    let mut proof = Vec::new();
    let mut current = index;
    while current > 0 {
        proof.push(tree[sibling_index(current)]);
        current = parent_index(current);
    }
    Ok(proof)
}

/// Folds a proof back into the implied root.
///
/// Each step hashes the next sibling against the accumulator; under the
/// commutative default pair-hash the argument order is irrelevant, so callers
/// never track child positions. A proof is valid for `(root, leaf)` iff the
/// returned digest equals `root`.
pub fn process_proof(leaf: &B256, proof: &[B256], node_hash: NodeHashFn) -> B256 {
    proof
        .iter()
        .fold(*leaf, |acc, sibling| node_hash(sibling, &acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::make_merkle_tree;
    use crate::error::MerkleError;
    use crate::hash::commutative_keccak256;

    fn leaves(count: u8) -> Vec<B256> {
        (1..=count).map(B256::repeat_byte).collect()
    }

    #[test]
    fn proves_every_leaf_of_small_trees() {
        for count in 1..=8u8 {
            let tree = make_merkle_tree(&leaves(count), commutative_keccak256).unwrap();
            for position in 0..count as usize {
                let index = tree.len() - 1 - position;
                let proof = get_proof(&tree, index).unwrap();
                let implied = process_proof(&tree[index], &proof, commutative_keccak256);
                assert_eq!(implied, tree[0]);
            }
        }
    }

    #[test]
    fn single_leaf_proof_is_empty() {
        let tree = make_merkle_tree(&leaves(1), commutative_keccak256).unwrap();
        assert_eq!(get_proof(&tree, 0).unwrap(), Vec::<B256>::new());
    }

    #[test]
    fn rejects_internal_and_out_of_range_indices() {
        let tree = make_merkle_tree(&leaves(4), commutative_keccak256).unwrap();
        for index in [0usize, 1, 2, tree.len(), tree.len() + 7] {
            let err = get_proof(&tree, index).unwrap_err();
            assert!(matches!(err, MerkleError::InvalidArgument(_)));
        }
    }
}
