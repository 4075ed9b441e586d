use std::collections::VecDeque;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::error::{MerkleError, MerkleResult};
use crate::hash::NodeHashFn;

use super::tree::{check_leaf_node, parent_index, sibling_index};

/// Compact witness for a set of leaves, in the exact shape the on-chain
/// `multiProofVerify` helper consumes.
///
/// `leaves` holds what is being proven, in the order verification consumes
/// it; `proof` holds the sibling digests not derivable from `leaves`;
/// `proof_flags` encodes the merge decisions (true pairs with the next
/// queued leaf or inner node, false pairs with the next proof digest). For a
/// well-formed multiproof `|proof_flags| == |leaves| + |proof| - 1`.
///
/// The engine produces digests in `leaves`; the tree facade re-maps them to
/// the original values before handing the witness to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiProof<L> {
    pub leaves: Vec<L>,
    pub proof: Vec<B256>,
    #[serde(rename = "proofFlags")]
    pub proof_flags: Vec<bool>,
}

/// Generates a multiproof for the given leaf tree-indices.
///
/// Indices must address leaves and be pairwise distinct. The work queue is
/// seeded with the indices sorted descending (deepest first) and parents are
/// pushed back at the tail, so entries surface level by level; a plain FIFO
/// queue preserves that order without re-sorting.
pub fn get_multi_proof(tree: &[B256], indices: &[usize]) -> MerkleResult<MultiProof<B256>> {
    if tree.is_empty() {
        return Err(MerkleError::invalid_argument("Expected non-empty tree"));
    }
    for &index in indices {
        check_leaf_node(tree.len(), index)?;
    }

    let mut sorted = indices.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    for pair in sorted.windows(2) {
        if pair[0] == pair[1] {
            return Err(MerkleError::invalid_argument(
                "Cannot prove duplicated index",
            ));
        }
    }

    let mut queue: VecDeque<usize> = sorted.iter().copied().collect();
    let mut proof = Vec::new();
    let mut proof_flags = Vec::new();

    while let Some(&head) = queue.front() {
        if head == 0 {
            break;
        }
        queue.pop_front();
        let sibling = sibling_index(head);
        if queue.front() == Some(&sibling) {
            proof_flags.push(true);
            queue.pop_front();
        } else {
            proof_flags.push(false);
            proof.push(tree[sibling]);
        }
        queue.push_back(parent_index(head));
    }

    if indices.is_empty() {
        proof.push(tree[0]);
    }

    Ok(MultiProof {
        leaves: sorted.iter().map(|&index| tree[index]).collect(),
        proof,
        proof_flags,
    })
}

/// Replays a multiproof and returns the implied root.
///
/// Shape violations fail with `InvalidArgument` before any hashing; a
/// structurally inconsistent proof that slips past the shape checks (queue
/// underflow, or anything other than exactly one digest left at the end)
/// fails with `Invariant`.
pub fn process_multi_proof(
    multiproof: &MultiProof<B256>,
    node_hash: NodeHashFn,
) -> MerkleResult<B256> {
    let MultiProof {
        leaves,
        proof,
        proof_flags,
    } = multiproof;

    let proof_consumed = proof_flags.iter().filter(|flag| !**flag).count();
    if proof.len() < proof_consumed {
        return Err(MerkleError::invalid_argument("Invalid multiproof format"));
    }
    if leaves.len() + proof.len() != proof_flags.len() + 1 {
        return Err(MerkleError::invalid_argument(
            "Provided leaves and multiproof are not compatible",
        ));
    }

    let mut stack: VecDeque<B256> = leaves.iter().copied().collect();
    let mut supplied: VecDeque<B256> = proof.iter().copied().collect();

    for &flag in proof_flags {
        let a = stack
            .pop_front()
            .ok_or_else(|| MerkleError::invariant("Multiproof stack underflow"))?;
        let b = if flag {
            stack.pop_front()
        } else {
            supplied.pop_front()
        }
        .ok_or_else(|| MerkleError::invariant("Multiproof stack underflow"))?;
        stack.push_back(node_hash(&a, &b));
    }

    // Exactly one digest across both queues is the implied root.
    match (stack.pop_front(), supplied.pop_front()) {
        (Some(root), None) if stack.is_empty() => Ok(root),
        (None, Some(root)) if supplied.is_empty() => Ok(root),
        _ => Err(MerkleError::invariant("Broken multiproof invariant")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::make_merkle_tree;
    use crate::hash::commutative_keccak256;

    fn tree_of(count: u8) -> Vec<B256> {
        let leaves: Vec<B256> = (1..=count).map(B256::repeat_byte).collect();
        make_merkle_tree(&leaves, commutative_keccak256).unwrap()
    }

    #[test]
    fn round_trips_every_pair_of_a_small_tree() {
        let tree = tree_of(5);
        let leaf_start = tree.len() / 2;
        for first in leaf_start..tree.len() {
            for second in leaf_start..tree.len() {
                if first == second {
                    continue;
                }
                let multiproof = get_multi_proof(&tree, &[first, second]).unwrap();
                let implied = process_multi_proof(&multiproof, commutative_keccak256).unwrap();
                assert_eq!(implied, tree[0]);
            }
        }
    }

    #[test]
    fn empty_index_list_emits_root_as_proof() {
        let tree = tree_of(6);
        let multiproof = get_multi_proof(&tree, &[]).unwrap();
        assert_eq!(multiproof.leaves, Vec::<B256>::new());
        assert_eq!(multiproof.proof, vec![tree[0]]);
        assert_eq!(multiproof.proof_flags, Vec::<bool>::new());
        let implied = process_multi_proof(&multiproof, commutative_keccak256).unwrap();
        assert_eq!(implied, tree[0]);
    }

    #[test]
    fn duplicated_index_is_rejected() {
        let tree = tree_of(4);
        let leaf = tree.len() - 1;
        let err = get_multi_proof(&tree, &[leaf, leaf]).unwrap_err();
        assert_eq!(
            err,
            MerkleError::invalid_argument("Cannot prove duplicated index")
        );
    }

    #[test]
    fn internal_index_is_rejected() {
        let tree = tree_of(4);
        assert!(get_multi_proof(&tree, &[1]).is_err());
    }

    #[test]
    fn shape_checks_fire_before_hashing() {
        let leaf = B256::repeat_byte(0x01);
        let short_proof = MultiProof {
            leaves: vec![leaf, leaf],
            proof: vec![leaf],
            proof_flags: vec![false, false],
        };
        assert_eq!(
            process_multi_proof(&short_proof, commutative_keccak256).unwrap_err(),
            MerkleError::invalid_argument("Invalid multiproof format")
        );

        let incompatible = MultiProof {
            leaves: vec![leaf],
            proof: vec![leaf],
            proof_flags: vec![false, true],
        };
        assert_eq!(
            process_multi_proof(&incompatible, commutative_keccak256).unwrap_err(),
            MerkleError::invalid_argument("Provided leaves and multiproof are not compatible")
        );
    }

    #[test]
    fn underflow_past_shape_checks_is_an_invariant_violation() {
        let leaf = B256::repeat_byte(0x01);
        let multiproof = MultiProof {
            leaves: vec![],
            proof: vec![leaf, leaf],
            proof_flags: vec![true],
        };
        let err = process_multi_proof(&multiproof, commutative_keccak256).unwrap_err();
        assert!(matches!(err, MerkleError::Invariant(_)));
    }
}
