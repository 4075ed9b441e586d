//! Simple tree variant: leaves are caller-supplied 32-byte values, with an
//! optional custom pair-hash for trees that diverge from the sorted-pair
//! keccak scheme.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::bytes::to_bytes32;
use crate::core::{process_multi_proof, process_proof, MultiProof};
use crate::error::{MerkleError, MerkleResult};
use crate::hash::{commutative_keccak256, NodeHashFn, SimpleLeafHasher};
use crate::tree::{ensure_format, parse_dump_json, IndexedValue, MerkleTree, TreeOptions};

const FORMAT: &str = "simple-v1";
const CUSTOM_HASH_TAG: &str = "custom";

/// Construction options for [`SimpleMerkleTree`].
#[derive(Clone, Copy)]
pub struct SimpleTreeOptions {
    /// Sort the leaves ascending by digest before placement.
    pub sort_leaves: bool,
    /// Replacement pair-hash. Trees built with one carry a `hash: "custom"`
    /// tag in their dump and require the same function again at load time.
    pub node_hash: Option<NodeHashFn>,
}

impl Default for SimpleTreeOptions {
    fn default() -> Self {
        Self {
            sort_leaves: true,
            node_hash: None,
        }
    }
}

/// Serializable form of a [`SimpleMerkleTree`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleMerkleTreeData {
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub tree: Vec<B256>,
    pub values: Vec<IndexedValue<B256>>,
}

/// Merkle tree over raw 32-byte leaves.
#[derive(Debug)]
pub struct SimpleMerkleTree {
    inner: MerkleTree<B256, SimpleLeafHasher>,
    custom_hash: bool,
}

impl SimpleMerkleTree {
    /// Builds a tree from 32-byte leaves; any other width is rejected.
    pub fn of<I, T>(values: I) -> MerkleResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        Self::of_with_options(values, SimpleTreeOptions::default())
    }

    pub fn of_with_options<I, T>(values: I, options: SimpleTreeOptions) -> MerkleResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let values = values
            .into_iter()
            .map(to_bytes32)
            .collect::<MerkleResult<Vec<B256>>>()?;
        let inner = MerkleTree::of(
            values,
            SimpleLeafHasher,
            options.node_hash.unwrap_or(commutative_keccak256),
            TreeOptions {
                sort_leaves: options.sort_leaves,
            },
        )?;
        Ok(Self {
            inner,
            custom_hash: options.node_hash.is_some(),
        })
    }

    /// Reassembles a tree from its dump, re-validating everything.
    ///
    /// A dump tagged `hash: "custom"` must be loaded with the same pair-hash
    /// it was built with; an untagged dump must be loaded without one.
    pub fn load(data: SimpleMerkleTreeData, node_hash: Option<NodeHashFn>) -> MerkleResult<Self> {
        ensure_format(&data.format, FORMAT)?;
        let custom_hash = match (data.hash.as_deref(), node_hash) {
            (Some(CUSTOM_HASH_TAG), Some(_)) => true,
            (Some(CUSTOM_HASH_TAG), None) => {
                return Err(MerkleError::invalid_argument(
                    "Format 'simple-v1' with custom hashing requires a node hash function",
                ))
            }
            (Some(other), _) => {
                return Err(MerkleError::invalid_argument(format!(
                    "Unexpected hash '{}'",
                    other
                )))
            }
            (None, Some(_)) => {
                return Err(MerkleError::invalid_argument(
                    "Format 'simple-v1' does not expect a node hash function",
                ))
            }
            (None, None) => false,
        };
        let inner = MerkleTree::from_dump_parts(
            data.tree,
            data.values,
            SimpleLeafHasher,
            node_hash.unwrap_or(commutative_keccak256),
        )?;
        Ok(Self { inner, custom_hash })
    }

    /// Parses a JSON dump and loads it.
    pub fn load_json(raw: &str, node_hash: Option<NodeHashFn>) -> MerkleResult<Self> {
        Self::load(parse_dump_json(raw, FORMAT)?, node_hash)
    }

    /// Checks a single proof without building a tree, as the on-chain
    /// `verify` helper would. A non-32-byte leaf counts as "does not verify".
    pub fn verify(root: B256, leaf: impl AsRef<[u8]>, proof: &[B256]) -> bool {
        Self::verify_with_node_hash(root, leaf, proof, commutative_keccak256)
    }

    pub fn verify_with_node_hash(
        root: B256,
        leaf: impl AsRef<[u8]>,
        proof: &[B256],
        node_hash: NodeHashFn,
    ) -> bool {
        match to_bytes32(leaf) {
            Ok(digest) => process_proof(&digest, proof, node_hash) == root,
            Err(_) => false,
        }
    }

    /// Checks a multiproof without building a tree, as the on-chain
    /// `multiProofVerify` helper would.
    pub fn multi_proof_verify(root: B256, multiproof: &MultiProof<B256>) -> MerkleResult<bool> {
        Self::multi_proof_verify_with_node_hash(root, multiproof, commutative_keccak256)
    }

    pub fn multi_proof_verify_with_node_hash(
        root: B256,
        multiproof: &MultiProof<B256>,
        node_hash: NodeHashFn,
    ) -> MerkleResult<bool> {
        Ok(process_multi_proof(multiproof, node_hash)? == root)
    }

    pub fn root(&self) -> B256 {
        self.inner.root()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The flat node array, root first.
    pub fn tree(&self) -> &[B256] {
        self.inner.tree()
    }

    pub fn at(&self, index: usize) -> Option<&B256> {
        self.inner.at(index)
    }

    pub fn entries(&self) -> impl Iterator<Item = (usize, &B256)> {
        self.inner.entries()
    }

    /// Leaf digest of an arbitrary 32-byte value: the validated pass-through.
    pub fn leaf_hash(&self, value: impl AsRef<[u8]>) -> MerkleResult<B256> {
        self.inner.leaf_hash(&to_bytes32(value)?)
    }

    /// Input position of a leaf, resolved by digest.
    pub fn leaf_lookup(&self, value: impl AsRef<[u8]>) -> MerkleResult<usize> {
        self.inner.leaf_lookup(&to_bytes32(value)?)
    }

    pub fn get_proof_by_index(&self, index: usize) -> MerkleResult<Vec<B256>> {
        self.inner.get_proof_by_index(index)
    }

    pub fn get_proof_by_value(&self, value: impl AsRef<[u8]>) -> MerkleResult<Vec<B256>> {
        self.inner.get_proof_by_value(&to_bytes32(value)?)
    }

    pub fn get_multi_proof_by_indices(&self, indices: &[usize]) -> MerkleResult<MultiProof<B256>> {
        self.inner.get_multi_proof_by_indices(indices)
    }

    pub fn get_multi_proof_by_values<I, T>(&self, values: I) -> MerkleResult<MultiProof<B256>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let values = values
            .into_iter()
            .map(to_bytes32)
            .collect::<MerkleResult<Vec<B256>>>()?;
        self.inner.get_multi_proof_by_values(&values)
    }

    /// Whether `proof` proves the leaf at input position `index`.
    pub fn verify_proof_at(&self, index: usize, proof: &[B256]) -> MerkleResult<bool> {
        self.inner.verify_proof_at(index, proof)
    }

    /// Whether `proof` proves `value` against this tree's root.
    pub fn verify_proof(&self, value: impl AsRef<[u8]>, proof: &[B256]) -> bool {
        match to_bytes32(value) {
            Ok(digest) => self.inner.verify_proof(&digest, proof),
            Err(_) => false,
        }
    }

    pub fn verify_multi_proof(&self, multiproof: &MultiProof<B256>) -> MerkleResult<bool> {
        self.inner.verify_multi_proof(multiproof)
    }

    /// Serializable snapshot of the tree in input order.
    pub fn dump(&self) -> SimpleMerkleTreeData {
        SimpleMerkleTreeData {
            format: FORMAT.to_owned(),
            hash: self
                .custom_hash
                .then(|| CUSTOM_HASH_TAG.to_owned()),
            tree: self.inner.tree().to_vec(),
            values: self.inner.indexed_values().to_vec(),
        }
    }

    pub fn dump_json(&self) -> MerkleResult<String> {
        serde_json::to_string(&self.dump())
            .map_err(|err| MerkleError::invariant(format!("Unable to serialize dump: {}", err)))
    }

    /// Re-checks every stored leaf and the tree shape.
    pub fn validate(&self) -> MerkleResult<()> {
        self.inner.validate()
    }

    /// ASCII diagram of the node array.
    pub fn render(&self) -> MerkleResult<String> {
        self.inner.render()
    }
}
