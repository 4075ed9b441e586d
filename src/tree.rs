//! Tree facade associating a hashed tree with its original values.
//!
//! [`MerkleTree`] is the single generic engine front-end both variants are
//! built on: it owns the flat node array, the original values with their
//! tree positions, and the digest lookup used to resolve values back to
//! leaves. Variants differ only in the leaf hasher they supply and in their
//! dump schema; no runtime polymorphism is involved.

use std::collections::HashMap;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::bytes::compare_bytes;
use crate::core::{
    get_multi_proof, get_proof, is_valid_merkle_tree, make_merkle_tree, process_multi_proof,
    process_proof, render_merkle_tree, MultiProof,
};
use crate::error::{MerkleError, MerkleResult};
use crate::hash::{LeafHasher, NodeHashFn};

/// Construction options shared by both tree variants.
#[derive(Clone, Copy, Debug)]
pub struct TreeOptions {
    /// Sort the hashed leaves ascending by digest before placement.
    ///
    /// Enabled by default so that any verifier rebuilding a multiproof can
    /// match the library-produced order. Disable only when mirroring a tree
    /// that an on-chain contract builds iteratively in insertion order.
    pub sort_leaves: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self { sort_leaves: true }
    }
}

/// One original input value together with the position of its digest in the
/// flat tree. Also the per-value record of the dump format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedValue<V> {
    pub value: V,
    pub tree_index: usize,
}

/// Generic Merkle tree over values of type `V` hashed by `H`.
///
/// Immutable once constructed; every operation is read-only.
#[derive(Debug)]
pub struct MerkleTree<V, H: LeafHasher<V>> {
    tree: Vec<B256>,
    values: Vec<IndexedValue<V>>,
    hash_lookup: HashMap<B256, usize>,
    leaf_hasher: H,
    node_hash: NodeHashFn,
}

impl<V: Clone, H: LeafHasher<V>> MerkleTree<V, H> {
    /// Hashes `values`, optionally sorts the digests, and builds the tree.
    pub fn of(
        values: Vec<V>,
        leaf_hasher: H,
        node_hash: NodeHashFn,
        options: TreeOptions,
    ) -> MerkleResult<Self> {
        let mut hashed = Vec::with_capacity(values.len());
        for (value_index, value) in values.iter().enumerate() {
            hashed.push((value_index, leaf_hasher.leaf_hash(value)?));
        }
        if options.sort_leaves {
            hashed.sort_by(|left, right| compare_bytes(&left.1, &right.1));
        }

        let leaves: Vec<B256> = hashed.iter().map(|entry| entry.1).collect();
        let tree = make_merkle_tree(&leaves, node_hash)?;

        let mut values: Vec<IndexedValue<V>> = values
            .into_iter()
            .map(|value| IndexedValue {
                value,
                tree_index: 0,
            })
            .collect();
        let mut hash_lookup = HashMap::with_capacity(hashed.len());
        for (position, (value_index, digest)) in hashed.iter().enumerate() {
            values[*value_index].tree_index = tree.len() - 1 - position;
            hash_lookup.insert(*digest, *value_index);
        }

        Ok(Self {
            tree,
            values,
            hash_lookup,
            leaf_hasher,
            node_hash,
        })
    }

    /// Reassembles a tree from dumped parts and re-validates it.
    pub fn from_dump_parts(
        tree: Vec<B256>,
        values: Vec<IndexedValue<V>>,
        leaf_hasher: H,
        node_hash: NodeHashFn,
    ) -> MerkleResult<Self> {
        let mut hash_lookup = HashMap::with_capacity(values.len());
        for (value_index, entry) in values.iter().enumerate() {
            hash_lookup.insert(leaf_hasher.leaf_hash(&entry.value)?, value_index);
        }
        let loaded = Self {
            tree,
            values,
            hash_lookup,
            leaf_hasher,
            node_hash,
        };
        loaded.validate()?;
        Ok(loaded)
    }

    /// Root digest: the commitment to the whole tree.
    pub fn root(&self) -> B256 {
        self.tree[0]
    }

    /// Number of values in the tree.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The flat node array, root first. Mirrors the dump layout.
    pub fn tree(&self) -> &[B256] {
        &self.tree
    }

    /// Values in original input order, each with its tree position.
    pub fn indexed_values(&self) -> &[IndexedValue<V>] {
        &self.values
    }

    /// Value at the given input position, if any.
    pub fn at(&self, index: usize) -> Option<&V> {
        self.values.get(index).map(|entry| &entry.value)
    }

    /// Iterates `(index, value)` pairs in original input order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &V)> {
        self.values
            .iter()
            .enumerate()
            .map(|(index, entry)| (index, &entry.value))
    }

    /// Leaf digest of an arbitrary value under this tree's hashing scheme.
    pub fn leaf_hash(&self, value: &V) -> MerkleResult<B256> {
        self.leaf_hasher.leaf_hash(value)
    }

    /// Position of a value in the input sequence, resolved by digest.
    pub fn leaf_lookup(&self, value: &V) -> MerkleResult<usize> {
        let digest = self.leaf_hasher.leaf_hash(value)?;
        self.hash_lookup
            .get(&digest)
            .copied()
            .ok_or_else(|| MerkleError::invalid_argument("Leaf is not in tree"))
    }

    /// Proof for the value at input position `index`.
    pub fn get_proof_by_index(&self, index: usize) -> MerkleResult<Vec<B256>> {
        let entry = self.checked_value(index)?;
        let proof = get_proof(&self.tree, entry.tree_index)?;
        // The proof must fold back into our own root before it leaves the
        // library; a mismatch can only mean a broken hash adapter.
        let implied = process_proof(&self.tree[entry.tree_index], &proof, self.node_hash);
        if implied != self.root() {
            return Err(MerkleError::invariant("Unable to prove value"));
        }
        Ok(proof)
    }

    /// Proof for a value, resolved through the digest lookup.
    pub fn get_proof_by_value(&self, value: &V) -> MerkleResult<Vec<B256>> {
        let index = self.leaf_lookup(value)?;
        self.get_proof_by_index(index)
    }

    /// Multiproof for the values at the given input positions.
    pub fn get_multi_proof_by_indices(&self, indices: &[usize]) -> MerkleResult<MultiProof<V>> {
        let mut tree_indices = Vec::with_capacity(indices.len());
        for &index in indices {
            tree_indices.push(self.checked_value(index)?.tree_index);
        }
        let multiproof = get_multi_proof(&self.tree, &tree_indices)?;
        let implied = process_multi_proof(&multiproof, self.node_hash)?;
        if implied != self.root() {
            return Err(MerkleError::invariant("Unable to prove values"));
        }

        let mut leaves = Vec::with_capacity(multiproof.leaves.len());
        for digest in &multiproof.leaves {
            let value_index = self
                .hash_lookup
                .get(digest)
                .copied()
                .ok_or_else(|| MerkleError::invariant("Unable to prove values"))?;
            leaves.push(self.values[value_index].value.clone());
        }
        Ok(MultiProof {
            leaves,
            proof: multiproof.proof,
            proof_flags: multiproof.proof_flags,
        })
    }

    /// Multiproof for a set of values, resolved through the digest lookup.
    pub fn get_multi_proof_by_values(&self, values: &[V]) -> MerkleResult<MultiProof<V>> {
        let mut indices = Vec::with_capacity(values.len());
        for value in values {
            indices.push(self.leaf_lookup(value)?);
        }
        self.get_multi_proof_by_indices(&indices)
    }

    /// Whether `proof` proves the value at input position `index`.
    pub fn verify_proof_at(&self, index: usize, proof: &[B256]) -> MerkleResult<bool> {
        let entry = self.checked_value(index)?;
        Ok(self.implies_root(self.tree[entry.tree_index], proof))
    }

    /// Whether `proof` proves `value`. Hashing failures count as "no".
    pub fn verify_proof(&self, value: &V, proof: &[B256]) -> bool {
        match self.leaf_hasher.leaf_hash(value) {
            Ok(digest) => self.implies_root(digest, proof),
            Err(_) => false,
        }
    }

    /// Whether the multiproof proves its values against this tree's root.
    pub fn verify_multi_proof(&self, multiproof: &MultiProof<V>) -> MerkleResult<bool> {
        let mut leaves = Vec::with_capacity(multiproof.leaves.len());
        for value in &multiproof.leaves {
            leaves.push(self.leaf_hasher.leaf_hash(value)?);
        }
        let digests = MultiProof {
            leaves,
            proof: multiproof.proof.clone(),
            proof_flags: multiproof.proof_flags.clone(),
        };
        Ok(process_multi_proof(&digests, self.node_hash)? == self.root())
    }

    /// Re-checks every stored value against the tree and the tree's shape.
    pub fn validate(&self) -> MerkleResult<()> {
        for entry in &self.values {
            self.validate_value(entry)?;
        }
        if !is_valid_merkle_tree(&self.tree, self.node_hash) {
            return Err(MerkleError::invariant("Merkle tree is invalid"));
        }
        Ok(())
    }

    /// ASCII diagram of the node array.
    pub fn render(&self) -> MerkleResult<String> {
        render_merkle_tree(&self.tree)
    }

    fn checked_value(&self, index: usize) -> MerkleResult<&IndexedValue<V>> {
        self.values.get(index).ok_or_else(|| {
            MerkleError::invalid_argument(format!("Index {} is out of bounds", index))
        })
    }

    fn implies_root(&self, leaf: B256, proof: &[B256]) -> bool {
        process_proof(&leaf, proof, self.node_hash) == self.root()
    }

    fn validate_value(&self, entry: &IndexedValue<V>) -> MerkleResult<()> {
        let digest = self.leaf_hasher.leaf_hash(&entry.value)?;
        let stored = self.tree.get(entry.tree_index).ok_or_else(|| {
            MerkleError::invalid_argument(format!(
                "Tree index {} is out of bounds",
                entry.tree_index
            ))
        })?;
        if *stored != digest {
            return Err(MerkleError::invariant(
                "Merkle tree does not contain the expected value",
            ));
        }
        Ok(())
    }
}

pub(crate) fn ensure_format(found: &str, expected: &str) -> MerkleResult<()> {
    if found == expected {
        Ok(())
    } else {
        Err(MerkleError::invalid_argument(format!(
            "Unknown format '{}'",
            found
        )))
    }
}

/// Parses a dump from JSON, checking the `format` tag before the full
/// deserialization so format mismatches are reported as such rather than as
/// missing variant fields.
pub(crate) fn parse_dump_json<T: serde::de::DeserializeOwned>(
    raw: &str,
    expected_format: &str,
) -> MerkleResult<T> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|err| MerkleError::invalid_argument(format!("Malformed tree dump: {}", err)))?;
    let found = value
        .get("format")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    ensure_format(found, expected_format)?;
    serde_json::from_value(value)
        .map_err(|err| MerkleError::invalid_argument(format!("Malformed tree dump: {}", err)))
}
