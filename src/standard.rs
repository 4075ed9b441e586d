//! Standard tree variant: leaves are the double keccak-256 of ABI-encoded
//! tuples, the scheme airdrop contracts and the `MerkleProof` helpers expect.
//!
//! Values are JSON rows next to an array of Solidity type strings (the leaf
//! encoding). The encoding is part of the tree's identity and travels with
//! the dump.

use alloy_dyn_abi::DynSolType;
use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{process_multi_proof, process_proof, MultiProof};
use crate::error::{MerkleError, MerkleResult};
use crate::hash::{abi, commutative_keccak256, standard_leaf_hash, StandardLeafHasher};
use crate::tree::{ensure_format, parse_dump_json, IndexedValue, MerkleTree, TreeOptions};

const FORMAT: &str = "standard-v1";

/// Serializable form of a [`StandardMerkleTree`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardMerkleTreeData {
    pub format: String,
    pub leaf_encoding: Vec<String>,
    pub tree: Vec<B256>,
    pub values: Vec<IndexedValue<Vec<Value>>>,
}

/// Merkle tree over ABI-encoded tuple leaves.
#[derive(Debug)]
pub struct StandardMerkleTree {
    inner: MerkleTree<Vec<Value>, StandardLeafHasher>,
    leaf_encoding: Vec<String>,
    parsed_encoding: Vec<DynSolType>,
}

impl StandardMerkleTree {
    /// Builds a tree from JSON rows and their Solidity leaf encoding.
    pub fn of<S: AsRef<str>>(values: Vec<Vec<Value>>, leaf_encoding: &[S]) -> MerkleResult<Self> {
        Self::of_with_options(values, leaf_encoding, TreeOptions::default())
    }

    pub fn of_with_options<S: AsRef<str>>(
        values: Vec<Vec<Value>>,
        leaf_encoding: &[S],
        options: TreeOptions,
    ) -> MerkleResult<Self> {
        let leaf_encoding: Vec<String> = leaf_encoding
            .iter()
            .map(|ty| ty.as_ref().to_owned())
            .collect();
        let parsed_encoding = abi::parse_encoding(&leaf_encoding)?;
        let inner = MerkleTree::of(
            values,
            StandardLeafHasher::new(parsed_encoding.clone()),
            commutative_keccak256,
            options,
        )?;
        Ok(Self {
            inner,
            leaf_encoding,
            parsed_encoding,
        })
    }

    /// Reassembles a tree from its dump, re-validating everything.
    pub fn load(data: StandardMerkleTreeData) -> MerkleResult<Self> {
        ensure_format(&data.format, FORMAT)?;
        let parsed_encoding = abi::parse_encoding(&data.leaf_encoding)?;
        let inner = MerkleTree::from_dump_parts(
            data.tree,
            data.values,
            StandardLeafHasher::new(parsed_encoding.clone()),
            commutative_keccak256,
        )?;
        Ok(Self {
            inner,
            leaf_encoding: data.leaf_encoding,
            parsed_encoding,
        })
    }

    /// Parses a JSON dump and loads it.
    pub fn load_json(raw: &str) -> MerkleResult<Self> {
        Self::load(parse_dump_json(raw, FORMAT)?)
    }

    /// Checks a single proof without building a tree, as the on-chain
    /// `verify` helper would. Malformed values count as "does not verify".
    pub fn verify<S: AsRef<str>>(
        root: B256,
        leaf_encoding: &[S],
        value: &[Value],
        proof: &[B256],
    ) -> bool {
        let leaf = abi::parse_encoding(leaf_encoding)
            .and_then(|types| standard_leaf_hash(&types, value));
        match leaf {
            Ok(leaf) => process_proof(&leaf, proof, commutative_keccak256) == root,
            Err(_) => false,
        }
    }

    /// Checks a multiproof without building a tree, as the on-chain
    /// `multiProofVerify` helper would.
    pub fn multi_proof_verify<S: AsRef<str>>(
        root: B256,
        leaf_encoding: &[S],
        multiproof: &MultiProof<Vec<Value>>,
    ) -> MerkleResult<bool> {
        let types = abi::parse_encoding(leaf_encoding)?;
        let mut leaves = Vec::with_capacity(multiproof.leaves.len());
        for value in &multiproof.leaves {
            leaves.push(standard_leaf_hash(&types, value)?);
        }
        let digests = MultiProof {
            leaves,
            proof: multiproof.proof.clone(),
            proof_flags: multiproof.proof_flags.clone(),
        };
        Ok(process_multi_proof(&digests, commutative_keccak256)? == root)
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

    /// The Solidity type strings the leaves are encoded with.
    pub fn leaf_encoding(&self) -> &[String] {
        &self.leaf_encoding
    }

    /// The flat node array, root first.
    pub fn tree(&self) -> &[B256] {
        self.inner.tree()
    }

    pub fn at(&self, index: usize) -> Option<&Vec<Value>> {
        self.inner.at(index)
    }

    pub fn entries(&self) -> impl Iterator<Item = (usize, &Vec<Value>)> {
        self.inner.entries()
    }

    /// Leaf digest of an arbitrary row under this tree's encoding.
    pub fn leaf_hash(&self, value: &[Value]) -> MerkleResult<B256> {
        standard_leaf_hash(&self.parsed_encoding, value)
    }

    /// Input position of a row, resolved by digest.
    pub fn leaf_lookup(&self, value: &[Value]) -> MerkleResult<usize> {
        self.inner.leaf_lookup(&value.to_vec())
    }

    pub fn get_proof_by_index(&self, index: usize) -> MerkleResult<Vec<B256>> {
        self.inner.get_proof_by_index(index)
    }

    pub fn get_proof_by_value(&self, value: &[Value]) -> MerkleResult<Vec<B256>> {
        self.inner.get_proof_by_value(&value.to_vec())
    }

    pub fn get_multi_proof_by_indices(
        &self,
        indices: &[usize],
    ) -> MerkleResult<MultiProof<Vec<Value>>> {
        self.inner.get_multi_proof_by_indices(indices)
    }

    pub fn get_multi_proof_by_values(
        &self,
        values: &[Vec<Value>],
    ) -> MerkleResult<MultiProof<Vec<Value>>> {
        self.inner.get_multi_proof_by_values(values)
    }

    /// Whether `proof` proves the row at input position `index`.
    pub fn verify_proof_at(&self, index: usize, proof: &[B256]) -> MerkleResult<bool> {
        self.inner.verify_proof_at(index, proof)
    }

    /// Whether `proof` proves `value` against this tree's root.
    pub fn verify_proof(&self, value: &[Value], proof: &[B256]) -> bool {
        self.inner.verify_proof(&value.to_vec(), proof)
    }

    pub fn verify_multi_proof(&self, multiproof: &MultiProof<Vec<Value>>) -> MerkleResult<bool> {
        self.inner.verify_multi_proof(multiproof)
    }

    /// Serializable snapshot of the tree in input order.
    pub fn dump(&self) -> StandardMerkleTreeData {
        StandardMerkleTreeData {
            format: FORMAT.to_owned(),
            leaf_encoding: self.leaf_encoding.clone(),
            tree: self.inner.tree().to_vec(),
            values: self.inner.indexed_values().to_vec(),
        }
    }

    pub fn dump_json(&self) -> MerkleResult<String> {
        serde_json::to_string(&self.dump())
            .map_err(|err| MerkleError::invariant(format!("Unable to serialize dump: {}", err)))
    }

    /// Re-checks every stored row and the tree shape.
    pub fn validate(&self) -> MerkleResult<()> {
        self.inner.validate()
    }

    /// ASCII diagram of the node array.
    pub fn render(&self) -> MerkleResult<String> {
        self.inner.render()
    }
}
