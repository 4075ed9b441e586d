//! Hash adapters for the Merkle engine.
//!
//! The module fixes the two hook points every tree is built from:
//!
//! * **Leaf hashing:** the [`LeafHasher`] trait turns a raw value into its
//!   32-byte leaf digest. The standard scheme double-hashes the ABI-encoded
//!   tuple (`keccak256(keccak256(abi.encode(...)))`); the inner-outer double
//!   hash prevents a 64-byte leaf being mistaken for the concatenation of two
//!   internal children. The simple scheme passes an already 32-byte value
//!   through unchanged.
//! * **Node hashing:** a [`NodeHashFn`] combines two child digests. The
//!   default, [`commutative_keccak256`], hashes the lexicographically sorted
//!   concatenation of the pair so that the order in which a verifier supplies
//!   siblings is irrelevant, matching the on-chain `MerkleProof` helpers.

pub mod abi;

use alloy_dyn_abi::DynSolType;
use alloy_primitives::{keccak256, B256};
use serde_json::Value;

use crate::error::MerkleResult;

/// Pair-hash hook producing an internal node's digest from its two children.
pub type NodeHashFn = fn(&B256, &B256) -> B256;

/// keccak256 of the lexicographically sorted concatenation of the pair.
///
/// Commutative in its arguments: `hash(a, b) == hash(b, a)`.
pub fn commutative_keccak256(a: &B256, b: &B256) -> B256 {
    let mut buffer = [0u8; 64];
    if a.as_slice() <= b.as_slice() {
        buffer[..32].copy_from_slice(a.as_slice());
        buffer[32..].copy_from_slice(b.as_slice());
    } else {
        buffer[..32].copy_from_slice(b.as_slice());
        buffer[32..].copy_from_slice(a.as_slice());
    }
    keccak256(buffer)
}

/// Leaf digest for the standard scheme: the double keccak-256 of the
/// ABI-encoded tuple.
pub fn standard_leaf_hash(encoding: &[DynSolType], value: &[Value]) -> MerkleResult<B256> {
    let encoded = abi::encode_leaf(encoding, value)?;
    Ok(keccak256(keccak256(encoded)))
}

/// Hash abstraction turning a raw value into its leaf digest.
pub trait LeafHasher<V> {
    fn leaf_hash(&self, value: &V) -> MerkleResult<B256>;
}

/// Leaf hasher for ABI-encoded tuples.
#[derive(Clone, Debug)]
pub struct StandardLeafHasher {
    encoding: Vec<DynSolType>,
}

impl StandardLeafHasher {
    pub fn new(encoding: Vec<DynSolType>) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> &[DynSolType] {
        &self.encoding
    }
}

impl LeafHasher<Vec<Value>> for StandardLeafHasher {
    fn leaf_hash(&self, value: &Vec<Value>) -> MerkleResult<B256> {
        standard_leaf_hash(&self.encoding, value)
    }
}

/// Leaf hasher for caller-supplied 32-byte values: a validated pass-through.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleLeafHasher;

impl LeafHasher<B256> for SimpleLeafHasher {
    fn leaf_hash(&self, value: &B256) -> MerkleResult<B256> {
        Ok(*value)
    }
}
