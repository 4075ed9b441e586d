#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

//! Merkle trees over keccak-256 digests whose proofs verify bit-identically
//! against the `MerkleProof` helpers deployed in Ethereum smart contracts.
//!
//! Two variants share a single engine:
//!
//! * [`StandardMerkleTree`] hashes each leaf as the double keccak-256 of an
//!   ABI-encoded tuple, the scheme airdrop and allowlist contracts expect.
//! * [`SimpleMerkleTree`] takes caller-supplied 32-byte leaves and optionally
//!   a custom pair-hash.
//!
//! Internal nodes are hashed as the keccak-256 of the lexicographically
//! sorted concatenation of their children, so verifiers never track child
//! order. Trees are immutable once built, serialize to a stable JSON dump,
//! and re-validate themselves on load.
//!
//! ```
//! use evm_merkle::StandardMerkleTree;
//! use serde_json::json;
//!
//! let values = vec![
//!     vec![json!("0x1111111111111111111111111111111111111111"), json!(100u64)],
//!     vec![json!("0x2222222222222222222222222222222222222222"), json!(200u64)],
//! ];
//! let tree = StandardMerkleTree::of(values.clone(), &["address", "uint256"]).unwrap();
//! let proof = tree.get_proof_by_value(&values[0]).unwrap();
//! assert!(StandardMerkleTree::verify(
//!     tree.root(),
//!     &["address", "uint256"],
//!     &values[0],
//!     &proof,
//! ));
//! ```

pub mod bytes;
pub mod core;
pub mod error;
pub mod hash;
pub mod simple;
pub mod standard;
pub mod tree;

pub use alloy_primitives::B256;

pub use self::core::MultiProof;
pub use error::{MerkleError, MerkleResult};
pub use hash::{commutative_keccak256, standard_leaf_hash, LeafHasher, NodeHashFn};
pub use simple::{SimpleMerkleTree, SimpleMerkleTreeData, SimpleTreeOptions};
pub use standard::{StandardMerkleTree, StandardMerkleTreeData};
pub use tree::{IndexedValue, MerkleTree, TreeOptions};
