//! Core Merkle engine operating on flat node arrays.
//!
//! The module fixes the following layout and algorithms:
//!
//! * **Layout:** a complete binary tree of `2L - 1` digests with the root at
//!   index 0, children of `i` at `2i + 1` and `2i + 2`, and the leaves
//!   occupying the tail of the array in reverse input order (input leaf `k`
//!   lands at index `size - 1 - k`).
//! * **Proofs:** a single-leaf proof is the list of sibling digests on the
//!   walk from the leaf to the root; verification folds the proof back into
//!   the implied root.
//! * **Multiproofs:** a `{leaves, proof, proofFlags}` triple in the exact
//!   shape the on-chain `multiProofVerify` helper consumes, generated with a
//!   FIFO work queue over descending leaf indices.
//!
//! The engine has no hashing policy of its own; every operation takes the
//! pair-hash through a [`NodeHashFn`](crate::hash::NodeHashFn) argument.

mod multiproof;
mod proof;
mod render;
mod tree;

pub use multiproof::{get_multi_proof, process_multi_proof, MultiProof};
pub use proof::{get_proof, process_proof};
pub use render::render_merkle_tree;
pub use tree::{is_valid_merkle_tree, make_merkle_tree};
