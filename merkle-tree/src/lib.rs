//! Sorted-pair Keccak-256 merkle tree used to commit WIN allowlists.
//!
//! The tree is built off-ledger by whoever assembles the allowlist; only the
//! 32-byte root is stored on-ledger. Claimants later present a proof that is
//! folded back into the root with [`verify_proof`].
//!
//! ## Construction rules
//!
//! 1. Every leaf is hashed with a caller-chosen domain prefix ([`hash_leaf`]).
//! 2. Leaf hashes are sorted and de-duplicated before the first level is
//!    formed, so the root does not depend on input order.
//! 3. Two children are combined by hashing the smaller one first
//!    ([`hash_pair`]); a proof therefore carries no left/right flags.
//! 4. An odd node at the end of a level is promoted unchanged.

#![allow(clippy::arithmetic_side_effects)]

pub mod merkle_tree;

pub use merkle_tree::{hash_leaf, hash_pair, hashv, verify_proof, MerkleHash, MerkleTree, HASH_BYTES};
