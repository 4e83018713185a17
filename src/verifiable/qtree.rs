//! QTree: a full binary Merkle tree over XSet membership bits, used to let
//! the server authenticate its cross-filtering results against a root hash
//! the client can hold onto across versions.

use std::convert::TryInto;

use sha3::{Digest, Sha3_256};

use crate::error::{NomosError, Result};

fn leaf_hash(index: u64, bit: bool) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(b"0");
    hasher.update(index.to_be_bytes());
    hasher.update([bit as u8]);
    hasher.finalize().into()
}

fn internal_hash(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(b"1");
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Maps an arbitrary address to a stable leaf index in `0..capacity`.
fn address_to_index(address: &[u8], capacity: u64) -> u64 {
    let digest = Sha3_256::digest(address);
    let n = u64::from_be_bytes(digest[0..8].try_into().expect("8 bytes"));
    n % capacity
}

/// A full binary Merkle tree over `2^h >= capacity` leaves, tracking a
/// monotonically increasing version on every mutation.
#[derive(Debug, Clone)]
pub struct QTree {
    height: u32,
    capacity: u64,
    bits: Vec<bool>,
    levels: Vec<Vec<[u8; 32]>>,
    version: u64,
}

impl QTree {
    /// `initialize(bits)`: pads to `2^h` with zeros and builds bottom-up.
    pub fn initialize(bits: &[bool]) -> Result<Self> {
        if bits.is_empty() {
            return Err(NomosError::InitError {
                reason: "QTree requires a non-empty bit array".into(),
            });
        }
        let height = (bits.len() as u64).next_power_of_two().trailing_zeros();
        let capacity = 1u64 << height;

        let mut padded = bits.to_vec();
        padded.resize(capacity as usize, false);

        let mut leaves = Vec::with_capacity(capacity as usize);
        for (idx, bit) in padded.iter().enumerate() {
            leaves.push(leaf_hash(idx as u64, *bit));
        }

        let mut levels = vec![leaves];
        while levels.last().unwrap().len() > 1 {
            let prev = levels.last().unwrap();
            let next = prev
                .chunks(2)
                .map(|pair| internal_hash(&pair[0], &pair[1]))
                .collect();
            levels.push(next);
        }

        Ok(QTree {
            height,
            capacity,
            bits: padded,
            levels,
            version: 1,
        })
    }

    /// Tree height `h`, i.e. `log2(capacity)`.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Leaf capacity `2^h`.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Current version, incremented once per `update_bit` call.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The current root hash `R_X^{(t)}`.
    pub fn root(&self) -> [u8; 32] {
        self.levels.last().unwrap()[0]
    }

    fn leaf_index_for(&self, address: &[u8]) -> u64 {
        address_to_index(address, self.capacity)
    }

    /// `updateBit(address, value)`: flips the leaf `address` maps to and
    /// rehashes the path from leaf to root.
    pub fn update_bit(&mut self, address: &[u8], value: bool) {
        let idx = self.leaf_index_for(address) as usize;
        self.bits[idx] = value;
        self.levels[0][idx] = leaf_hash(idx as u64, value);

        let mut cur = idx;
        for level in 0..self.levels.len() - 1 {
            let sibling = cur ^ 1;
            let parent = cur / 2;
            let (left, right) = if cur % 2 == 0 {
                (self.levels[level][cur], self.levels[level][sibling])
            } else {
                (self.levels[level][sibling], self.levels[level][cur])
            };
            self.levels[level + 1][parent] = internal_hash(&left, &right);
            cur = parent;
        }
        self.version += 1;
    }

    /// `generateProof(address)`: the `h` sibling hashes on the root-to-leaf
    /// path, alongside the leaf's own bit value.
    pub fn generate_proof(&self, address: &[u8]) -> Proof {
        let idx = self.leaf_index_for(address);
        let bit = self.bits[idx as usize];
        let mut siblings = Vec::with_capacity(self.height as usize);
        let mut cur = idx as usize;
        for level in 0..self.levels.len() - 1 {
            siblings.push(self.levels[level][cur ^ 1]);
            cur /= 2;
        }
        Proof {
            index: idx,
            bit,
            siblings,
        }
    }

    /// `verifyPath(address, value, proof, root)`. Uses `self.capacity` (not
    /// a height re-derived from the proof's length) so a verifier holding a
    /// stale or mismatched capacity cannot be fooled into accepting a path
    /// of the wrong length.
    pub fn verify_path(&self, address: &[u8], proof: &Proof, root: &[u8; 32]) -> bool {
        let expected_idx = self.leaf_index_for(address);
        if proof.index != expected_idx {
            return false;
        }
        if proof.siblings.len() != self.height as usize {
            return false;
        }

        let mut cur_hash = leaf_hash(proof.index, proof.bit);
        let mut idx = proof.index;
        for sibling in &proof.siblings {
            cur_hash = if idx % 2 == 0 {
                internal_hash(&cur_hash, sibling)
            } else {
                internal_hash(sibling, &cur_hash)
            };
            idx /= 2;
        }
        &cur_hash == root
    }
}

/// An authentication path for one leaf: its bit value plus the sibling
/// hashes needed to fold back up to a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// The leaf index this proof authenticates.
    pub index: u64,
    /// The leaf's bit value.
    pub bit: bool,
    /// Sibling hashes from leaf to root.
    pub siblings: Vec<[u8; 32]>,
}

/// A bundle of proofs authenticating that a candidate's sampled cross-tags
/// are indeed set (positive) or that a single representative address is
/// unset (negative).
#[derive(Debug, Clone)]
pub enum MembershipProof {
    /// `k` paths, each authenticating a `1` bit.
    Positive(Vec<Proof>),
    /// One path authenticating a `0` bit.
    Negative(Proof),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        let tree = QTree::initialize(&[true; 5]).unwrap();
        assert_eq!(tree.capacity(), 8);
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn update_bit_changes_root_and_bumps_version() {
        let mut tree = QTree::initialize(&[false; 4]).unwrap();
        let root_before = tree.root();
        let version_before = tree.version();
        tree.update_bit(b"addr-a", true);
        assert_ne!(tree.root(), root_before);
        assert_eq!(tree.version(), version_before + 1);
    }

    #[test]
    fn proof_verifies_against_current_root() {
        let mut tree = QTree::initialize(&[false; 4]).unwrap();
        tree.update_bit(b"addr-a", true);
        let proof = tree.generate_proof(b"addr-a");
        assert!(proof.bit);
        assert!(tree.verify_path(b"addr-a", &proof, &tree.root()));
    }

    #[test]
    fn proof_fails_against_stale_root() {
        let mut tree = QTree::initialize(&[false; 4]).unwrap();
        let stale_root = tree.root();
        tree.update_bit(b"addr-a", true);
        let proof = tree.generate_proof(b"addr-a");
        assert!(!tree.verify_path(b"addr-a", &proof, &stale_root));
    }

    #[test]
    fn proof_with_wrong_length_is_rejected() {
        let mut tree = QTree::initialize(&[false; 16]).unwrap();
        tree.update_bit(b"addr-a", true);
        let mut proof = tree.generate_proof(b"addr-a");
        proof.siblings.pop();
        assert!(!tree.verify_path(b"addr-a", &proof, &tree.root()));
    }
}
