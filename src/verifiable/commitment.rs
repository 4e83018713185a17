//! AddressCommitment: a hash commitment over an update's full cross-tag
//! set, stored alongside its TSet entry so the server can later prove it
//! opened the right xtags without the client re-deriving them.

use sha3::{Digest, Sha3_256};

use crate::error::{NomosError, Result};

/// `H_c(xtag_1 || … || xtag_ℓ)`.
pub fn commit(xtags: &[Vec<u8>]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    for xtag in xtags {
        hasher.update(xtag);
    }
    hasher.finalize().into()
}

/// `verify(commitment, xtags)`: recomputes and compares.
pub fn verify(commitment: &[u8; 32], xtags: &[Vec<u8>]) -> bool {
    &commit(xtags) == commitment
}

/// `checkSubsetMembership(sampled, β_indices, full)`: verifies that each
/// `sampled[t]` equals `full[β_indices[t] - 1]` (β is 1-indexed). Rejects on
/// length mismatch or an out-of-range β.
pub fn check_subset_membership(sampled: &[Vec<u8>], beta_indices: &[u64], full: &[Vec<u8>]) -> Result<bool> {
    if sampled.len() != beta_indices.len() {
        return Err(NomosError::CryptoError {
            reason: "sampled and beta_indices must have the same length".into(),
        });
    }
    for (sample, beta) in sampled.iter().zip(beta_indices) {
        if *beta == 0 || *beta as usize > full.len() {
            return Err(NomosError::CryptoError {
                reason: format!("beta index {beta} out of range for {} xtags", full.len()),
            });
        }
        if sample != &full[(*beta - 1) as usize] {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commitment_round_trips() {
        let xtags = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]];
        let c = commit(&xtags);
        assert!(verify(&c, &xtags));
    }

    #[test]
    fn commitment_rejects_tampered_xtags() {
        let xtags = vec![vec![1, 2, 3], vec![4, 5, 6]];
        let c = commit(&xtags);
        let tampered = vec![vec![1, 2, 3], vec![9, 9, 9]];
        assert!(!verify(&c, &tampered));
    }

    #[test]
    fn subset_membership_accepts_matching_sample() {
        let full = vec![vec![1], vec![2], vec![3]];
        let sampled = vec![full[1].clone()];
        assert!(check_subset_membership(&sampled, &[2], &full).unwrap());
    }

    #[test]
    fn subset_membership_rejects_mismatch() {
        let full = vec![vec![1], vec![2], vec![3]];
        let sampled = vec![vec![9]];
        assert!(!check_subset_membership(&sampled, &[2], &full).unwrap());
    }

    #[test]
    fn subset_membership_rejects_out_of_range_beta() {
        let full = vec![vec![1], vec![2]];
        let sampled = vec![vec![1]];
        assert!(check_subset_membership(&sampled, &[5], &full).is_err());
        assert!(check_subset_membership(&sampled, &[0], &full).is_err());
    }

    #[test]
    fn subset_membership_rejects_length_mismatch() {
        let full = vec![vec![1], vec![2]];
        assert!(check_subset_membership(&[vec![1]], &[1, 2], &full).is_err());
    }
}
