//! Ties QTree and AddressCommitment to the base TSet/XSet storage: a
//! server that can, on request, open an update's full cross-tag set and
//! prove it against both a commitment and the current QTree root.

use std::collections::HashMap;

use crate::core::server::Server;
use crate::core::types::UpdateMetadata;
use crate::error::{NomosError, Result};

use super::commitment::{check_subset_membership, commit, verify as verify_commitment};
use super::qtree::{Proof, QTree};

/// A server augmented with per-address commitments and a QTree over XSet
/// membership, so every opened entry can be authenticated.
#[derive(Debug)]
pub struct VerifiableServer {
    server: Server,
    qtree: QTree,
    commitments: HashMap<Vec<u8>, [u8; 32]>,
    xtags_by_addr: HashMap<Vec<u8>, Vec<Vec<u8>>>,
}

impl VerifiableServer {
    /// Builds a verifiable server whose QTree has room for `capacity`
    /// distinct cross-tags (rounded up to a power of two).
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(VerifiableServer {
            server: Server::new(),
            qtree: QTree::initialize(&vec![false; capacity.max(1)])?,
            commitments: HashMap::new(),
            xtags_by_addr: HashMap::new(),
        })
    }

    /// The underlying (non-verifiable) TSet/XSet server, for plain search.
    pub fn server(&self) -> &Server {
        &self.server
    }

    /// The current QTree root, `R_X^{(t)}`.
    pub fn root(&self) -> [u8; 32] {
        self.qtree.root()
    }

    /// Applies an update: stores it in the base server, records its address
    /// commitment, and flips the QTree bit for each of its cross-tags.
    pub fn update(&mut self, meta: &UpdateMetadata) {
        self.server.update(meta);
        self.commitments.insert(meta.addr.clone(), commit(&meta.xtags));
        self.xtags_by_addr.insert(meta.addr.clone(), meta.xtags.clone());
        for xtag in &meta.xtags {
            self.qtree.update_bit(xtag, true);
        }
    }

    /// Opens the full cross-tag set for `addr` along with QTree proofs for
    /// the given (1-indexed) β positions, for the client to authenticate.
    pub fn open(&self, addr: &[u8], beta_indices: &[u64]) -> Result<OpenedEntry> {
        let xtags = self
            .xtags_by_addr
            .get(addr)
            .ok_or_else(|| NomosError::CryptoError {
                reason: "no such address in the verifiable index".into(),
            })?;
        let mut proofs = Vec::with_capacity(beta_indices.len());
        let mut sampled = Vec::with_capacity(beta_indices.len());
        for beta in beta_indices {
            if *beta == 0 || *beta as usize > xtags.len() {
                return Err(NomosError::CryptoError {
                    reason: format!("beta index {beta} out of range for {} xtags", xtags.len()),
                });
            }
            let xtag = &xtags[(*beta - 1) as usize];
            proofs.push(self.qtree.generate_proof(xtag));
            sampled.push(xtag.clone());
        }
        Ok(OpenedEntry {
            xtags: xtags.clone(),
            sampled,
            proofs,
        })
    }

    /// The commitment stored for `addr`, for a client that wants to verify
    /// independently of [`VerifiableServer::open`].
    pub fn commitment_for(&self, addr: &[u8]) -> Option<&[u8; 32]> {
        self.commitments.get(addr)
    }
}

/// What the server reveals in response to [`VerifiableServer::open`].
#[derive(Debug, Clone)]
pub struct OpenedEntry {
    /// The update's full ℓ-element cross-tag set.
    pub xtags: Vec<Vec<u8>>,
    /// The cross-tags at the requested β positions (subset of `xtags`).
    pub sampled: Vec<Vec<u8>>,
    /// QTree authentication paths, one per sampled cross-tag, in the same
    /// order as `sampled`.
    pub proofs: Vec<Proof>,
}

/// The client-side check: does `opened` match `commitment` and authenticate
/// against `root` under the given β indices?
pub fn verify_opened(
    qtree: &QTree,
    commitment: &[u8; 32],
    opened: &OpenedEntry,
    beta_indices: &[u64],
    root: &[u8; 32],
) -> Result<bool> {
    if !verify_commitment(commitment, &opened.xtags) {
        return Ok(false);
    }
    if !check_subset_membership(&opened.sampled, beta_indices, &opened.xtags)? {
        return Ok(false);
    }
    for (xtag, proof) in opened.sampled.iter().zip(&opened.proofs) {
        if !proof.bit {
            return Ok(false);
        }
        if !qtree.verify_path(xtag, proof, root) {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gatekeeper::Gatekeeper;
    use crate::core::types::Operation;

    #[test]
    fn opened_entry_verifies_against_commitment_and_root() {
        let mut gk = Gatekeeper::setup(4).unwrap();
        let mut vserver = VerifiableServer::new(64).unwrap();
        let meta = gk.update(Operation::Add, b"doc1", b"crypto");
        vserver.update(&meta);

        let commitment = *vserver.commitment_for(&meta.addr).unwrap();
        let opened = vserver.open(&meta.addr, &[1, 2, 3]).unwrap();
        let root = vserver.root();

        assert!(verify_opened(&vserver.qtree, &commitment, &opened, &[1, 2, 3], &root).unwrap());
    }

    #[test]
    fn tampered_xtag_is_rejected() {
        let mut gk = Gatekeeper::setup(4).unwrap();
        let mut vserver = VerifiableServer::new(64).unwrap();
        let meta = gk.update(Operation::Add, b"doc1", b"crypto");
        vserver.update(&meta);

        let commitment = *vserver.commitment_for(&meta.addr).unwrap();
        let mut opened = vserver.open(&meta.addr, &[1]).unwrap();
        opened.xtags[0][0] ^= 1;
        opened.sampled[0][0] ^= 1;
        let root = vserver.root();

        assert!(!verify_opened(&vserver.qtree, &commitment, &opened, &[1], &root).unwrap());
    }
}
