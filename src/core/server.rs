//! The Server: encrypted-index storage and conjunctive-match evaluation.
//!
//! Holds TSet and XSet but never a plaintext keyword, identifier, or search
//! result — every lookup key and every stored value is either a group
//! element byte string or an XOR-masked payload.

use std::collections::{HashMap, HashSet};

use curve25519_dalek::ristretto::RistrettoPoint;
use tracing::{debug, trace};

use crate::curve::{scalar_mul, Compress};

use super::types::{SearchRequest, SearchResultEntry, TSetEntry, UpdateMetadata};

/// Encrypted-index storage plus the conjunctive search algorithm.
#[derive(Debug, Default)]
pub struct Server {
    tset: HashMap<Vec<u8>, TSetEntry>,
    xset: HashSet<Vec<u8>>,
}

impl Server {
    /// A fresh server with empty TSet and XSet.
    pub fn new() -> Self {
        Server {
            tset: HashMap::new(),
            xset: HashSet::new(),
        }
    }

    /// `update(meta)`: idempotent on `addr` (last write wins).
    pub fn update(&mut self, meta: &UpdateMetadata) {
        self.tset.insert(
            meta.addr.clone(),
            TSetEntry {
                val: meta.val.clone(),
                alpha: meta.alpha,
            },
        );
        for xtag in &meta.xtags {
            self.xset.insert(xtag.clone());
        }
        trace!(tset_size = self.tset.len(), xset_size = self.xset.len(), "update applied");
    }

    /// Number of TSet entries, for storage-size benchmarking.
    pub fn tset_len(&self) -> usize {
        self.tset.len()
    }

    /// Number of XSet entries, for storage-size benchmarking.
    pub fn xset_len(&self) -> usize {
        self.xset.len()
    }

    /// Total bytes of TSet addresses and payloads, for storage-size
    /// benchmarking.
    pub fn tset_size_bytes(&self) -> usize {
        self.tset
            .iter()
            .map(|(addr, entry)| addr.len() + entry.val.len() + crate::curve::SCALAR_BYTES)
            .sum()
    }

    /// Total bytes of XSet entries, for storage-size benchmarking.
    pub fn xset_size_bytes(&self) -> usize {
        self.xset.iter().map(|x| x.len()).sum()
    }

    /// `search(req)`: candidate enumeration followed by pairing-free
    /// cross-filtering.
    pub fn search(&self, req: &SearchRequest) -> Vec<SearchResultEntry> {
        let m = req.stoken_list.len();
        let mut results = Vec::new();

        for j in 0..m {
            let Some(entry) = self.tset.get(&req.stoken_list[j]) else {
                continue;
            };
            let empty_row: Vec<Vec<Vec<u8>>> = Vec::new();
            let xtoken_row = req.xtoken_list.get(j).unwrap_or(&empty_row);

            let mut all_match = true;
            let mut matches_found = 0usize;
            for xtokens in xtoken_row {
                let mut clause_matched = false;
                for xtok_bytes in xtokens {
                    let Ok(xtok_point) = RistrettoPoint::from_bytes(xtok_bytes) else {
                        continue;
                    };
                    let xtag = scalar_mul(&xtok_point, &entry.alpha).to_bytes();
                    if self.xset.contains(&xtag) {
                        clause_matched = true;
                        matches_found += 1;
                        break;
                    }
                }
                if !clause_matched {
                    all_match = false;
                    break;
                }
            }

            if all_match {
                results.push(SearchResultEntry {
                    j: j + 1,
                    sval: entry.val.clone(),
                    cnt: matches_found,
                });
            }
        }

        debug!(m, results = results.len(), "search complete");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::super::gatekeeper::Gatekeeper;
    use super::super::types::Operation;
    use super::*;

    #[test]
    fn update_grows_tset_and_xset() {
        let mut gk = Gatekeeper::setup(4).unwrap();
        let mut server = Server::new();
        let meta = gk.update(Operation::Add, b"doc1", b"crypto");
        server.update(&meta);
        assert_eq!(server.tset_len(), 1);
        assert_eq!(server.xset_len(), 3);
    }

    #[test]
    fn search_with_empty_request_returns_empty() {
        let server = Server::new();
        let req = SearchRequest {
            stoken_list: vec![],
            xtoken_list: vec![],
            env: vec![],
        };
        assert!(server.search(&req).is_empty());
    }
}
