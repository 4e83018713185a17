//! McServer: `Server` with composite `(owner_id, bytes)` storage keys, so
//! two owners sharing a keyword string never collide and a search scoped to
//! one owner structurally cannot observe another's entries.

use std::collections::{HashMap, HashSet};

use curve25519_dalek::ristretto::RistrettoPoint;

use crate::core::types::{SearchRequest, SearchResultEntry, TSetEntry, UpdateMetadata};
use crate::curve::{scalar_mul, Compress};

/// Encrypted-index storage partitioned by data owner.
#[derive(Debug, Default)]
pub struct McServer {
    tset: HashMap<(String, Vec<u8>), TSetEntry>,
    xset: HashSet<(String, Vec<u8>)>,
}

impl McServer {
    /// A fresh server with no owners' data stored.
    pub fn new() -> Self {
        McServer {
            tset: HashMap::new(),
            xset: HashSet::new(),
        }
    }

    /// `update(owner_id, meta)`.
    pub fn update(&mut self, owner_id: &str, meta: &UpdateMetadata) {
        self.tset.insert(
            (owner_id.to_string(), meta.addr.clone()),
            TSetEntry {
                val: meta.val.clone(),
                alpha: meta.alpha,
            },
        );
        for xtag in &meta.xtags {
            self.xset.insert((owner_id.to_string(), xtag.clone()));
        }
    }

    /// Number of TSet entries stored for `owner_id`.
    pub fn tset_len_for(&self, owner_id: &str) -> usize {
        self.tset.keys().filter(|(o, _)| o == owner_id).count()
    }

    /// `search(owner_id, req)`, scoped so that only `owner_id`'s partition
    /// of TSet/XSet is ever consulted.
    pub fn search(&self, owner_id: &str, req: &SearchRequest) -> Vec<SearchResultEntry> {
        let m = req.stoken_list.len();
        let mut results = Vec::new();

        for j in 0..m {
            let Some(entry) = self.tset.get(&(owner_id.to_string(), req.stoken_list[j].clone())) else {
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
                    if self.xset.contains(&(owner_id.to_string(), xtag)) {
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

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Operation;
    use crate::multiclient::gatekeeper::McGatekeeper;
    use std::time::SystemTime;

    #[test]
    fn owners_do_not_observe_each_others_entries() {
        let mut mg = McGatekeeper::new();
        let mut server = McServer::new();
        mg.register_data_owner("alice").unwrap();
        mg.register_data_owner("bob_owner").unwrap();
        mg.register_search_user("eve").unwrap();
        mg.grant_authorization("alice", "eve", [], None);
        mg.grant_authorization("bob_owner", "eve", [], None);

        let meta = mg.update("alice", Operation::Add, b"secret-doc", b"crypto").unwrap();
        server.update("alice", &meta);

        let token = mg.gen_token("bob_owner", "eve", &[b"crypto".to_vec()], SystemTime::now()).unwrap();
        assert!(token.is_empty());
        assert_eq!(server.tset_len_for("bob_owner"), 0);
        assert_eq!(server.tset_len_for("alice"), 1);
    }
}
