//! McClient: mirrors `core::client`'s `prepareSearch`/`decryptResults`,
//! threading `owner_id` through to pick the right `McServer` partition. A
//! `SearchToken` handed to this module is assumed to have already cleared
//! authorization at `McGatekeeper::gen_token` time — this module does not
//! re-check it.

use std::collections::HashMap;

use crate::core::client::{decrypt_results, prepare_search};
use crate::core::types::{SearchRequest, SearchResultEntry, SearchToken};
use crate::error::Result;

/// `prepareSearch` scoped to one owner's `UpdateCnt` view.
pub fn prepare_search_for_owner(
    token: &SearchToken,
    query: &[Vec<u8>],
    owner_update_counts: &HashMap<Vec<u8>, u64>,
) -> Result<SearchRequest> {
    prepare_search(token, query, owner_update_counts)
}

/// `decryptResults`, identical to the single-owner algorithm: the
/// multi-client extension changes who may ask for a token, not how a
/// result is decrypted.
pub fn decrypt_results_for_owner(results: &[SearchResultEntry], token: &SearchToken) -> Result<Vec<Vec<u8>>> {
    decrypt_results(results, token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Operation;
    use crate::multiclient::gatekeeper::McGatekeeper;
    use crate::multiclient::server::McServer;
    use std::time::SystemTime;

    #[test]
    fn end_to_end_multiclient_search() {
        let mut mg = McGatekeeper::new();
        let mut server = McServer::new();
        mg.register_data_owner("alice").unwrap();
        mg.register_search_user("bob").unwrap();
        mg.grant_authorization("alice", "bob", [b"crypto".to_vec()], None);

        let meta = mg.update("alice", Operation::Add, b"doc1", b"crypto").unwrap();
        server.update("alice", &meta);

        let token = mg.gen_token("alice", "bob", &[b"crypto".to_vec()], SystemTime::now()).unwrap();
        let counts = mg.update_counts("alice").unwrap();
        let req = prepare_search_for_owner(&token, &[b"crypto".to_vec()], counts).unwrap();
        let results = server.search("alice", &req);
        let ids = decrypt_results_for_owner(&results, &token).unwrap();
        assert_eq!(ids, vec![b"doc1".to_vec()]);
    }
}
