//! The Client: token unblinding, xtoken derivation, and result decryption.

use std::collections::HashMap;

use crate::error::{NomosError, Result};
use crate::prf::xor_stretch;

use super::types::{Operation, SearchRequest, SearchResultEntry, SearchToken};

/// `prepareSearch(token, Q, UpdateCnt)`: derives the per-query `xtoken`
/// matrix from the token's `bxtrap`s, given the caller's view of
/// `UpdateCnt[w1]`.
///
/// `xtoken[j][i][t] = bxtrap[i][t]` unchanged — no `e_j` blinding factor is
/// applied. `xtag_i` is stored server-side as `H(w)^{Kx·α·i}` with `α`
/// itself a stored, unblinded `Fp(Ky, id)`; a `z`/`z⁻¹`-style per-query
/// blinding factor on `xtoken` would need a compensating factor folded into
/// `α` at update time for the server's `xtoken^α` check to still land on
/// `xtag_i`, and this implementation stores no such compensating factor.
pub fn prepare_search(token: &SearchToken, query: &[Vec<u8>], update_cnt: &HashMap<Vec<u8>, u64>) -> Result<SearchRequest> {
    if query.is_empty() {
        return Err(NomosError::MalformedTokenError {
            reason: "query must contain at least one keyword".into(),
        });
    }
    if token.is_empty() {
        return Ok(SearchRequest {
            stoken_list: Vec::new(),
            xtoken_list: Vec::new(),
            env: token.env.clone(),
        });
    }

    let w1 = &query[0];
    let m = *update_cnt.get(w1).unwrap_or(&0);
    if m as usize != token.bstag.len() {
        return Err(NomosError::MalformedTokenError {
            reason: format!(
                "token carries {} bstag entries but UpdateCnt[w1] = {}",
                token.bstag.len(),
                m
            ),
        });
    }

    let mut stoken_list = Vec::with_capacity(token.bstag.len());
    let mut xtoken_list = Vec::with_capacity(token.bstag.len());

    for bstag_j in &token.bstag {
        stoken_list.push(bstag_j.clone());
        xtoken_list.push(token.bxtrap.clone());
    }

    Ok(SearchRequest {
        stoken_list,
        xtoken_list,
        env: token.env.clone(),
    })
}

/// `decryptResults(results, token)`.
///
/// The literal per-entry rule is "decrypt, discard anything that isn't an
/// ADD". That alone is not enough to honor DEL: `Update(DEL, id, w)` issues
/// a *new* TSet entry (a new `j`) that shares `id`'s cross-filter anchor but
/// not its address, so a later DEL does not overwrite an earlier ADD's
/// result — both can independently match the same query. Shadowing has to
/// happen across entries, not within one: for each `id` that decrypts out of
/// the result set, only the highest-`j` (most recent) operation on it
/// decides whether it survives.
pub fn decrypt_results(results: &[SearchResultEntry], token: &SearchToken) -> Result<Vec<Vec<u8>>> {
    let mut latest: HashMap<Vec<u8>, (usize, Operation)> = HashMap::new();
    let mut first_seen_order: Vec<Vec<u8>> = Vec::new();

    for result in results {
        let delta_bytes = token
            .delta
            .get(result.j - 1)
            .ok_or_else(|| NomosError::MalformedTokenError {
                reason: format!("token has no delta entry for j={}", result.j),
            })?;
        let plaintext = xor_stretch(&result.sval, delta_bytes);

        let sep = plaintext
            .iter()
            .position(|&b| b == b'|')
            .ok_or_else(|| NomosError::CryptoError {
                reason: "decrypted payload missing id/op separator".into(),
            })?;
        let (id, rest) = plaintext.split_at(sep);
        let op_code = *rest.get(1).ok_or_else(|| NomosError::CryptoError {
            reason: "decrypted payload missing operation code".into(),
        })?;
        let op = Operation::from_code(op_code)?;

        match latest.get(id) {
            Some((prev_j, _)) if *prev_j > result.j => {}
            _ => {
                if !latest.contains_key(id) {
                    first_seen_order.push(id.to_vec());
                }
                latest.insert(id.to_vec(), (result.j, op));
            }
        }
    }

    Ok(first_seen_order
        .into_iter()
        .filter(|id| matches!(latest.get(id), Some((_, Operation::Add))))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gatekeeper::Gatekeeper;
    use crate::core::server::Server;

    #[test]
    fn roundtrip_single_keyword() {
        let mut gk = Gatekeeper::setup(4).unwrap();
        let mut server = Server::new();
        let meta = gk.update(Operation::Add, b"doc1", b"crypto");
        server.update(&meta);

        let token = gk.gen_token_simplified(&[b"crypto".to_vec()]).unwrap();
        let req = prepare_search(&token, &[b"crypto".to_vec()], gk.update_counts()).unwrap();
        let results = server.search(&req);
        let ids = decrypt_results(&results, &token).unwrap();
        assert_eq!(ids, vec![b"doc1".to_vec()]);
    }

    #[test]
    fn conjunctive_query_requires_both_keywords() {
        let mut gk = Gatekeeper::setup(4).unwrap();
        let mut server = Server::new();
        let m1 = gk.update(Operation::Add, b"doc1", b"crypto");
        server.update(&m1);
        let m2 = gk.update(Operation::Add, b"doc1", b"security");
        server.update(&m2);
        let m3 = gk.update(Operation::Add, b"doc2", b"crypto");
        server.update(&m3);

        let token = gk
            .gen_token_simplified(&[b"crypto".to_vec(), b"security".to_vec()])
            .unwrap();
        let req = prepare_search(&token, &[b"crypto".to_vec(), b"security".to_vec()], gk.update_counts()).unwrap();
        let results = server.search(&req);
        let ids = decrypt_results(&results, &token).unwrap();
        assert_eq!(ids, vec![b"doc1".to_vec()]);
    }

    #[test]
    fn del_shadows_earlier_add() {
        let mut gk = Gatekeeper::setup(4).unwrap();
        let mut server = Server::new();
        let m1 = gk.update(Operation::Add, b"doc1", b"crypto");
        server.update(&m1);
        let m2 = gk.update(Operation::Del, b"doc1", b"crypto");
        server.update(&m2);

        let token = gk.gen_token_simplified(&[b"crypto".to_vec()]).unwrap();
        let req = prepare_search(&token, &[b"crypto".to_vec()], gk.update_counts()).unwrap();
        let results = server.search(&req);
        let ids = decrypt_results(&results, &token).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn unknown_keyword_yields_empty_results() {
        let gk = Gatekeeper::setup(4).unwrap();
        let server = Server::new();
        let token = gk.gen_token_simplified(&[b"nonexistent".to_vec()]).unwrap();
        let req = prepare_search(&token, &[b"nonexistent".to_vec()], gk.update_counts()).unwrap();
        let results = server.search(&req);
        assert!(results.is_empty());
    }
}
