//! McGatekeeper: a per-owner keyspace plus a keyword-scoped authorization
//! table, layered over the base [`Gatekeeper`].

use std::collections::HashMap;
use std::time::SystemTime;

use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;

use crate::core::gatekeeper::{Gatekeeper, DEFAULT_D, DEFAULT_ELL, DEFAULT_K};
use crate::core::types::{Operation, SearchToken, UpdateMetadata};
use crate::curve::rand_scalar;
use crate::error::{NomosError, NotFoundKind, Result};

use super::types::Authorization;

/// A registered search user's own blinding scalar, issued at registration.
/// Not consumed by the simplified token path — reserved for an
/// OPRF-blinded variant of `GenToken` this crate does not implement.
#[derive(Debug, Clone, Copy)]
pub struct UserKey {
    #[allow(dead_code)]
    ks_user: Scalar,
}

/// Per-owner keyspace, plus the registration and authorization state the
/// multi-client extension adds on top of the base scheme.
#[derive(Debug)]
pub struct McGatekeeper {
    owners: HashMap<String, Gatekeeper>,
    users: HashMap<String, UserKey>,
    authorizations: HashMap<(String, String), Authorization>,
    update_index: HashMap<(String, Vec<u8>), Vec<Vec<u8>>>,
}

impl Default for McGatekeeper {
    fn default() -> Self {
        Self::new()
    }
}

impl McGatekeeper {
    /// An empty multi-client gatekeeper with no owners or users registered.
    pub fn new() -> Self {
        McGatekeeper {
            owners: HashMap::new(),
            users: HashMap::new(),
            authorizations: HashMap::new(),
            update_index: HashMap::new(),
        }
    }

    /// `registerDataOwner(owner_id)`: allocates fresh per-owner keys.
    pub fn register_data_owner(&mut self, owner_id: &str) -> Result<()> {
        if self.owners.contains_key(owner_id) {
            return Err(NomosError::NotFoundError {
                kind: NotFoundKind::AlreadyRegistered,
                id: owner_id.to_string(),
            });
        }
        let gatekeeper = Gatekeeper::setup_with_params(DEFAULT_D, DEFAULT_ELL, DEFAULT_K)?;
        self.owners.insert(owner_id.to_string(), gatekeeper);
        Ok(())
    }

    /// `registerSearchUser(user_id)`: allocates a fresh blinding scalar.
    pub fn register_search_user(&mut self, user_id: &str) -> Result<()> {
        if self.users.contains_key(user_id) {
            return Err(NomosError::NotFoundError {
                kind: NotFoundKind::AlreadyRegistered,
                id: user_id.to_string(),
            });
        }
        let mut rng = OsRng;
        self.users.insert(
            user_id.to_string(),
            UserKey {
                ks_user: rand_scalar(&mut rng),
            },
        );
        Ok(())
    }

    /// `grantAuthorization(owner_id, user_id, allowed_keywords, expiry?)`:
    /// insert or overwrite.
    pub fn grant_authorization(
        &mut self,
        owner_id: &str,
        user_id: &str,
        allowed_keywords: impl IntoIterator<Item = Vec<u8>>,
        expiry: Option<SystemTime>,
    ) {
        self.authorizations.insert(
            (owner_id.to_string(), user_id.to_string()),
            Authorization {
                allowed_keywords: allowed_keywords.into_iter().collect(),
                expiry,
            },
        );
    }

    /// `revokeAuthorization(owner_id, user_id)`.
    pub fn revoke_authorization(&mut self, owner_id: &str, user_id: &str) {
        self.authorizations.remove(&(owner_id.to_string(), user_id.to_string()));
    }

    /// `isAuthorized`, evaluated at `now`.
    pub fn is_authorized(&self, owner_id: &str, user_id: &str, keyword: &[u8], now: SystemTime) -> bool {
        self.authorizations
            .get(&(owner_id.to_string(), user_id.to_string()))
            .is_some_and(|auth| auth.permits(keyword, now))
    }

    /// `getUpdateCount(owner_id, keyword)`.
    pub fn get_update_count(&self, owner_id: &str, keyword: &[u8]) -> Result<u64> {
        Ok(self.owner(owner_id)?.update_count(keyword))
    }

    fn owner(&self, owner_id: &str) -> Result<&Gatekeeper> {
        self.owners.get(owner_id).ok_or_else(|| NomosError::NotFoundError {
            kind: NotFoundKind::Owner,
            id: owner_id.to_string(),
        })
    }

    fn owner_mut(&mut self, owner_id: &str) -> Result<&mut Gatekeeper> {
        self.owners.get_mut(owner_id).ok_or_else(|| NomosError::NotFoundError {
            kind: NotFoundKind::Owner,
            id: owner_id.to_string(),
        })
    }

    /// `update(owner_id, op, id, keyword)`: delegates to the owner's
    /// gatekeeper and maintains the `registerUpdate` sidecar index.
    pub fn update(&mut self, owner_id: &str, op: Operation, id: &[u8], keyword: &[u8]) -> Result<UpdateMetadata> {
        let meta = self.owner_mut(owner_id)?.update(op, id, keyword);
        self.register_update(owner_id, id, keyword);
        Ok(meta)
    }

    /// `registerUpdate(owner_id, doc_id, keyword)`: internal-only sidecar
    /// index (`keyword -> [doc_ids]`) used to give the `bxtrap` matrix the
    /// right shape; not part of the cryptographic state.
    fn register_update(&mut self, owner_id: &str, doc_id: &[u8], keyword: &[u8]) {
        self.update_index
            .entry((owner_id.to_string(), keyword.to_vec()))
            .or_default()
            .push(doc_id.to_vec());
    }

    /// The doc-ids registered under `keyword` for `owner_id`, in update
    /// order. Exposed for tests and diagnostics; not cryptographic state.
    pub fn registered_docs(&self, owner_id: &str, keyword: &[u8]) -> &[Vec<u8>] {
        self.update_index
            .get(&(owner_id.to_string(), keyword.to_vec()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `GenToken(owner_id, user_id, Q)`: authorization-checked token
    /// issuance. Every keyword in `Q` must be covered by the caller's
    /// authorization.
    pub fn gen_token(&self, owner_id: &str, user_id: &str, query: &[Vec<u8>], now: SystemTime) -> Result<SearchToken> {
        for keyword in query {
            if !self.is_authorized(owner_id, user_id, keyword, now) {
                return Err(NomosError::UnauthorizedError {
                    owner_id: owner_id.to_string(),
                    user_id: user_id.to_string(),
                });
            }
        }
        self.owner(owner_id)?.gen_token_simplified(query)
    }

    /// `getKt(owner_id)`, read-only.
    pub fn get_kt(&self, owner_id: &str) -> Result<&[Scalar]> {
        Ok(self.owner(owner_id)?.kt())
    }

    /// `getKx(owner_id)`, read-only.
    pub fn get_kx(&self, owner_id: &str) -> Result<&[Scalar]> {
        Ok(self.owner(owner_id)?.kx())
    }

    /// `getKy(owner_id)`, read-only.
    pub fn get_ky(&self, owner_id: &str) -> Result<Scalar> {
        Ok(self.owner(owner_id)?.ky())
    }

    /// `getKm(owner_id)`, read-only.
    pub fn get_km(&self, owner_id: &str) -> Result<[u8; 32]> {
        Ok(*self.owner(owner_id)?.km())
    }

    /// `getUpdateCounts(owner_id)`, read-only view of the full per-keyword
    /// counter map.
    pub fn update_counts(&self, owner_id: &str) -> Result<&HashMap<Vec<u8>, u64>> {
        Ok(self.owner(owner_id)?.update_counts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_owner_registration_is_rejected() {
        let mut mg = McGatekeeper::new();
        mg.register_data_owner("alice").unwrap();
        assert!(mg.register_data_owner("alice").is_err());
    }

    #[test]
    fn gen_token_requires_authorization() {
        let mut mg = McGatekeeper::new();
        mg.register_data_owner("alice").unwrap();
        mg.register_search_user("bob").unwrap();
        mg.update("alice", Operation::Add, b"doc1", b"crypto").unwrap();
        let err = mg.gen_token("alice", "bob", &[b"crypto".to_vec()], SystemTime::now());
        assert!(err.is_err());
    }

    #[test]
    fn gen_token_succeeds_once_authorized() {
        let mut mg = McGatekeeper::new();
        mg.register_data_owner("alice").unwrap();
        mg.register_search_user("bob").unwrap();
        mg.update("alice", Operation::Add, b"doc1", b"crypto").unwrap();
        mg.grant_authorization("alice", "bob", [b"crypto".to_vec()], None);
        assert!(mg.gen_token("alice", "bob", &[b"crypto".to_vec()], SystemTime::now()).is_ok());
    }

    #[test]
    fn wildcard_authorization_permits_any_keyword() {
        let mut mg = McGatekeeper::new();
        mg.register_data_owner("alice").unwrap();
        mg.register_search_user("bob").unwrap();
        mg.update("alice", Operation::Add, b"doc1", b"crypto").unwrap();
        mg.grant_authorization("alice", "bob", [], None);
        assert!(mg.gen_token("alice", "bob", &[b"crypto".to_vec()], SystemTime::now()).is_ok());
    }

    #[test]
    fn expired_authorization_is_rejected() {
        use std::time::Duration;
        let mut mg = McGatekeeper::new();
        mg.register_data_owner("alice").unwrap();
        mg.register_search_user("bob").unwrap();
        mg.update("alice", Operation::Add, b"doc1", b"crypto").unwrap();
        let expiry = SystemTime::now() - Duration::from_secs(10);
        mg.grant_authorization("alice", "bob", [b"crypto".to_vec()], Some(expiry));
        assert!(mg.gen_token("alice", "bob", &[b"crypto".to_vec()], SystemTime::now()).is_err());
    }

    #[test]
    fn cross_owner_isolation_of_update_counts() {
        let mut mg = McGatekeeper::new();
        mg.register_data_owner("alice").unwrap();
        mg.register_data_owner("bob_owner").unwrap();
        mg.update("alice", Operation::Add, b"doc1", b"crypto").unwrap();
        assert_eq!(mg.get_update_count("alice", b"crypto").unwrap(), 1);
        assert_eq!(mg.get_update_count("bob_owner", b"crypto").unwrap(), 0);
    }
}
