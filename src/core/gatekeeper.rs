//! The Gatekeeper: master key holder, `Update` and `GenToken` issuer.
//!
//! `setup(&mut rng)` returns freshly sampled scalars, keyed for a
//! PRF-based scheme rather than a pairing-based IBE: there is no
//! public/secret keypair here, only symmetric key material the gatekeeper
//! keeps to itself.

use std::collections::HashMap;
use std::convert::TryInto;

use curve25519_dalek::scalar::Scalar;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha3::{Digest, Sha3_256};
use tracing::{debug, trace};

use crate::curve::{hash_to_g1, rand_scalar, scalar_mul, Compress};
use crate::error::{NomosError, Result};
use crate::prf::{ae_encrypt, prf_fp};

use super::types::{Operation, SearchToken, UpdateMetadata};

/// Number of cross-tags inserted per update (`ℓ` in the data model).
pub const DEFAULT_ELL: usize = 3;

/// Number of β samples per additional conjunct in a search token (`k`).
pub const DEFAULT_K: usize = 2;

/// Default keyword-bucket count (`d`).
pub const DEFAULT_D: usize = 10;

/// `I(w) = hash(w) mod d`, the keyword-to-bucket function.
pub fn index_function(keyword: &[u8], d: usize) -> usize {
    let digest = Sha3_256::digest(keyword);
    let n = u64::from_be_bytes(digest[0..8].try_into().expect("8 bytes"));
    (n % d as u64) as usize
}

/// Builds the `H(keyword||cnt||tag)` input used throughout `Update` and
/// `GenTokenSimplified`.
fn counter_input(keyword: &[u8], cnt: u64, tag: u8) -> Vec<u8> {
    let mut buf = Vec::with_capacity(keyword.len() + 1 + 20 + 1);
    buf.extend_from_slice(keyword);
    buf.push(b'|');
    buf.extend_from_slice(cnt.to_string().as_bytes());
    buf.push(b'|');
    buf.push(tag);
    buf
}

/// Holds the master key material for a single owner and runs `Setup`,
/// `Update`, and the two `GenToken` variants.
#[derive(Debug)]
pub struct Gatekeeper {
    ks: Scalar,
    kt: Vec<Scalar>,
    kx: Vec<Scalar>,
    ky: Scalar,
    km: [u8; 32],
    d: usize,
    ell: usize,
    k: usize,
    update_cnt: HashMap<Vec<u8>, u64>,
}

impl Gatekeeper {
    /// `Setup(d)` with the default `ℓ` and `k` system parameters.
    pub fn setup(d: usize) -> Result<Self> {
        Self::setup_with_params(d, DEFAULT_ELL, DEFAULT_K)
    }

    /// `Setup(d)` with explicit `ℓ`/`k` overrides, for experiments that vary
    /// them.
    pub fn setup_with_params(d: usize, ell: usize, k: usize) -> Result<Self> {
        if d == 0 {
            return Err(NomosError::InitError {
                reason: "keyword-bucket count d must be non-zero".into(),
            });
        }
        let mut rng = OsRng;
        let gatekeeper = Self::setup_with_rng(d, ell, k, &mut rng)?;
        debug!(d, ell, k, "gatekeeper setup complete");
        Ok(gatekeeper)
    }

    /// `Setup(d)` against an explicit CSPRNG, for deterministic tests.
    pub fn setup_with_rng<R: RngCore + CryptoRng>(
        d: usize,
        ell: usize,
        k: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if d == 0 {
            return Err(NomosError::InitError {
                reason: "keyword-bucket count d must be non-zero".into(),
            });
        }
        let ks = rand_scalar(rng);
        let ky = rand_scalar(rng);
        let kt = (0..d).map(|_| rand_scalar(rng)).collect();
        let kx = (0..d).map(|_| rand_scalar(rng)).collect();
        let mut km = [0u8; 32];
        rng.fill_bytes(&mut km);
        Ok(Gatekeeper {
            ks,
            kt,
            kx,
            ky,
            km,
            d,
            ell,
            k,
            update_cnt: HashMap::new(),
        })
    }

    /// The current `UpdateCnt[keyword]`, needed by the client at query time.
    pub fn update_count(&self, keyword: &[u8]) -> u64 {
        *self.update_cnt.get(keyword).unwrap_or(&0)
    }

    /// A read-only view of the full counter map, for callers (e.g. the
    /// client or a benchmark) that need it wholesale.
    pub fn update_counts(&self) -> &HashMap<Vec<u8>, u64> {
        &self.update_cnt
    }

    /// `getKt()`: the TSet-address key array.
    pub fn kt(&self) -> &[Scalar] {
        &self.kt
    }

    /// `getKx()`: the XSet-exponent key array.
    pub fn kx(&self) -> &[Scalar] {
        &self.kx
    }

    /// `getKy()`: the cross-filter-anchor key.
    pub fn ky(&self) -> Scalar {
        self.ky
    }

    /// `getKm()`: the envelope AE key.
    pub fn km(&self) -> &[u8; 32] {
        &self.km
    }

    /// `Update(op, id, keyword)`. `id` and `keyword` are non-empty byte
    /// strings by precondition; infallible once `Setup` has succeeded.
    pub fn update(&mut self, op: Operation, id: &[u8], keyword: &[u8]) -> UpdateMetadata {
        debug_assert!(!id.is_empty() && !keyword.is_empty(), "id and keyword must be non-empty");
        let cnt = {
            let entry = self.update_cnt.entry(keyword.to_vec()).or_insert(0);
            *entry += 1;
            *entry
        };
        let idx = index_function(keyword, self.d);

        let addr_point = scalar_mul(&hash_to_g1(&counter_input(keyword, cnt, b'0')), &self.kt[idx]);
        let mask_point = scalar_mul(&hash_to_g1(&counter_input(keyword, cnt, b'1')), &self.kt[idx]);
        let mask = mask_point.to_bytes();

        let mut plaintext = Vec::with_capacity(id.len() + 2);
        plaintext.extend_from_slice(id);
        plaintext.push(b'|');
        plaintext.push(op.code());
        let val = crate::prf::xor_stretch(&plaintext, &mask);

        let alpha = prf_fp(&self.ky.to_bytes(), id);

        let w_point = hash_to_g1(keyword);
        let mut xtags = Vec::with_capacity(self.ell);
        for i in 1..=self.ell {
            let exponent = self.kx[idx] * alpha * Scalar::from(i as u64);
            xtags.push(scalar_mul(&w_point, &exponent).to_bytes());
        }

        trace!(cnt, idx, ell = self.ell, "update issued");
        UpdateMetadata {
            addr: addr_point.to_bytes(),
            val,
            alpha,
            xtags,
        }
    }

    /// `GenTokenSimplified(Q)` against the system CSPRNG.
    pub fn gen_token_simplified(&self, query: &[Vec<u8>]) -> Result<SearchToken> {
        let mut rng = OsRng;
        self.gen_token_simplified_with_rng(query, &mut rng)
    }

    /// `GenTokenSimplified(Q)` against an explicit CSPRNG.
    pub fn gen_token_simplified_with_rng<R: RngCore + CryptoRng>(
        &self,
        query: &[Vec<u8>],
        rng: &mut R,
    ) -> Result<SearchToken> {
        if query.is_empty() {
            return Err(NomosError::MalformedTokenError {
                reason: "query must contain at least one keyword".into(),
            });
        }
        let w1 = &query[0];
        let m = self.update_count(w1);
        if m == 0 {
            return Ok(SearchToken::empty());
        }

        let strap_point = scalar_mul(&hash_to_g1(w1), &self.ks);
        let strap = strap_point.to_bytes();
        let idx1 = index_function(w1, self.d);

        let mut bstag = Vec::with_capacity(m as usize);
        let mut delta = Vec::with_capacity(m as usize);
        for j in 1..=m {
            bstag.push(scalar_mul(&hash_to_g1(&counter_input(w1, j, b'0')), &self.kt[idx1]).to_bytes());
            delta.push(scalar_mul(&hash_to_g1(&counter_input(w1, j, b'1')), &self.kt[idx1]).to_bytes());
        }

        let betas: Vec<u64> = (0..self.k)
            .map(|_| 1 + (rng.next_u64() % self.ell as u64))
            .collect();

        let mut bxtrap = Vec::with_capacity(query.len().saturating_sub(1));
        for wi1 in &query[1..] {
            let idx = index_function(wi1, self.d);
            let xtrap = scalar_mul(&hash_to_g1(wi1), &self.kx[idx]);
            let row = betas
                .iter()
                .map(|beta| scalar_mul(&xtrap, &Scalar::from(*beta)).to_bytes())
                .collect();
            bxtrap.push(row);
        }

        let mut blinding = Vec::with_capacity((query.len() - 1 + m as usize) * 32);
        for _ in 0..query.len() - 1 {
            blinding.extend_from_slice(&rand_scalar(rng).to_bytes());
        }
        for _ in 0..m {
            blinding.extend_from_slice(&rand_scalar(rng).to_bytes());
        }
        let env = ae_encrypt(&self.km, &blinding)?;

        Ok(SearchToken {
            strap,
            bstag,
            delta,
            bxtrap,
            env,
        })
    }

    /// `GenTokenSmart(Q)`: reorders the query so the least-frequent keyword
    /// leads, then delegates to the simplified algorithm. A deliberate
    /// design freedom, not a correctness requirement — conjunction is
    /// commutative, so any ordering returns the same result set, but a
    /// smaller `m` means a smaller token and less server-side work.
    pub fn gen_token_smart(&self, query: &[Vec<u8>]) -> Result<SearchToken> {
        let mut rng = OsRng;
        self.gen_token_smart_with_rng(query, &mut rng)
    }

    /// [`Gatekeeper::gen_token_smart`] against an explicit CSPRNG.
    pub fn gen_token_smart_with_rng<R: RngCore + CryptoRng>(
        &self,
        query: &[Vec<u8>],
        rng: &mut R,
    ) -> Result<SearchToken> {
        if query.is_empty() {
            return Err(NomosError::MalformedTokenError {
                reason: "query must contain at least one keyword".into(),
            });
        }
        let mut reordered = query.to_vec();
        let (min_idx, _) = reordered
            .iter()
            .enumerate()
            .min_by_key(|(_, w)| self.update_count(w))
            .expect("query is non-empty");
        reordered.swap(0, min_idx);
        self.gen_token_simplified_with_rng(&reordered, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> OsRng {
        OsRng
    }

    #[test]
    fn update_advances_counter_exactly_once() {
        let mut gk = Gatekeeper::setup_with_rng(4, 3, 2, &mut rng()).unwrap();
        assert_eq!(gk.update_count(b"crypto"), 0);
        gk.update(Operation::Add, b"doc1", b"crypto");
        assert_eq!(gk.update_count(b"crypto"), 1);
        gk.update(Operation::Add, b"doc2", b"crypto");
        assert_eq!(gk.update_count(b"crypto"), 2);
    }

    #[test]
    fn alpha_is_stable_across_add_and_del_for_same_id() {
        let mut gk = Gatekeeper::setup_with_rng(4, 3, 2, &mut rng()).unwrap();
        let m1 = gk.update(Operation::Add, b"doc1", b"crypto");
        let m2 = gk.update(Operation::Del, b"doc1", b"crypto");
        assert_eq!(m1.alpha, m2.alpha);
        assert_ne!(m1.addr, m2.addr);
    }

    #[test]
    fn empty_token_for_unknown_keyword() {
        let gk = Gatekeeper::setup_with_rng(4, 3, 2, &mut rng()).unwrap();
        let token = gk
            .gen_token_simplified_with_rng(&[b"nonexistent".to_vec()], &mut rng())
            .unwrap();
        assert!(token.is_empty());
    }

    #[test]
    fn token_has_m_bstag_entries() {
        let mut gk = Gatekeeper::setup_with_rng(4, 3, 2, &mut rng()).unwrap();
        gk.update(Operation::Add, b"doc1", b"crypto");
        gk.update(Operation::Add, b"doc2", b"crypto");
        let token = gk
            .gen_token_simplified_with_rng(&[b"crypto".to_vec(), b"security".to_vec()], &mut rng())
            .unwrap();
        assert_eq!(token.bstag.len(), 2);
        assert_eq!(token.delta.len(), 2);
        assert_eq!(token.bxtrap.len(), 1);
        assert_eq!(token.bxtrap[0].len(), 2);
    }

    #[test]
    fn rejects_empty_query() {
        let gk = Gatekeeper::setup_with_rng(4, 3, 2, &mut rng()).unwrap();
        assert!(gk.gen_token_simplified(&[]).is_err());
    }

    #[test]
    fn rejects_setup_with_zero_buckets() {
        assert!(Gatekeeper::setup_with_rng(0, 3, 2, &mut rng()).is_err());
    }
}
