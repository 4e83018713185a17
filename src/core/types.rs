//! Wire types shared between the gatekeeper, server, and client.

use curve25519_dalek::scalar::Scalar;

use crate::curve::Compress;
use crate::error::{NomosError, Result};

/// An update is either an insertion or a logical deletion.
///
/// DEL does not remove anything from the server's storage: it adds a new
/// TSet entry carrying the same cross-filter anchor `α` as its matching ADD,
/// and later updates shadow earlier ones when the client decrypts results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Insert `id` under `keyword`.
    Add,
    /// Logically remove `id` from `keyword` — shadows any earlier `Add`.
    Del,
}

impl Operation {
    /// The single-ASCII-digit code used in the TSet payload encoding.
    pub fn code(self) -> u8 {
        match self {
            Operation::Add => b'0',
            Operation::Del => b'1',
        }
    }

    /// Parses the code produced by [`Operation::code`].
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            b'0' => Ok(Operation::Add),
            b'1' => Ok(Operation::Del),
            _ => Err(NomosError::CryptoError {
                reason: format!("unrecognized operation code {code}"),
            }),
        }
    }
}

/// Everything the Gatekeeper's `Update` algorithm produces for a single
/// `(op, id, keyword)` call, ready to hand to `Server::update`.
#[derive(Debug, Clone)]
pub struct UpdateMetadata {
    /// `H(keyword||cnt||"0")^{Kt[idx]}`, serialized — the TSet address.
    pub addr: Vec<u8>,
    /// `(id||"|"||op) ⊕ mask`, the masked TSet payload.
    pub val: Vec<u8>,
    /// `Fp(Ky, id)` — the cross-filter anchor, shared by every update on the
    /// same `id` regardless of `op`.
    pub alpha: Scalar,
    /// `ℓ` cross-tags, serialized, to be inserted into XSet.
    pub xtags: Vec<Vec<u8>>,
}

/// A token issued by the Gatekeeper for a conjunctive query, before the
/// client unblinds it into a [`SearchRequest`].
#[derive(Debug, Clone)]
pub struct SearchToken {
    /// `H(w1)^{Ks}`, serialized.
    pub strap: Vec<u8>,
    /// `bstag[j] = H(w1||j||"0")^{Kt[I(w1)]}` for `j = 1..m`, serialized.
    pub bstag: Vec<Vec<u8>>,
    /// `delta[j] = H(w1||j||"1")^{Kt[I(w1)]}` for `j = 1..m`, serialized.
    pub delta: Vec<Vec<u8>>,
    /// `bxtrap[i][t]` for `i = 0..n-2`, `t = 0..k-1`, serialized.
    pub bxtrap: Vec<Vec<Vec<u8>>>,
    /// AE-encrypted blinding factors, opaque to everyone but the gatekeeper.
    pub env: Vec<u8>,
}

impl SearchToken {
    /// The token issued for an unknown (never-updated) primary keyword.
    pub fn empty() -> Self {
        SearchToken {
            strap: Vec::new(),
            bstag: Vec::new(),
            delta: Vec::new(),
            bxtrap: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Whether this token carries no candidates (`m = 0`).
    pub fn is_empty(&self) -> bool {
        self.bstag.is_empty()
    }
}

/// The unblinded request the client sends to the server.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// `stokenList[j] = bstag[j]`.
    pub stoken_list: Vec<Vec<u8>>,
    /// `xtoken[j][i][t]`, shape `[m][n-1][k]`.
    pub xtoken_list: Vec<Vec<Vec<Vec<u8>>>>,
    /// Copied through from the token, untouched.
    pub env: Vec<u8>,
}

/// One matching candidate the server found for a search request.
#[derive(Debug, Clone)]
pub struct SearchResultEntry {
    /// 1-indexed position among the primary keyword's updates.
    pub j: usize,
    /// The masked TSet payload for this candidate.
    pub sval: Vec<u8>,
    /// How many additional keywords found a matching cross-tag (for metrics
    /// only — does not affect correctness, since any `0` would have failed
    /// the all-must-match check).
    pub cnt: usize,
}

/// The server's view of a single TSet slot.
#[derive(Debug, Clone)]
pub struct TSetEntry {
    /// The masked payload.
    pub val: Vec<u8>,
    /// The cross-filter anchor recorded at update time.
    pub alpha: Scalar,
}

/// A decoded `(addr, alpha)` pair ready to serialize to bytes, used where
/// callers need the address as bytes independent of the rest of the entry.
pub fn serialize_scalar(s: &Scalar) -> Vec<u8> {
    s.to_bytes().to_vec()
}

/// Inverse of [`serialize_scalar`].
pub fn deserialize_scalar(bytes: &[u8]) -> Result<Scalar> {
    Scalar::from_bytes(bytes)
}
