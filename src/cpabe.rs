//! Ciphertext-policy attribute-based encryption: type shapes only.
//!
//! CpABE is a reusable building block the multi-client variant does not
//! depend on in this design. It is represented here only to the extent its
//! key/ciphertext shapes constrain shared primitives (an attribute hashes
//! to a group element the same way a keyword does); `encrypt`/`decrypt`/
//! `keygen` are intentionally unimplemented.

use std::collections::BTreeSet;

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;

/// A policy or key attribute set.
pub type AttributeSet = BTreeSet<String>;

/// `alpha, a` plus their group images `g^alpha, g^a`.
#[derive(Debug, Clone)]
pub struct MasterKey {
    /// The master secret exponent.
    pub alpha: Scalar,
    /// The second master secret exponent.
    pub a: Scalar,
    /// `g^alpha`.
    pub g_alpha: RistrettoPoint,
    /// `g^a`.
    pub g_a: RistrettoPoint,
}

/// The public parameters derived from a [`MasterKey`].
///
/// `e_gg_alpha` is a target-group element in the source's pairing-based
/// construction (`e(g,g)^alpha`); this crate has no pairing-capable group
/// wired in (see [`crate::curve`]), so it is left opaque here.
#[derive(Debug, Clone)]
pub struct PublicKey {
    /// The group generator.
    pub g: RistrettoPoint,
    /// Opaque target-group element, `e(g,g)^alpha` in a pairing-capable
    /// construction.
    pub e_gg_alpha: Vec<u8>,
    /// `g^a`.
    pub g_a: RistrettoPoint,
}

/// A key component binding one attribute to its hashed exponentiation.
#[derive(Debug, Clone)]
pub struct SecretKeyComponent {
    /// The attribute this component authenticates.
    pub attribute: String,
    /// `H(attribute)^t`.
    pub k_x: RistrettoPoint,
}

/// A user's decryption key, associated with an [`AttributeSet`].
#[derive(Debug, Clone)]
pub struct SecretKey {
    /// `g^alpha * g^{a*t}`.
    pub k: RistrettoPoint,
    /// `g^t`.
    pub l: RistrettoPoint,
    /// Per-attribute components.
    pub components: Vec<SecretKeyComponent>,
    /// The attribute set this key was issued for.
    pub attributes: AttributeSet,
}

/// One attribute's pair of ciphertext components under an AND-of-attributes
/// policy with `n`-out-of-`n` secret sharing.
#[derive(Debug, Clone)]
pub struct CiphertextComponent {
    /// The attribute this component is under.
    pub attribute: String,
    /// `g^{a*s_i} * H(attribute)^{-r_i}`.
    pub c1: RistrettoPoint,
    /// `g^{r_i}`.
    pub c2: RistrettoPoint,
}

/// A ciphertext under policy `AND(policy)`.
#[derive(Debug, Clone)]
pub struct Ciphertext {
    /// The attribute set the policy requires (conjunctively).
    pub policy: AttributeSet,
    /// Opaque target-group element, `M * e(g,g)^{alpha*s}`.
    pub c: Vec<u8>,
    /// `g^s`.
    pub c_prime: RistrettoPoint,
    /// Per-attribute components.
    pub components: Vec<CiphertextComponent>,
}
