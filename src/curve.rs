//! Opaque group operations ("CurvePrims") that the rest of the crate builds
//! on: a CSPRNG-backed scalar sampler, hash-to-group and hash-to-scalar, and
//! fixed-size byte (de)serialization of both.
//!
//! This component is framed as opaque operations over groups G₁, G₂, G_T
//! and scalars mod `p`, the kind of interface a pairing library would
//! expose. None of the in-scope algorithms (Setup/Update/Search and their
//! supporting components) ever evaluate a pairing — every cross-tag check is
//! pairing-free by construction (see the Server's cross-filtering step) — so
//! this crate only wires up a single prime-order group, the Ristretto
//! group over Curve25519, rather than a full pairing-friendly curve. See
//! DESIGN.md for the full rationale.

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};
use sha3::Sha3_512;

use crate::error::{NomosError, Result};

/// Size of a compressed group element, in bytes.
pub const POINT_BYTES: usize = 32;

/// Size of a canonical scalar, in bytes.
pub const SCALAR_BYTES: usize = 32;

/// Artifacts of the system that can be compressed to/from a fixed-size byte
/// representation implement this trait (mirrors this crate's original
/// `Compress` trait, generalized from a fixed `OUTPUT_SIZE` associated
/// constant to the two concrete sizes this scheme actually needs).
pub trait Compress: Sized {
    /// The size of the compressed output.
    const OUTPUT_SIZE: usize;

    /// Compresses this artifact to a byte vector.
    fn to_bytes(&self) -> Vec<u8>;

    /// Decompresses a serialized artifact.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;
}

impl Compress for RistrettoPoint {
    const OUTPUT_SIZE: usize = POINT_BYTES;

    fn to_bytes(&self) -> Vec<u8> {
        self.compress().to_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != POINT_BYTES {
            return Err(NomosError::CryptoError {
                reason: format!("expected a {}-byte point, got {}", POINT_BYTES, bytes.len()),
            });
        }
        CompressedRistretto::from_slice(bytes)
            .map_err(|_| NomosError::CryptoError {
                reason: "malformed compressed point".into(),
            })?
            .decompress()
            .ok_or_else(|| NomosError::CryptoError {
                reason: "point does not decompress to a curve point".into(),
            })
    }
}

impl Compress for Scalar {
    const OUTPUT_SIZE: usize = SCALAR_BYTES;

    fn to_bytes(&self) -> Vec<u8> {
        Scalar::to_bytes(self).to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SCALAR_BYTES {
            return Err(NomosError::CryptoError {
                reason: format!("expected a {}-byte scalar, got {}", SCALAR_BYTES, bytes.len()),
            });
        }
        let mut buf = [0u8; SCALAR_BYTES];
        buf.copy_from_slice(bytes);
        Option::from(Scalar::from_canonical_bytes(buf)).ok_or_else(|| NomosError::CryptoError {
            reason: "scalar is not in canonical form".into(),
        })
    }
}

/// Samples a uniformly random scalar from a CSPRNG.
///
/// Every random sample in the system (keys, blinding factors, β indices)
/// goes through a CSPRNG — see DESIGN.md's Open Question on β sampling.
#[inline]
pub fn rand_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    Scalar::random(rng)
}

/// Hashes an arbitrary byte string onto the group (`H: {0,1}* -> G1`).
///
/// Used for every `H(w)`, `H(w||cnt||tag)` style hash in the data model.
#[inline]
pub fn hash_to_g1(input: &[u8]) -> RistrettoPoint {
    RistrettoPoint::hash_from_bytes::<Sha3_512>(input)
}

/// Hashes an arbitrary byte string into Zp (`H: {0,1}* -> Zp`).
#[inline]
pub fn hash_to_zp(input: &[u8]) -> Scalar {
    Scalar::hash_from_bytes::<Sha3_512>(input)
}

/// Scalar multiplication, spelled out for readability at call sites that
/// otherwise read as a wall of `*`.
#[inline]
pub fn scalar_mul(point: &RistrettoPoint, scalar: &Scalar) -> RistrettoPoint {
    point * scalar
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn point_roundtrips_through_bytes() {
        let p = hash_to_g1(b"crypto|1|0");
        let bytes = p.to_bytes();
        assert_eq!(bytes.len(), POINT_BYTES);
        let p2 = RistrettoPoint::from_bytes(&bytes).unwrap();
        assert_eq!(p.compress(), p2.compress());
    }

    #[test]
    fn scalar_roundtrips_through_bytes() {
        let mut rng = OsRng;
        let s = rand_scalar(&mut rng);
        let bytes = s.to_bytes();
        let s2 = Scalar::from_bytes(&bytes).unwrap();
        assert_eq!(s, s2);
    }

    #[test]
    fn hash_to_g1_is_deterministic() {
        assert_eq!(hash_to_g1(b"abc").compress(), hash_to_g1(b"abc").compress());
        assert_ne!(hash_to_g1(b"abc").compress(), hash_to_g1(b"abd").compress());
    }

    #[test]
    fn hash_to_zp_is_deterministic() {
        assert_eq!(hash_to_zp(b"abc"), hash_to_zp(b"abc"));
        assert_ne!(hash_to_zp(b"abc"), hash_to_zp(b"abd"));
    }

    #[test]
    fn decoding_rejects_wrong_length() {
        assert!(RistrettoPoint::from_bytes(&[0u8; 10]).is_err());
        assert!(Scalar::from_bytes(&[0u8; 31]).is_err());
    }
}
