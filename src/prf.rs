//! Keyed PRF `Fp: Zp × {0,1}* → Zp` and the AE scheme used for the token
//! envelope, plus the XOR mask-stretch helper the TSet payload encryption
//! uses in place of a general-purpose block cipher. TSet payload masking and
//! AE wrapping are kept distinct: the former is a one-time pad keyed by a
//! fresh group element per update, the latter wraps the `env` envelope.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::curve::hash_to_zp;
use crate::error::{NomosError, Result};
use curve25519_dalek::scalar::Scalar;

/// `Fp(key, input) = H(key || "|" || input) mod p`.
///
/// `key` is the serialized byte representation of whatever keyed PRF input
/// the caller holds (a scalar, a group element, or raw key material).
pub fn prf_fp(key: &[u8], input: &[u8]) -> Scalar {
    let mut buf = Vec::with_capacity(key.len() + 1 + input.len());
    buf.extend_from_slice(key);
    buf.push(b'|');
    buf.extend_from_slice(input);
    hash_to_zp(&buf)
}

/// Repeats `mask` to cover `data.len()` bytes and XORs it in, matching the
/// `val := (id||op) ⊕ bytes(H(...))` construction of the data model: the
/// mask is a single hashed group element, stretched over a (generally
/// longer) plaintext.
pub fn xor_stretch(data: &[u8], mask: &[u8]) -> Vec<u8> {
    debug_assert!(!mask.is_empty());
    data.iter()
        .enumerate()
        .map(|(i, b)| b ^ mask[i % mask.len()])
        .collect()
}

const NONCE_LEN: usize = 12;

/// `AE.Enc(Km, plaintext)`: AES-256-GCM with a random 96-bit nonce prepended
/// to the ciphertext.
pub fn ae_encrypt(key: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, Payload { msg: plaintext, aad: b"" })
        .map_err(|_| NomosError::CryptoError {
            reason: "AE encryption failed".into(),
        })?;
    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// `AE.Dec(Km, ciphertext)`, inverse of [`ae_encrypt`].
pub fn ae_decrypt(key: &[u8; 32], data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < NONCE_LEN {
        return Err(NomosError::CryptoError {
            reason: "AE ciphertext shorter than a nonce".into(),
        });
    }
    let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Nonce::from_slice(nonce_bytes);
    cipher
        .decrypt(nonce, Payload { msg: ciphertext, aad: b"" })
        .map_err(|_| NomosError::CryptoError {
            reason: "AE decryption failed (wrong key or tampered ciphertext)".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fp_is_deterministic_and_key_separated() {
        assert_eq!(prf_fp(b"key", b"doc1"), prf_fp(b"key", b"doc1"));
        assert_ne!(prf_fp(b"key", b"doc1"), prf_fp(b"key", b"doc2"));
        assert_ne!(prf_fp(b"key1", b"doc1"), prf_fp(b"key2", b"doc1"));
    }

    #[test]
    fn xor_stretch_is_involutive() {
        let data = b"doc1|0";
        let mask = b"some-32-byte-mask-material-here";
        let enc = xor_stretch(data, mask);
        let dec = xor_stretch(&enc, mask);
        assert_eq!(dec, data);
    }

    #[test]
    fn ae_round_trips() {
        let key = [7u8; 32];
        let pt = b"rho and gamma blinding factors";
        let ct = ae_encrypt(&key, pt).unwrap();
        assert_ne!(ct[NONCE_LEN..], pt[..]);
        let pt2 = ae_decrypt(&key, &ct).unwrap();
        assert_eq!(pt2, pt);
    }

    #[test]
    fn ae_rejects_tampered_ciphertext() {
        let key = [7u8; 32];
        let mut ct = ae_encrypt(&key, b"hello").unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 1;
        assert!(ae_decrypt(&key, &ct).is_err());
    }
}
