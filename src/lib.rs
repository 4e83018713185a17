//! A dynamic searchable symmetric encryption scheme over conjunctive keyword
//! queries, in the ODXT family: a client-held [`Gatekeeper`](crate::core::gatekeeper::Gatekeeper)
//! issues update metadata and search tokens, and a (passively honest, not
//! necessarily trusted with plaintext) [`Server`](crate::core::server::Server) holds
//! an encrypted forward index (TSet) plus a cross-tag set (XSet) that lets it
//! filter conjunctive queries down to candidate results without ever
//! learning a keyword, an identifier, or which entries matched which clause.
//!
//! Cross-tag filtering is pairing-free: rather than evaluating a bilinear
//! pairing, the server raises a client-supplied `xtoken` to a candidate
//! entry's own per-update scalar and checks set membership. See
//! [`curve`] for the group this crate settles on and why.
//!
//! # Modules
//!
//! * [`core`] — the base single-owner scheme: `core::gatekeeper` (client
//!   key material and token generation), `core::server` (encrypted
//!   storage and search), `core::client` (token decryption with
//!   DEL-shadowing).
//! * [`verifiable`] — a Merkle-tree ("QTree") authentication structure over
//!   XSet membership, plus address commitments, for a server that must
//!   prove it searched correctly.
//! * [`multiclient`] — a multi-data-owner, multi-search-user extension with
//!   per-owner keyspaces and keyword-scoped authorization grants.
//! * [`cpabe`] — type shapes for a ciphertext-policy ABE layer the scheme
//!   anticipates but does not implement.
//! * [`experiment`] and [`experiments`] — the CLI-driven experiment harness
//!   used to exercise and benchmark the above.

pub mod cpabe;
pub mod curve;
pub mod error;
pub mod experiment;
pub mod experiments;
pub mod multiclient;
pub mod prf;

pub mod core;
pub mod verifiable;

pub use error::{NomosError, Result};
