//! The verifiable extension: a Merkle-tree ("QTree") authentication
//! structure over XSet membership, plus address commitments that bind each
//! update to its full cross-tag set, so a client can detect server
//! tampering with an opened result.

pub mod commitment;
pub mod index;
pub mod qtree;

pub use commitment::{check_subset_membership, commit, verify as verify_commitment};
pub use index::{verify_opened, OpenedEntry, VerifiableServer};
pub use qtree::{MembershipProof, Proof, QTree};
