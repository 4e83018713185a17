//! The multi-client extension: a per-owner keyspace plus a keyword-scoped
//! authorization table layered over the base scheme, with storage
//! partitioned so that owners cannot observe each other's entries.

pub mod client;
pub mod data_owner;
pub mod gatekeeper;
pub mod server;
pub mod types;

pub use client::{decrypt_results_for_owner, prepare_search_for_owner};
pub use data_owner::McDataOwner;
pub use gatekeeper::McGatekeeper;
pub use server::McServer;
pub use types::Authorization;
