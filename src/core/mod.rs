//! The base single-owner scheme: key holder, encrypted storage, and the
//! client-side token/result handling that ties them together.

pub mod client;
pub mod gatekeeper;
pub mod server;
pub mod types;

pub use client::{decrypt_results, prepare_search};
pub use gatekeeper::Gatekeeper;
pub use server::Server;
pub use types::{Operation, SearchRequest, SearchResultEntry, SearchToken, TSetEntry, UpdateMetadata};
