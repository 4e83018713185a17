//! McDataOwner: a thin convenience wrapper pairing an `owner_id` with the
//! two calls every add/delete needs to make — `McGatekeeper::update` then
//! `McServer::update` with the resulting metadata.

use crate::core::types::Operation;
use crate::error::Result;

use super::gatekeeper::McGatekeeper;
use super::server::McServer;

/// Binds an `owner_id` so callers don't have to repeat it on every call.
#[derive(Debug, Clone)]
pub struct McDataOwner {
    owner_id: String,
}

impl McDataOwner {
    /// Wraps an already-registered owner id. Does not itself register the
    /// owner with the gatekeeper.
    pub fn new(owner_id: impl Into<String>) -> Self {
        McDataOwner {
            owner_id: owner_id.into(),
        }
    }

    /// The wrapped owner id.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Inserts `(id, keyword)` into the index.
    pub fn add(&self, gatekeeper: &mut McGatekeeper, server: &mut McServer, id: &[u8], keyword: &[u8]) -> Result<()> {
        let meta = gatekeeper.update(&self.owner_id, Operation::Add, id, keyword)?;
        server.update(&self.owner_id, &meta);
        Ok(())
    }

    /// Logically removes `(id, keyword)` from the index.
    pub fn delete(&self, gatekeeper: &mut McGatekeeper, server: &mut McServer, id: &[u8], keyword: &[u8]) -> Result<()> {
        let meta = gatekeeper.update(&self.owner_id, Operation::Del, id, keyword)?;
        server.update(&self.owner_id, &meta);
        Ok(())
    }
}
