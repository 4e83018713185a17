//! Exercises the multi-client extension: two data owners, one search user
//! authorized against only one of them, demonstrating both a successful
//! authorized search and the cross-owner isolation guarantee.

use std::time::SystemTime;

use tracing::info;

use crate::error::{NomosError, Result};
use crate::experiment::Experiment;
use crate::multiclient::client::{decrypt_results_for_owner, prepare_search_for_owner};
use crate::multiclient::data_owner::McDataOwner;
use crate::multiclient::gatekeeper::McGatekeeper;
use crate::multiclient::server::McServer;

/// Runs a small scripted multi-owner, multi-user scenario.
pub struct McOdxtExperiment {
    gatekeeper: McGatekeeper,
    server: McServer,
}

impl McOdxtExperiment {
    /// A fresh, not-yet-set-up experiment.
    pub fn new() -> Self {
        McOdxtExperiment {
            gatekeeper: McGatekeeper::new(),
            server: McServer::new(),
        }
    }
}

impl Default for McOdxtExperiment {
    fn default() -> Self {
        Self::new()
    }
}

impl Experiment for McOdxtExperiment {
    fn setup(&mut self) -> Result<()> {
        self.gatekeeper.register_data_owner("alice")?;
        self.gatekeeper.register_data_owner("carol")?;
        self.gatekeeper.register_search_user("bob")?;
        self.gatekeeper.grant_authorization("alice", "bob", [b"crypto".to_vec()], None);
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let alice = McDataOwner::new("alice");
        let carol = McDataOwner::new("carol");
        alice.add(&mut self.gatekeeper, &mut self.server, b"doc1", b"crypto")?;
        carol.add(&mut self.gatekeeper, &mut self.server, b"rival-doc", b"crypto")?;

        let query = vec![b"crypto".to_vec()];
        let token = self
            .gatekeeper
            .gen_token("alice", "bob", &query, SystemTime::now())?;
        let counts = self.gatekeeper.update_counts("alice")?;
        let req = prepare_search_for_owner(&token, &query, counts)?;
        let results = self.server.search("alice", &req);
        let ids = decrypt_results_for_owner(&results, &token)?;
        info!(?ids, "authorized search against alice's index");

        match self.gatekeeper.gen_token("carol", "bob", &query, SystemTime::now()) {
            Err(NomosError::UnauthorizedError { .. }) => {
                info!("bob correctly denied against carol's index");
            }
            Ok(_) => {
                return Err(NomosError::InitError {
                    reason: "expected unauthorized access to carol's index to be denied".into(),
                });
            }
            Err(other) => return Err(other),
        }

        Ok(())
    }

    fn teardown(&mut self) {
        self.gatekeeper = McGatekeeper::new();
        self.server = McServer::new();
    }

    fn name(&self) -> &str {
        "mc-odxt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_end_to_end_without_error() {
        let mut exp = McOdxtExperiment::new();
        exp.setup().unwrap();
        exp.run().unwrap();
        exp.teardown();
    }
}
