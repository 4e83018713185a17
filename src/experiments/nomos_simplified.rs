//! The default experiment: exercises the base single-owner scheme end to
//! end — a handful of updates, a conjunctive search, and a DEL that shadows
//! an earlier ADD.

use tracing::info;

use crate::core::client::{decrypt_results, prepare_search};
use crate::core::gatekeeper::Gatekeeper;
use crate::core::server::Server;
use crate::core::types::Operation;
use crate::error::Result;
use crate::experiment::Experiment;

/// Runs a small scripted scenario against the base scheme.
pub struct NomosSimplifiedExperiment {
    gatekeeper: Option<Gatekeeper>,
    server: Server,
}

impl NomosSimplifiedExperiment {
    /// A fresh, not-yet-set-up experiment.
    pub fn new() -> Self {
        NomosSimplifiedExperiment {
            gatekeeper: None,
            server: Server::new(),
        }
    }
}

impl Default for NomosSimplifiedExperiment {
    fn default() -> Self {
        Self::new()
    }
}

impl Experiment for NomosSimplifiedExperiment {
    fn setup(&mut self) -> Result<()> {
        self.gatekeeper = Some(Gatekeeper::setup(10)?);
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        let gatekeeper = self.gatekeeper.as_mut().expect("setup must run before run");

        let docs: &[(&[u8], &[u8])] = &[
            (b"doc1", b"crypto"),
            (b"doc1", b"security"),
            (b"doc2", b"crypto"),
            (b"doc3", b"security"),
        ];
        for (id, keyword) in docs {
            let meta = gatekeeper.update(Operation::Add, id, keyword);
            self.server.update(&meta);
        }
        info!(tset_size = self.server.tset_len(), xset_size = self.server.xset_len(), "index built");

        let query = vec![b"crypto".to_vec(), b"security".to_vec()];
        let token = gatekeeper.gen_token_simplified(&query)?;
        let req = prepare_search(&token, &query, gatekeeper.update_counts())?;
        let results = self.server.search(&req);
        let ids = decrypt_results(&results, &token)?;
        info!(?ids, "conjunctive search complete");

        let del_meta = gatekeeper.update(Operation::Del, b"doc1", b"crypto");
        self.server.update(&del_meta);
        let token2 = gatekeeper.gen_token_simplified(&[b"crypto".to_vec()])?;
        let req2 = prepare_search(&token2, &[b"crypto".to_vec()], gatekeeper.update_counts())?;
        let results2 = self.server.search(&req2);
        let ids2 = decrypt_results(&results2, &token2)?;
        info!(?ids2, "post-DEL search for \"crypto\" alone");

        Ok(())
    }

    fn teardown(&mut self) {
        self.gatekeeper = None;
        self.server = Server::new();
    }

    fn name(&self) -> &str {
        "nomos-simplified"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_end_to_end_without_error() {
        let mut exp = NomosSimplifiedExperiment::new();
        exp.setup().unwrap();
        exp.run().unwrap();
        exp.teardown();
    }
}
