//! Scripted experiments exercising the scheme end to end, dispatched by
//! name from [`crate::bin::nomos`] (the CLI) or directly in tests.

pub mod benchmark;
pub mod mc_odxt;
pub mod nomos_simplified;
pub mod verifiable;

use crate::experiment::Experiment;
use crate::error::{NomosError, Result};

pub use benchmark::BenchmarkExperiment;
pub use mc_odxt::McOdxtExperiment;
pub use nomos_simplified::NomosSimplifiedExperiment;
pub use verifiable::VerifiableExperiment;

/// The names accepted by [`by_name`], in registration order.
pub const EXPERIMENT_NAMES: &[&str] = &["nomos-simplified", "mc-odxt", "verifiable", "benchmark"];

/// Looks up a freshly constructed experiment by its registered name.
pub fn by_name(name: &str) -> Result<Box<dyn Experiment>> {
    match name {
        "nomos-simplified" => Ok(Box::new(NomosSimplifiedExperiment::new())),
        "mc-odxt" => Ok(Box::new(McOdxtExperiment::new())),
        "verifiable" => Ok(Box::new(VerifiableExperiment::new())),
        "benchmark" => Ok(Box::new(BenchmarkExperiment::new())),
        other => Err(NomosError::InitError {
            reason: format!(
                "unknown experiment \"{other}\"; expected one of {EXPERIMENT_NAMES:?}"
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_name_resolves() {
        for name in EXPERIMENT_NAMES {
            let exp = by_name(name).unwrap();
            assert_eq!(exp.name(), *name);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(by_name("does-not-exist").is_err());
    }
}
