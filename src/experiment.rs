//! The `Experiment` contract the CLI dispatches on: `setup`/`run`/
//! `teardown`/`name`.

use crate::error::Result;

/// Every registered experiment implements this.
pub trait Experiment {
    /// Prepares the experiment's state. Called once before `run`.
    fn setup(&mut self) -> Result<()>;

    /// Runs the experiment body.
    fn run(&mut self) -> Result<()>;

    /// Releases any resources the experiment holds. Called once after
    /// `run`, even if `run` failed.
    fn teardown(&mut self);

    /// The experiment's registered name, as accepted on the CLI.
    fn name(&self) -> &str;
}
