//! Step-load benchmark driver.
//!
//! Invokes an external load-generation runner once per connection count, reads the metrics file
//! each run leaves behind, and reports a table plus a JSON summary.
pub mod cli;
pub mod driver;
mod error;
pub mod report;
pub mod runner;

pub use crate::driver::{find_results_dir, run_step_load, Report, StepLoad, StepOutcome};
pub use crate::error::{ReportError, TrialFailure};
pub use crate::runner::{Invocation, LocalRunner, ProcessRunner, RunOutput, Runner};
