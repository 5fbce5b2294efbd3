//! Sensitivity sweep: deviate selected improvements under a controlled
//! coverage rate and measure how the population averages move.

mod deviation;
mod report;
mod sweep;
mod tally;

pub use deviation::{CounterPolicy, DeviationState};
pub use report::{write_json, write_sensitivity, write_sensitivity_file};
pub use sweep::{StepSummary, SweepConfig, SweepReport, SweepRunner};
pub use tally::PointTally;
