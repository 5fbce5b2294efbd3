#![deny(unreachable_pub)]

// Core modules
pub mod consts;
mod errors;
pub mod types;

// Record files
pub mod records;

// Pipeline stages
pub mod generator;
pub mod optimizer;
pub mod sensitivity;
pub mod synthesis;

// Infrastructure
pub mod config;
pub mod logging;

#[cfg(test)]
mod tests;

// Re-exports
pub use config::{make_rng, AppConfig, GeneratorConfig};
pub use errors::{Error, ParseError, Result};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use optimizer::{compose_output, optimize_population, select_best};
pub use sensitivity::{CounterPolicy, DeviationState, SweepConfig, SweepReport, SweepRunner};
pub use synthesis::{synthesize_population, SynthesisConfig, SynthesisStats, TableSynthesizer};
pub use types::*;
