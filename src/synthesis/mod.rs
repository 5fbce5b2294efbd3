//! Improvement table synthesis.
//!
//! # Pipeline
//!
//! ```text
//! assets ─→ PopulationTally (first pass)
//!    │
//!    └────→ TableSynthesizer ─→ TableCache (P(dis) by type, P(dim) by location)
//!                 │
//!                 └─→ TabledAsset (four tables per asset)
//! ```

mod cache;
mod gate;
mod synthesizer;
mod tally;

pub use cache::{ClassKey, TableCache};
pub use gate::bernoulli;
pub use synthesizer::{
    synthesize, synthesize_population, SynthesisConfig, SynthesisStats, TableSynthesizer,
};
pub use tally::PopulationTally;
