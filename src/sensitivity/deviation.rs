use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::COVERAGE_WINDOW;
use crate::types::Percent;

/// How the rolling counters behave across trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterPolicy {
    /// One counter per factor for the whole sweep, never reset.
    #[default]
    Continuous,
    /// Re-seed each counter at the start of every trial to a uniform value in
    /// `[0, 100 - coverage]`.
    RandomPhase,
}

/// Rolling counter plus cumulative diagnostics for one risk factor.
///
/// Over any `COVERAGE_WINDOW` consecutive calls to [`deviate`](Self::deviate)
/// with the same coverage `k`, exactly `k` of them fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviationState {
    counter: u32,
    /// Number of deviation decisions taken (including skipped factors).
    pub evaluated: u64,
    /// Number of decisions that actually perturbed the value.
    pub deviated: u64,
}

impl DeviationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given counter position.
    pub fn with_counter(counter: u32) -> Self {
        Self {
            counter: counter % COVERAGE_WINDOW,
            ..Self::default()
        }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Advance the counter and scale `value` by `1 + deviation_pct / 100`
    /// when it lands inside the coverage window. Results are capped at 1.0.
    pub fn deviate(&mut self, value: f64, coverage: Percent, deviation_pct: f64) -> f64 {
        self.evaluated += 1;
        self.counter += 1;

        let mut out = value;
        if self.counter <= u32::from(coverage.get()) {
            self.deviated += 1;
            out = (value * (1.0 + deviation_pct / 100.0)).min(1.0);
        }
        if self.counter >= COVERAGE_WINDOW {
            self.counter = 0;
        }
        out
    }

    /// Count a decision for a factor whose coverage is zero. The counter is
    /// left alone.
    pub fn skip(&mut self) {
        self.evaluated += 1;
    }

    /// Move the counter to a random phase that still leaves room for a full
    /// run of `coverage` firings before the window wraps.
    pub fn reseed<R: Rng>(&mut self, rng: &mut R, coverage: Percent) {
        let span = COVERAGE_WINDOW - u32::from(coverage.get());
        self.counter = rng.gen_range(0..=span) % COVERAGE_WINDOW;
    }

    /// Fraction of decisions that deviated, `None` before any decision.
    pub fn ratio(&self) -> Option<f64> {
        (self.evaluated > 0).then(|| self.deviated as f64 / self.evaluated as f64)
    }
}
