//! Domain constants shared by the generator, synthesizer and sweep.

/// Lowest asset type id.
pub const MIN_TYPE: u8 = 1;
/// Highest asset type id.
pub const MAX_TYPE: u8 = 13;
/// Highest type id of the CBRN class; types above are critical infrastructure.
pub const MAX_CBRN_TYPE: u8 = 4;

/// Lowest location id.
pub const MIN_LOC: u8 = 1;
/// Highest location id.
pub const MAX_LOC: u8 = 50;

/// Lower bound shared by every risk factor.
pub const MIN_VAL: f64 = 0.001;
pub const MAX_DIS: f64 = 0.01;
pub const MAX_DEF: f64 = 0.70;
pub const MAX_DEN: f64 = 0.10;
pub const MAX_DIM: f64 = 0.50;
pub const MAX_DAM: f64 = 0.01;

/// Improvement option cost bounds (whole currency units).
pub const MIN_COST: u32 = 10;
pub const MAX_COST: u32 = 10_000;

/// Capacity of one improvement table.
pub const MAX_POINTS: usize = 10;

/// Highest deviation step index; the ladder runs 0..=MAX_STEPS.
pub const MAX_STEPS: u32 = 10;
/// Upper bound accepted for a configured step ladder.
pub const MAX_SWEEP_STEPS: u32 = 1_000;
/// Deviation added per step, as a fraction.
pub const STEP_INCR: f64 = 0.10;

/// Width of the rolling deviation window.
pub const COVERAGE_WINDOW: u32 = 100;

/// Numeric end-of-stream marker written as the last line of every record file.
pub const END_OF_STREAM: i64 = -1;
