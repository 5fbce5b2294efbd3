//! Greedy benefit/cost optimization per asset and risk factor.

mod compose;
mod select;

pub use compose::{compose_output, compose_with_damage};
pub use select::{select_all, select_best};

use tracing::info;

use crate::types::{OutputRecord, TabledAsset};

/// Optimize every asset once.
pub fn optimize_population(assets: &[TabledAsset]) -> Vec<OutputRecord> {
    let outputs: Vec<OutputRecord> = assets
        .iter()
        .map(|t| compose_output(&t.asset, &select_all(&t.tables)))
        .collect();

    let total_cost: f64 = outputs.iter().map(|o| o.total_cost).sum();
    let improved = outputs.iter().filter(|o| o.delta_theta != 0.0).count();
    info!(
        assets = outputs.len(),
        improved,
        total_cost,
        "Optimized asset population"
    );
    outputs
}
