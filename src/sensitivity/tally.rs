use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{FactorSet, RiskFactor, TabledAsset};

/// Table point totals for a loaded population.
///
/// %(dam) has no table; its count is one per asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointTally {
    pub assets: usize,
    pub points: FactorSet<usize>,
}

impl PointTally {
    pub fn from_assets(assets: &[TabledAsset]) -> Self {
        let mut tally = Self {
            assets: assets.len(),
            ..Self::default()
        };
        for tabled in assets {
            for (factor, table) in tabled.tables.iter() {
                tally.points[factor] += table.len();
            }
        }
        tally.points.dam = assets.len();
        tally
    }

    pub fn log(&self) {
        info!(
            assets = self.assets,
            dis = self.points[RiskFactor::Dis],
            def = self.points[RiskFactor::Def],
            den = self.points[RiskFactor::Den],
            dim = self.points[RiskFactor::Dim],
            dam = self.points[RiskFactor::Dam],
            "Tallied table points"
        );
    }
}
