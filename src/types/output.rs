use serde::{Deserialize, Serialize};

use super::asset::{AssetType, Location};
use super::factor::{FactorSet, Improvements};

/// The option chosen from one improvement table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub benefit: f64,
    pub cost: f64,
    /// Index of the chosen point; `None` means no improvement was available.
    pub index: Option<usize>,
}

impl Selection {
    /// The (0, 0) identity used when a table offers nothing.
    pub const NONE: Selection = Selection {
        benefit: 0.0,
        cost: 0.0,
        index: None,
    };

    pub fn is_none(&self) -> bool {
        self.index.is_none()
    }
}

/// Optimized result for one asset (one per trial inside a sweep).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub id: u32,
    pub asset_type: AssetType,
    pub location: Location,
    /// Post-selection factor values; %(dam) is carried through.
    pub factors: FactorSet<f64>,
    pub theta: f64,
    pub delta_theta: f64,
    pub total_cost: f64,
    pub costs: Improvements<f64>,
    /// Trial index when produced by a sweep.
    pub run: Option<u32>,
}
