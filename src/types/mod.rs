//! Core record types shared by every stage.

mod asset;
mod factor;
mod output;
mod percent;
mod table;

pub use asset::{theta_of, AssetClass, AssetRecord, AssetType, Location};
pub use factor::{FactorSet, Improvements, RiskFactor};
pub use output::{OutputRecord, Selection};
pub use percent::Percent;
pub use table::{ImprovementTable, Point, TabledAsset};
