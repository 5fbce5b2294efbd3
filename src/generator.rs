//! Synthetic asset population.
//!
//! P(dis) is drawn once per asset type and P(dim) once per location, so every
//! asset in a class shares the same value. The remaining factors are drawn per
//! asset. Records are numbered 1..=n.

use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, info};

use crate::consts::{MAX_DAM, MAX_DEF, MAX_DEN, MAX_DIM, MAX_DIS, MIN_VAL};
use crate::types::{AssetRecord, AssetType, FactorSet, Location};

/// Class-level factor values shared by a generated population.
#[derive(Debug, Clone)]
pub struct ClassFactors {
    pub type_dis: HashMap<AssetType, f64>,
    pub location_dim: HashMap<Location, f64>,
}

impl ClassFactors {
    /// Draw P(dis) for every type and P(dim) for every location.
    pub fn draw<R: Rng>(rng: &mut R) -> Self {
        let type_dis = AssetType::all()
            .map(|t| (t, rng.gen_range(MIN_VAL..=MAX_DIS)))
            .collect();
        let location_dim = Location::all()
            .map(|l| (l, rng.gen_range(MIN_VAL..=MAX_DIM)))
            .collect();
        Self {
            type_dis,
            location_dim,
        }
    }
}

/// Generate `count` assets.
pub fn generate_population<R: Rng>(count: u32, rng: &mut R) -> Vec<AssetRecord> {
    let classes = ClassFactors::draw(rng);
    let assets: Vec<AssetRecord> = (1..=count)
        .map(|id| generate_asset(id, &classes, rng))
        .collect();
    info!(count = assets.len(), "Generated asset population");
    assets
}

fn generate_asset<R: Rng>(id: u32, classes: &ClassFactors, rng: &mut R) -> AssetRecord {
    let asset_type = AssetType::sample(rng);
    let location = Location::sample(rng);

    let factors = FactorSet {
        dis: classes.type_dis.get(&asset_type).copied().unwrap_or(MIN_VAL),
        def: rng.gen_range(MIN_VAL..=MAX_DEF),
        den: rng.gen_range(MIN_VAL..=MAX_DEN),
        dim: classes.location_dim.get(&location).copied().unwrap_or(MIN_VAL),
        dam: rng.gen_range(MIN_VAL..=MAX_DAM),
    };
    let asset = AssetRecord::new(id, asset_type, location, factors);
    debug!(
        id,
        asset_type = asset.asset_type.get(),
        location = asset.location.get(),
        theta = asset.theta,
        "Generated asset"
    );
    asset
}
