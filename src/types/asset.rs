//! Asset records: the population the whole pipeline operates on.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::factor::{FactorSet, RiskFactor};
use crate::consts::{MAX_CBRN_TYPE, MAX_LOC, MAX_TYPE, MIN_LOC, MIN_TYPE};

/// Asset type id in 1..=13.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetType(u8);

/// Advisory grouping of asset types. The algorithms treat every type alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    /// Types 1..=4
    Cbrn,
    /// Types 5..=13
    CriticalInfrastructure,
}

impl AssetType {
    /// `None` if `id` is outside 1..=13.
    pub fn new(id: i64) -> Option<Self> {
        (i64::from(MIN_TYPE)..=i64::from(MAX_TYPE))
            .contains(&id)
            .then_some(AssetType(id as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn class(self) -> AssetClass {
        if self.0 <= MAX_CBRN_TYPE {
            AssetClass::Cbrn
        } else {
            AssetClass::CriticalInfrastructure
        }
    }

    /// Uniform draw over 1..=13.
    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        AssetType(rng.gen_range(MIN_TYPE..=MAX_TYPE))
    }

    /// Every valid type, ascending.
    pub fn all() -> impl Iterator<Item = AssetType> {
        (MIN_TYPE..=MAX_TYPE).map(AssetType)
    }
}

/// Location id in 1..=50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location(u8);

impl Location {
    /// `None` if `id` is outside 1..=50.
    pub fn new(id: i64) -> Option<Self> {
        (i64::from(MIN_LOC)..=i64::from(MAX_LOC))
            .contains(&id)
            .then_some(Location(id as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Uniform draw over 1..=50.
    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        Location(rng.gen_range(MIN_LOC..=MAX_LOC))
    }

    /// Every valid location, ascending.
    pub fn all() -> impl Iterator<Item = Location> {
        (MIN_LOC..=MAX_LOC).map(Location)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One protected site with its baseline risk factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: u32,
    pub asset_type: AssetType,
    pub location: Location,
    pub factors: FactorSet<f64>,
    /// Stored risk score (theta). May carry rounding from the producer.
    pub theta: f64,
}

impl AssetRecord {
    /// Build a record whose stored score is the exact factor product.
    pub fn new(id: u32, asset_type: AssetType, location: Location, factors: FactorSet<f64>) -> Self {
        let theta = theta_of(&factors);
        Self {
            id,
            asset_type,
            location,
            factors,
            theta,
        }
    }

    pub fn factor(&self, factor: RiskFactor) -> f64 {
        self.factors[factor]
    }

    /// Product of the five factors, ignoring the stored score.
    pub fn recomputed_theta(&self) -> f64 {
        theta_of(&self.factors)
    }
}

/// Risk score: product of all five factors.
pub fn theta_of(factors: &FactorSet<f64>) -> f64 {
    factors.dis * factors.def * factors.den * factors.dim * factors.dam
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_and_location_ranges() {
        assert!(AssetType::new(0).is_none());
        assert!(AssetType::new(14).is_none());
        assert_eq!(AssetType::new(4).unwrap().class(), AssetClass::Cbrn);
        assert_eq!(
            AssetType::new(5).unwrap().class(),
            AssetClass::CriticalInfrastructure
        );
        assert!(Location::new(50).is_some());
        assert!(Location::new(51).is_none());
        assert_eq!(AssetType::all().count(), 13);
        assert_eq!(Location::all().count(), 50);
    }

    #[test]
    fn test_theta_is_product() {
        let factors = FactorSet {
            dis: 0.005,
            def: 0.5,
            den: 0.05,
            dim: 0.2,
            dam: 0.004,
        };
        let asset = AssetRecord::new(
            1,
            AssetType::new(3).unwrap(),
            Location::new(7).unwrap(),
            factors,
        );
        let expected = 0.005 * 0.5 * 0.05 * 0.2 * 0.004;
        assert!((asset.theta - expected).abs() < 1e-18);
        assert_eq!(asset.recomputed_theta(), asset.theta);
    }
}
