use std::collections::HashMap;

use super::cache::ClassKey;
use crate::types::{AssetRecord, AssetType, Location};

/// Asset counts per type and per location, gathered in a first pass.
#[derive(Debug, Clone, Default)]
pub struct PopulationTally {
    pub assets: usize,
    pub by_type: HashMap<AssetType, usize>,
    pub by_location: HashMap<Location, usize>,
}

impl PopulationTally {
    pub fn from_assets<'a>(assets: impl IntoIterator<Item = &'a AssetRecord>) -> Self {
        let mut tally = Self::default();
        for asset in assets {
            tally.record(asset);
        }
        tally
    }

    pub fn record(&mut self, asset: &AssetRecord) {
        self.assets += 1;
        *self.by_type.entry(asset.asset_type).or_default() += 1;
        *self.by_location.entry(asset.location).or_default() += 1;
    }

    /// Number of assets sharing the cached table for `key`.
    pub fn sharers(&self, key: ClassKey) -> usize {
        match key {
            ClassKey::Type(t) => self.by_type.get(&t).copied().unwrap_or(0),
            ClassKey::Location(l) => self.by_location.get(&l).copied().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FactorSet;

    fn asset(id: u32, t: i64, l: i64) -> AssetRecord {
        AssetRecord::new(
            id,
            AssetType::new(t).unwrap(),
            Location::new(l).unwrap(),
            FactorSet::from_fn(|_| 0.01),
        )
    }

    #[test]
    fn test_counts() {
        let assets = vec![asset(1, 5, 2), asset(2, 5, 3), asset(3, 1, 3)];
        let tally = PopulationTally::from_assets(&assets);
        assert_eq!(tally.assets, 3);
        assert_eq!(tally.sharers(ClassKey::Type(AssetType::new(5).unwrap())), 2);
        assert_eq!(tally.sharers(ClassKey::Location(Location::new(3).unwrap())), 2);
        assert_eq!(tally.sharers(ClassKey::Type(AssetType::new(9).unwrap())), 0);
    }
}
