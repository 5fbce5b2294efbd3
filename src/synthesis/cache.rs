use std::collections::HashMap;

use crate::types::{AssetRecord, AssetType, ImprovementTable, Location, RiskFactor};

/// Key of a class-shared improvement table.
///
/// P(dis) plans belong to an asset type, P(dim) plans to a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKey {
    Type(AssetType),
    Location(Location),
}

impl ClassKey {
    pub fn factor(self) -> RiskFactor {
        match self {
            ClassKey::Type(_) => RiskFactor::Dis,
            ClassKey::Location(_) => RiskFactor::Dim,
        }
    }

    /// Class key of `asset` for a class-shared factor; `None` for per-asset factors.
    pub fn for_asset(asset: &AssetRecord, factor: RiskFactor) -> Option<Self> {
        match factor {
            RiskFactor::Dis => Some(ClassKey::Type(asset.asset_type)),
            RiskFactor::Dim => Some(ClassKey::Location(asset.location)),
            _ => None,
        }
    }
}

/// Class-shared tables generated so far in a run.
///
/// A key that was never generated is absent (`get` returns `None`); a class
/// that was skipped holds an empty table.
#[derive(Debug, Clone, Default)]
pub struct TableCache {
    tables: HashMap<ClassKey, ImprovementTable>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: ClassKey) -> Option<&ImprovementTable> {
        self.tables.get(&key)
    }

    pub fn contains(&self, key: ClassKey) -> bool {
        self.tables.contains_key(&key)
    }

    /// Cached table for `key`, generating it with `make` on first use.
    pub fn get_or_insert_with(
        &mut self,
        key: ClassKey,
        make: impl FnOnce() -> ImprovementTable,
    ) -> &ImprovementTable {
        self.tables.entry(key).or_insert_with(make)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
