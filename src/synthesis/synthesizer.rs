//! Improvement table synthesis.
//!
//! For every asset four tables are produced in file order:
//! - P(dis): shared by all assets of the same type (cached)
//! - P(def): fresh per asset
//! - P(den): fresh per asset
//! - P(dim): shared by all assets at the same location (cached)
//!
//! Shared tables have their costs divided by the number of assets in the
//! class, so the class-wide plan cost stays fixed however many assets use it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cache::{ClassKey, TableCache};
use super::gate::bernoulli;
use super::tally::PopulationTally;
use crate::consts::{MAX_COST, MAX_POINTS, MIN_COST};
use crate::types::{
    AssetRecord, AssetType, ImprovementTable, Improvements, Location, Percent, Point, RiskFactor,
    TabledAsset,
};

/// Omission rates for table synthesis.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Share of assets whose P(def)/P(den) tables are left empty.
    pub asset_skip: Percent,
    /// Share of asset types with an empty P(dis) table.
    pub type_skip: Percent,
    /// Share of locations with an empty P(dim) table.
    pub location_skip: Percent,
}

/// Draw a random table of 0..=10 points above `lower`.
///
/// Each benefit is drawn from `[lower, upper)` and stored relative to `lower`.
/// Costs are whole units in `[MIN_COST, MAX_COST]`, independent of the benefit.
pub fn synthesize<R: Rng>(rng: &mut R, lower: f64, upper: f64) -> ImprovementTable {
    let count = rng.gen_range(0..=MAX_POINTS);
    let points = (0..count)
        .map(|_| {
            let raw = if upper > lower {
                rng.gen_range(lower..upper)
            } else {
                lower
            };
            let cost = rng.gen_range(MIN_COST..=MAX_COST);
            Point::new(raw - lower, f64::from(cost))
        })
        .collect();
    ImprovementTable::from_bounded(points)
}

/// Counters describing one synthesis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SynthesisStats {
    pub assets: usize,
    pub assets_generated: usize,
    pub assets_skipped: usize,
    pub types_seen: usize,
    pub types_generated: usize,
    pub types_skipped: usize,
    pub locations_seen: usize,
    pub locations_generated: usize,
    pub locations_skipped: usize,
    pub max_type: Option<AssetType>,
    pub max_location: Option<Location>,
}

impl SynthesisStats {
    /// `skipped / seen` as a percentage, `None` when nothing was seen.
    pub fn skip_rate(skipped: usize, seen: usize) -> Option<f64> {
        (seen > 0).then(|| skipped as f64 / seen as f64 * 100.0)
    }

    fn note_class(&mut self, key: ClassKey, skipped: bool) {
        let (seen, generated, skip) = match key {
            ClassKey::Type(_) => (
                &mut self.types_seen,
                &mut self.types_generated,
                &mut self.types_skipped,
            ),
            ClassKey::Location(_) => (
                &mut self.locations_seen,
                &mut self.locations_generated,
                &mut self.locations_skipped,
            ),
        };
        *seen += 1;
        if skipped {
            *skip += 1;
        } else {
            *generated += 1;
        }
    }

    fn note_asset(&mut self, asset: &AssetRecord) {
        self.assets += 1;
        self.max_type = self.max_type.max(Some(asset.asset_type));
        self.max_location = self.max_location.max(Some(asset.location));
    }

    pub fn log_summary(&self) {
        info!(
            assets = self.assets,
            generated = self.assets_generated,
            skipped = self.assets_skipped,
            skipped_pct = ?Self::skip_rate(self.assets_skipped, self.assets),
            "Asset tables"
        );
        info!(
            types = self.types_seen,
            generated = self.types_generated,
            skipped = self.types_skipped,
            skipped_pct = ?Self::skip_rate(self.types_skipped, self.types_seen),
            max_type = ?self.max_type.map(AssetType::get),
            "P(dis) type tables"
        );
        info!(
            locations = self.locations_seen,
            generated = self.locations_generated,
            skipped = self.locations_skipped,
            skipped_pct = ?Self::skip_rate(self.locations_skipped, self.locations_seen),
            max_location = ?self.max_location.map(Location::get),
            "P(dim) location tables"
        );
    }
}

/// Produces the four tables for each asset of a population.
#[derive(Debug)]
pub struct TableSynthesizer {
    config: SynthesisConfig,
    tally: PopulationTally,
    cache: TableCache,
    stats: SynthesisStats,
}

impl TableSynthesizer {
    /// `tally` must describe the whole population that will be synthesized;
    /// shared costs are divided by its class counts.
    pub fn new(config: SynthesisConfig, tally: PopulationTally) -> Self {
        Self {
            config,
            tally,
            cache: TableCache::new(),
            stats: SynthesisStats::default(),
        }
    }

    /// Cached class table for `key`, generated on first request.
    ///
    /// `class_value` is the class's current factor value and becomes the
    /// lower bound of every benefit draw.
    pub fn synthesize_or_skip<R: Rng>(
        &mut self,
        rng: &mut R,
        key: ClassKey,
        class_value: f64,
    ) -> ImprovementTable {
        if let Some(table) = self.cache.get(key) {
            return table.clone();
        }

        let skip_pct = match key {
            ClassKey::Type(_) => self.config.type_skip,
            ClassKey::Location(_) => self.config.location_skip,
        };
        let skipped = bernoulli(rng, skip_pct);
        let table = if skipped {
            ImprovementTable::empty()
        } else {
            let mut table = synthesize(rng, class_value, key.factor().max_value());
            table.share_costs(self.tally.sharers(key));
            table
        };
        self.stats.note_class(key, skipped);
        debug!(
            ?key,
            skipped,
            points = table.len(),
            sharers = self.tally.sharers(key),
            "Generated class table"
        );
        self.cache.get_or_insert_with(key, || table).clone()
    }

    /// The four tables for one asset.
    pub fn tables_for<R: Rng>(
        &mut self,
        rng: &mut R,
        asset: &AssetRecord,
    ) -> Improvements<ImprovementTable> {
        self.stats.note_asset(asset);

        let dis = self.synthesize_or_skip(rng, ClassKey::Type(asset.asset_type), asset.factors.dis);
        let dim = self.synthesize_or_skip(
            rng,
            ClassKey::Location(asset.location),
            asset.factors.dim,
        );

        let (def, den) = if bernoulli(rng, self.config.asset_skip) {
            self.stats.assets_skipped += 1;
            (ImprovementTable::empty(), ImprovementTable::empty())
        } else {
            self.stats.assets_generated += 1;
            (
                synthesize(rng, asset.factors.def, RiskFactor::Def.max_value()),
                synthesize(rng, asset.factors.den, RiskFactor::Den.max_value()),
            )
        };

        Improvements { dis, def, den, dim }
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    pub fn stats(&self) -> &SynthesisStats {
        &self.stats
    }
}

/// Synthesize tables for a whole population in one call.
pub fn synthesize_population<R: Rng>(
    assets: &[AssetRecord],
    config: SynthesisConfig,
    rng: &mut R,
) -> (Vec<TabledAsset>, SynthesisStats) {
    let tally = PopulationTally::from_assets(assets);
    let mut synth = TableSynthesizer::new(config, tally);
    let tabled = assets
        .iter()
        .map(|asset| TabledAsset {
            asset: asset.clone(),
            tables: synth.tables_for(rng, asset),
        })
        .collect();
    synth.stats().log_summary();
    (tabled, synth.stats)
}
