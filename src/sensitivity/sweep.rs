use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::deviation::{CounterPolicy, DeviationState};
use super::tally::PointTally;
use crate::consts::{MAX_STEPS, MAX_SWEEP_STEPS, STEP_INCR};
use crate::errors::{Error, Result};
use crate::optimizer::{compose_with_damage, select_all};
use crate::types::{FactorSet, Improvements, OutputRecord, Percent, RiskFactor, Selection, TabledAsset};

/// Parameters of one sensitivity sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Trials per magnitude step.
    pub trials: u32,
    /// Highest step index; steps run from 0 to this value inclusive.
    pub max_steps: u32,
    /// Magnitude added per step, as a fraction (0.10 = 10%).
    pub step_increment: f64,
    pub counter_policy: CounterPolicy,
    /// Per-factor share of evaluations that get deviated.
    pub coverage: FactorSet<Percent>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            trials: 10,
            max_steps: MAX_STEPS,
            step_increment: STEP_INCR,
            counter_policy: CounterPolicy::default(),
            coverage: FactorSet::default(),
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.step_increment.is_finite() || self.step_increment < 0.0 {
            return Err(Error::config(format!(
                "sweep.step_increment must be a non-negative number, got {}",
                self.step_increment
            )));
        }
        if self.max_steps > MAX_SWEEP_STEPS {
            return Err(Error::config(format!(
                "sweep.max_steps must be at most {MAX_SWEEP_STEPS}, got {}",
                self.max_steps
            )));
        }
        // Run indices are u32 and count every trial of every step.
        if (self.max_steps + 1).checked_mul(self.trials).is_none() {
            return Err(Error::config(format!(
                "sweep runs {} steps x {} trials, too many to index",
                self.max_steps + 1,
                self.trials
            )));
        }
        Ok(())
    }

    /// Deviation magnitude of a step, as a fraction.
    pub fn magnitude(&self, step: u32) -> f64 {
        f64::from(step) * self.step_increment
    }
}

/// Averages for one magnitude step. `None` means no data (no assets or no
/// trials).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    pub step: u32,
    pub magnitude: f64,
    pub avg_theta: Option<f64>,
    pub avg_delta_theta: Option<f64>,
}

/// Everything a sweep produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub trials: u32,
    pub coverage: FactorSet<Percent>,
    pub counter_policy: CounterPolicy,
    pub tally: PointTally,
    pub steps: Vec<StepSummary>,
    /// Cumulative deviation diagnostics per factor.
    pub deviation: FactorSet<DeviationState>,
}

impl SweepReport {
    pub fn log_diagnostics(&self) {
        for (factor, state) in self.deviation.iter() {
            info!(
                factor = factor.label(),
                coverage = self.coverage[factor].get(),
                evaluated = state.evaluated,
                deviated = state.deviated,
                ratio = ?state.ratio(),
                "Deviation coverage"
            );
        }
    }
}

/// Drives the magnitude ladder and the trials at each magnitude.
///
/// Selections depend only on the tables, so they are computed once up front
/// and reused by every trial.
pub struct SweepRunner<'a> {
    assets: &'a [TabledAsset],
    selections: Vec<Improvements<Selection>>,
    config: SweepConfig,
}

impl<'a> SweepRunner<'a> {
    pub fn new(assets: &'a [TabledAsset], config: SweepConfig) -> Self {
        let selections = assets.iter().map(|t| select_all(&t.tables)).collect();
        Self {
            assets,
            selections,
            config,
        }
    }

    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<SweepReport> {
        self.run_with(rng, |_| Ok(()))
    }

    /// Run the sweep, handing every per-trial output record to `sink`.
    ///
    /// Records carry a run index that counts trials across all steps,
    /// starting at 1.
    pub fn run_with<R, F>(&self, rng: &mut R, mut sink: F) -> Result<SweepReport>
    where
        R: Rng,
        F: FnMut(&OutputRecord) -> Result<()>,
    {
        let config = &self.config;
        config.validate()?;
        let tally = PointTally::from_assets(self.assets);
        tally.log();

        let mut states = FactorSet::<DeviationState>::default();
        let mut steps = Vec::with_capacity(config.max_steps as usize + 1);
        let mut run: u32 = 0;

        for step in 0..=config.max_steps {
            let magnitude = config.magnitude(step);
            let deviation_pct = magnitude * 100.0;

            let mut theta_sum = 0.0;
            let mut delta_sum = 0.0;
            let mut trials_with_data = 0u32;

            for _ in 0..config.trials {
                run += 1;
                if config.counter_policy == CounterPolicy::RandomPhase {
                    for factor in RiskFactor::ALL {
                        states[factor].reseed(rng, config.coverage[factor]);
                    }
                }

                let mut trial_theta = 0.0;
                let mut trial_delta = 0.0;
                for (tabled, selections) in self.assets.iter().zip(&self.selections) {
                    let mut record = self.perturb(tabled, selections, &mut states, deviation_pct);
                    record.run = Some(run);
                    trial_theta += record.theta;
                    trial_delta += record.delta_theta;
                    sink(&record)?;
                }

                if !self.assets.is_empty() {
                    let n = self.assets.len() as f64;
                    theta_sum += trial_theta / n;
                    delta_sum += trial_delta / n;
                    trials_with_data += 1;
                }
            }

            let summary = if trials_with_data > 0 {
                let n = f64::from(trials_with_data);
                StepSummary {
                    step,
                    magnitude,
                    avg_theta: Some(theta_sum / n),
                    avg_delta_theta: Some(delta_sum / n),
                }
            } else {
                warn!(step, "No data for step");
                StepSummary {
                    step,
                    magnitude,
                    avg_theta: None,
                    avg_delta_theta: None,
                }
            };
            debug!(
                step,
                magnitude,
                avg_theta = ?summary.avg_theta,
                avg_delta_theta = ?summary.avg_delta_theta,
                "Step complete"
            );
            steps.push(summary);
        }

        let report = SweepReport {
            trials: config.trials,
            coverage: config.coverage,
            counter_policy: config.counter_policy,
            tally,
            steps,
            deviation: states,
        };
        info!(
            steps = report.steps.len(),
            trials = report.trials,
            runs = run,
            "Sweep complete"
        );
        report.log_diagnostics();
        Ok(report)
    }

    /// Deviate the selected benefits and the damage of one asset, then
    /// recombine.
    fn perturb(
        &self,
        tabled: &TabledAsset,
        selections: &Improvements<Selection>,
        states: &mut FactorSet<DeviationState>,
        deviation_pct: f64,
    ) -> OutputRecord {
        let coverage = &self.config.coverage;
        let mut deviated = selections.clone();
        for factor in RiskFactor::IMPROVABLE {
            if let Some(selection) = deviated.get_mut(factor) {
                selection.benefit = decide(
                    &mut states[factor],
                    selection.benefit,
                    coverage[factor],
                    deviation_pct,
                );
            }
        }
        let damage = decide(
            &mut states[RiskFactor::Dam],
            tabled.asset.factor(RiskFactor::Dam),
            coverage[RiskFactor::Dam],
            deviation_pct,
        );
        compose_with_damage(&tabled.asset, &deviated, damage)
    }
}

fn decide(state: &mut DeviationState, value: f64, coverage: Percent, deviation_pct: f64) -> f64 {
    if coverage.is_zero() {
        state.skip();
        value
    } else {
        state.deviate(value, coverage, deviation_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::optimize_population;
    use crate::types::{AssetRecord, AssetType, ImprovementTable, Location, Point};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table(points: &[(f64, f64)]) -> ImprovementTable {
        ImprovementTable::from_points(points.iter().map(|&(b, c)| Point::new(b, c)).collect())
            .unwrap()
    }

    fn population() -> Vec<TabledAsset> {
        (1..=4)
            .map(|id| {
                let asset = AssetRecord::new(
                    id,
                    AssetType::new(i64::from(id)).unwrap(),
                    Location::new(10).unwrap(),
                    FactorSet {
                        dis: 0.005,
                        def: 0.2 + 0.05 * f64::from(id),
                        den: 0.05,
                        dim: 0.3,
                        dam: 0.004,
                    },
                );
                TabledAsset {
                    asset,
                    tables: Improvements {
                        dis: table(&[(0.001, 100.0)]),
                        def: table(&[(0.1, 500.0), (0.05, 100.0)]),
                        den: ImprovementTable::empty(),
                        dim: table(&[(0.02, 40.0)]),
                    },
                }
            })
            .collect()
    }

    fn config(coverage: FactorSet<Percent>) -> SweepConfig {
        SweepConfig {
            trials: 5,
            coverage,
            ..SweepConfig::default()
        }
    }

    fn coverage_on(factor: RiskFactor, pct: i64) -> FactorSet<Percent> {
        let mut coverage = FactorSet::default();
        coverage[factor] = Percent::new(pct).unwrap();
        coverage
    }

    #[test]
    fn test_zero_coverage_matches_plain_optimization() {
        let assets = population();
        let runner = SweepRunner::new(&assets, config(FactorSet::default()));
        let report = runner.run(&mut StdRng::seed_from_u64(1)).unwrap();

        let outputs = optimize_population(&assets);
        let mean_delta: f64 =
            outputs.iter().map(|o| o.delta_theta).sum::<f64>() / outputs.len() as f64;

        assert_eq!(report.steps.len(), 11);
        for summary in &report.steps {
            let avg = summary.avg_delta_theta.unwrap();
            assert!((avg - mean_delta).abs() <= mean_delta.abs() * 1e-12);
        }
        for (_, state) in report.deviation.iter() {
            assert_eq!(state.evaluated, 4 * 5 * 11);
            assert_eq!(state.deviated, 0);
            assert_eq!(state.ratio(), Some(0.0));
        }
    }

    #[test]
    fn test_magnitude_ladder() {
        let assets = population();
        let report = SweepRunner::new(&assets, config(FactorSet::default()))
            .run(&mut StdRng::seed_from_u64(1))
            .unwrap();
        let steps: Vec<u32> = report.steps.iter().map(|s| s.step).collect();
        assert_eq!(steps, (0..=10).collect::<Vec<_>>());
        assert_eq!(report.steps[0].magnitude, 0.0);
        assert!((report.steps[10].magnitude - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_full_coverage_grows_delta_with_magnitude() {
        let assets = population();
        let report = SweepRunner::new(&assets, config(coverage_on(RiskFactor::Def, 100)))
            .run(&mut StdRng::seed_from_u64(2))
            .unwrap();
        let deltas: Vec<f64> = report
            .steps
            .iter()
            .map(|s| s.avg_delta_theta.unwrap())
            .collect();
        for pair in deltas.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert_eq!(report.deviation.def.ratio(), Some(1.0));
    }

    #[test]
    fn test_continuous_counters_hit_exact_coverage() {
        // 4 assets * 25 trials * 11 steps = 1100 decisions = 11 full windows
        let assets = population();
        let cfg = SweepConfig {
            trials: 25,
            ..config(coverage_on(RiskFactor::Dim, 37))
        };
        let report = SweepRunner::new(&assets, cfg)
            .run(&mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(report.deviation.dim.evaluated, 1100);
        assert_eq!(report.deviation.dim.deviated, 37 * 11);
    }

    #[test]
    fn test_random_phase_is_reproducible() {
        let assets = population();
        let cfg = SweepConfig {
            counter_policy: CounterPolicy::RandomPhase,
            ..config(coverage_on(RiskFactor::Dam, 50))
        };
        let a = SweepRunner::new(&assets, cfg.clone())
            .run(&mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = SweepRunner::new(&assets, cfg)
            .run(&mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a, b);
        assert!(a.deviation.dam.deviated > 0);
    }

    #[test]
    fn test_empty_population_reports_no_data() {
        let report = SweepRunner::new(&[], config(coverage_on(RiskFactor::Dis, 10)))
            .run(&mut StdRng::seed_from_u64(4))
            .unwrap();
        assert_eq!(report.tally.assets, 0);
        assert!(report
            .steps
            .iter()
            .all(|s| s.avg_theta.is_none() && s.avg_delta_theta.is_none()));
        assert_eq!(report.deviation.dis.ratio(), None);
    }

    #[test]
    fn test_zero_trials_reports_no_data() {
        let assets = population();
        let cfg = SweepConfig {
            trials: 0,
            ..SweepConfig::default()
        };
        let report = SweepRunner::new(&assets, cfg)
            .run(&mut StdRng::seed_from_u64(4))
            .unwrap();
        assert!(report.steps.iter().all(|s| s.avg_theta.is_none()));
    }

    #[test]
    fn test_sink_sees_every_record_with_run_index() {
        let assets = population();
        let cfg = SweepConfig {
            trials: 2,
            max_steps: 1,
            ..SweepConfig::default()
        };
        let mut seen = Vec::new();
        SweepRunner::new(&assets, cfg)
            .run_with(&mut StdRng::seed_from_u64(6), |record| {
                seen.push((record.run, record.id));
                Ok(())
            })
            .unwrap();
        assert_eq!(seen.len(), 4 * 2 * 2);
        assert_eq!(seen[0], (Some(1), 1));
        assert_eq!(seen.last(), Some(&(Some(4), 4)));
    }

    #[test]
    fn test_oversized_ladder_is_rejected() {
        let cfg = SweepConfig {
            max_steps: u32::MAX,
            ..SweepConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));

        let assets = population();
        let result = SweepRunner::new(&assets, cfg).run(&mut StdRng::seed_from_u64(6));
        assert!(matches!(result, Err(Error::Config(_))));

        let cfg = SweepConfig {
            max_steps: MAX_SWEEP_STEPS,
            trials: u32::MAX,
            ..SweepConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));

        let cfg = SweepConfig {
            max_steps: MAX_SWEEP_STEPS,
            ..SweepConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_sink_error_stops_the_sweep() {
        let assets = population();
        let result = SweepRunner::new(&assets, SweepConfig::default())
            .run_with(&mut StdRng::seed_from_u64(6), |_| Err(Error::config("stop")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_tally_counts_points() {
        let assets = population();
        let tally = PointTally::from_assets(&assets);
        assert_eq!(tally.assets, 4);
        assert_eq!(tally.points.dis, 4);
        assert_eq!(tally.points.def, 8);
        assert_eq!(tally.points.den, 0);
        assert_eq!(tally.points.dim, 4);
        assert_eq!(tally.points.dam, 4);
    }
}
