//! Writers for sweep results.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::sweep::SweepReport;
use crate::consts::END_OF_STREAM;
use crate::errors::Result;

/// Write the sensitivity summary.
///
/// One header per factor with non-zero coverage, one line per step
/// (`magnitude,avg_theta,avg_delta_theta`), then the end marker. Steps without
/// data are written with empty value fields.
pub fn write_sensitivity<W: Write>(mut out: W, report: &SweepReport) -> Result<()> {
    for (factor, coverage) in report.coverage.iter() {
        if coverage.is_zero() {
            continue;
        }
        writeln!(
            out,
            "{}, Runs = {}, Coverage = {}",
            factor.label(),
            report.trials,
            coverage
        )?;
    }
    for step in &report.steps {
        writeln!(
            out,
            "{:.6},{},{}",
            step.magnitude,
            fmt_opt(step.avg_theta),
            fmt_opt(step.avg_delta_theta)
        )?;
    }
    writeln!(out, "{END_OF_STREAM}")?;
    out.flush()?;
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:E}")).unwrap_or_default()
}

pub fn write_sensitivity_file(path: &Path, report: &SweepReport) -> Result<()> {
    write_sensitivity(BufWriter::new(File::create(path)?), report)
}

/// Dump the full report as pretty-printed JSON.
pub fn write_json(path: &Path, report: &SweepReport) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensitivity::{CounterPolicy, DeviationState, PointTally, StepSummary};
    use crate::types::{FactorSet, Percent};

    fn report() -> SweepReport {
        let mut coverage = FactorSet::default();
        coverage.dis = Percent::new(20).unwrap();
        coverage.dam = Percent::new(5).unwrap();
        SweepReport {
            trials: 3,
            coverage,
            counter_policy: CounterPolicy::Continuous,
            tally: PointTally::default(),
            steps: vec![
                StepSummary {
                    step: 0,
                    magnitude: 0.0,
                    avg_theta: Some(2.5e-8),
                    avg_delta_theta: Some(1.25e-9),
                },
                StepSummary {
                    step: 1,
                    magnitude: 0.1,
                    avg_theta: None,
                    avg_delta_theta: None,
                },
            ],
            deviation: FactorSet::<DeviationState>::default(),
        }
    }

    #[test]
    fn test_sensitivity_layout() {
        let mut buf = Vec::new();
        write_sensitivity(&mut buf, &report()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "P(dis), Runs = 3, Coverage = 20%",
                "%(dam), Runs = 3, Coverage = 5%",
                "0.000000,2.5E-8,1.25E-9",
                "0.100000,,",
                "-1",
            ]
        );
    }

    #[test]
    fn test_json_export_parses_back() {
        let path = std::env::temp_dir().join(format!("theta_sweep_report_{}.json", std::process::id()));
        let report = report();
        write_json(&path, &report).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: SweepReport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.trials, report.trials);
        assert_eq!(back.coverage, report.coverage);
        assert_eq!(back.steps.len(), 2);
        assert_eq!(back.steps[1].avg_theta, None);
        let theta = back.steps[0].avg_theta.unwrap();
        assert!((theta - 2.5e-8).abs() < 1e-20);
        let _ = std::fs::remove_file(&path);
    }
}
