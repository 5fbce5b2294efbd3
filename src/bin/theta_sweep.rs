//! Risk-reduction planning tool
//!
//! - Generate a synthetic asset population
//! - Synthesize improvement tables per asset, type and location
//! - Pick the best benefit/cost option per factor
//! - Sweep deviation magnitudes to measure sensitivity
//!
//! Configuration comes from a TOML file, CLI flags and optional interactive
//! prompts, in increasing order of precedence.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use theta_sweep::generator::generate_population;
use theta_sweep::records::{
    create_output, read_asset_file, read_table_file, write_assets, OutputWriter, TableWriter,
};
use theta_sweep::sensitivity::{write_json, write_sensitivity_file};
use theta_sweep::synthesis::{PopulationTally, TableSynthesizer};
use theta_sweep::{
    init_logging, make_rng, optimize_population, AppConfig, CounterPolicy, LogFormat, Percent,
    RiskFactor, SweepRunner,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(name = "theta_sweep")]
#[command(version, about = "Risk-reduction option synthesis, selection and sensitivity sweeps", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "theta_sweep.toml", global = true)]
    config: PathBuf,

    /// RNG seed (0 = fresh seed from the OS)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Ask for run parameters on stdin before starting
    #[arg(long, global = true)]
    prompt: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output format (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Log file path (JSON lines, in addition to stdout)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a synthetic asset source file
    Generate {
        /// Output asset file
        out: PathBuf,
        /// Number of assets (overrides generator.count)
        #[arg(short = 'n', long)]
        count: Option<u32>,
    },
    /// Build improvement tables for an asset file
    Synthesize {
        /// Input asset file
        assets: PathBuf,
        /// Output improvement-table file
        tables: PathBuf,
        #[command(flatten)]
        skips: SkipArgs,
    },
    /// Pick the best option per factor for every asset in a table file
    Optimize {
        /// Input improvement-table file
        tables: PathBuf,
        /// Output file
        out: PathBuf,
    },
    /// Synthesize and optimize in one pass
    Pipeline {
        /// Input asset file
        assets: PathBuf,
        /// Output file
        out: PathBuf,
        /// Also keep the intermediate improvement-table file
        #[arg(long)]
        tables: Option<PathBuf>,
        #[command(flatten)]
        skips: SkipArgs,
    },
    /// Run the deviation sweep over a table file
    Sweep {
        /// Input improvement-table file
        tables: PathBuf,
        /// Output sensitivity summary
        out: PathBuf,
        #[command(flatten)]
        sweep: SweepArgs,
        /// Write every per-trial output record here
        #[arg(long)]
        detail: Option<PathBuf>,
        /// Write the full report as JSON here
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Generate a sample config file
    GenerateConfig {
        /// Output file path
        #[arg(short, long, default_value = "theta_sweep.toml")]
        output: PathBuf,
    },
    /// Validate config without running
    ValidateConfig,
}

#[derive(clap::Args)]
struct SkipArgs {
    /// Share of assets with empty P(def)/P(den) tables
    #[arg(long)]
    asset_skip: Option<Percent>,
    /// Share of asset types with an empty P(dis) table
    #[arg(long)]
    type_skip: Option<Percent>,
    /// Share of locations with an empty P(dim) table
    #[arg(long)]
    location_skip: Option<Percent>,
}

#[derive(clap::Args)]
struct SweepArgs {
    /// Trials per magnitude step
    #[arg(long)]
    trials: Option<u32>,
    /// P(dis) coverage
    #[arg(long)]
    dis: Option<Percent>,
    /// P(def) coverage
    #[arg(long)]
    def: Option<Percent>,
    /// P(den) coverage
    #[arg(long)]
    den: Option<Percent>,
    /// P(dim) coverage
    #[arg(long)]
    dim: Option<Percent>,
    /// %(dam) coverage
    #[arg(long)]
    dam: Option<Percent>,
    /// Counter behaviour across trials
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Continuous,
    RandomPhase,
}

impl From<PolicyArg> for CounterPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Continuous => CounterPolicy::Continuous,
            PolicyArg::RandomPhase => CounterPolicy::RandomPhase,
        }
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::GenerateConfig { output } = &cli.command {
        generate_sample_config(output)?;
        return Ok(());
    }

    let mut config = load_config(&cli)?;
    apply_overrides(&mut config, &cli);

    if let Commands::ValidateConfig = cli.command {
        config.validate()?;
        println!("Configuration is valid:\n{:#?}", config);
        return Ok(());
    }

    let _guards = setup_logging(&config)?;

    if cli.prompt {
        prompt_parameters(&mut config, &cli.command)?;
    }
    config.validate()?;

    let mut rng = make_rng(config.seed);
    info!(seed = config.seed, config = %cli.config.display(), "Starting");

    match &cli.command {
        Commands::Generate { out, .. } => {
            let assets = generate_population(config.generator.count, &mut rng);
            let written = write_assets(create_output(out)?, &assets)?;
            info!(written, out = %out.display(), "Wrote asset file");
        }
        Commands::Synthesize { assets, tables, .. } => {
            let assets = read_asset_file(assets)?;
            synthesize_to_file(&assets, &config, tables, &mut rng)?;
        }
        Commands::Optimize { tables, out } => {
            let tabled = read_table_file(tables)?;
            write_outputs(&optimize_population(&tabled), out)?;
        }
        Commands::Pipeline {
            assets,
            out,
            tables,
            ..
        } => {
            let assets = read_asset_file(assets)?;
            let tabled = match tables {
                Some(path) => synthesize_to_file(&assets, &config, path, &mut rng)?,
                None => {
                    theta_sweep::synthesize_population(&assets, config.synthesis.clone(), &mut rng)
                        .0
                }
            };
            write_outputs(&optimize_population(&tabled), out)?;
        }
        Commands::Sweep {
            tables,
            out,
            detail,
            json,
            ..
        } => {
            let tabled = read_table_file(tables)?;
            let runner = SweepRunner::new(&tabled, config.sweep.clone());
            let report = match detail {
                Some(path) => {
                    let mut writer = OutputWriter::new(create_output(path)?);
                    let report = runner.run_with(&mut rng, |rec| writer.write(rec))?;
                    let written = writer.finish()?;
                    info!(written, detail = %path.display(), "Wrote detail records");
                    report
                }
                None => runner.run(&mut rng)?,
            };
            write_sensitivity_file(out, &report)?;
            info!(out = %out.display(), "Wrote sensitivity summary");
            if let Some(path) = json {
                write_json(path, &report)?;
                info!(json = %path.display(), "Wrote JSON report");
            }
        }
        Commands::GenerateConfig { .. } | Commands::ValidateConfig => {}
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load(&cli.config)?)
}

/// CLI flags win over the config file.
fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    if let Some(file) = &cli.log_file {
        config.logging.log_file = Some(file.clone());
    }

    match &cli.command {
        Commands::Generate {
            count: Some(count), ..
        } => config.generator.count = *count,
        Commands::Synthesize { skips, .. } | Commands::Pipeline { skips, .. } => {
            let synthesis = &mut config.synthesis;
            if let Some(p) = skips.asset_skip {
                synthesis.asset_skip = p;
            }
            if let Some(p) = skips.type_skip {
                synthesis.type_skip = p;
            }
            if let Some(p) = skips.location_skip {
                synthesis.location_skip = p;
            }
        }
        Commands::Sweep { sweep, .. } => {
            let target = &mut config.sweep;
            if let Some(trials) = sweep.trials {
                target.trials = trials;
            }
            let coverages = [
                (RiskFactor::Dis, sweep.dis),
                (RiskFactor::Def, sweep.def),
                (RiskFactor::Den, sweep.den),
                (RiskFactor::Dim, sweep.dim),
                (RiskFactor::Dam, sweep.dam),
            ];
            for (factor, coverage) in coverages {
                if let Some(p) = coverage {
                    target.coverage[factor] = p;
                }
            }
            if let Some(policy) = sweep.policy {
                target.counter_policy = policy.into();
            }
        }
        _ => {}
    }
}

fn setup_logging(config: &AppConfig) -> Result<Vec<WorkerGuard>, Box<dyn std::error::Error>> {
    init_logging(&config.logging)
}

fn generate_sample_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, AppConfig::sample_toml()?)?;
    println!("Sample config written to: {}", path.display());
    Ok(())
}

fn synthesize_to_file<R: rand::Rng>(
    assets: &[theta_sweep::AssetRecord],
    config: &AppConfig,
    path: &Path,
    rng: &mut R,
) -> Result<Vec<theta_sweep::TabledAsset>, Box<dyn std::error::Error>> {
    let tally = PopulationTally::from_assets(assets);
    let mut synth = TableSynthesizer::new(config.synthesis.clone(), tally);
    let mut writer = TableWriter::new(create_output(path)?);
    let mut tabled = Vec::with_capacity(assets.len());
    for asset in assets {
        let tables = synth.tables_for(rng, asset);
        writer.write(asset, &tables)?;
        tabled.push(theta_sweep::TabledAsset {
            asset: asset.clone(),
            tables,
        });
    }
    let written = writer.finish()?;
    synth.stats().log_summary();
    info!(written, tables = %path.display(), "Wrote improvement tables");
    Ok(tabled)
}

fn write_outputs(
    outputs: &[theta_sweep::OutputRecord],
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = OutputWriter::new(create_output(path)?);
    for rec in outputs {
        writer.write(rec)?;
    }
    let written = writer.finish()?;
    info!(written, out = %path.display(), "Wrote output records");
    Ok(())
}

// ============================================================================
// Interactive input
// ============================================================================

fn prompt_parameters(
    config: &mut AppConfig,
    command: &Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    match command {
        Commands::Generate { .. } => {
            config.generator.count = prompt_value(&mut input, "Number of assets", config.generator.count)?;
        }
        Commands::Synthesize { .. } | Commands::Pipeline { .. } => {
            let s = &mut config.synthesis;
            s.asset_skip = prompt_value(&mut input, "Asset % skip", s.asset_skip)?;
            s.type_skip = prompt_value(&mut input, "Type % skip", s.type_skip)?;
            s.location_skip = prompt_value(&mut input, "Location % skip", s.location_skip)?;
        }
        Commands::Sweep { .. } => {
            let s = &mut config.sweep;
            s.trials = prompt_value(&mut input, "Number of runs", s.trials)?;
            for factor in RiskFactor::ALL {
                let label = format!("{} % coverage", factor.label());
                s.coverage[factor] = prompt_value(&mut input, &label, s.coverage[factor])?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Ask for one value; an empty answer keeps `current`.
fn prompt_value<T>(
    input: &mut impl BufRead,
    label: &str,
    current: T,
) -> Result<T, Box<dyn std::error::Error>>
where
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    loop {
        print!("    {label} [{current}]: ");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(current);
        }
        let answer = line.trim();
        if answer.is_empty() {
            return Ok(current);
        }
        match answer.parse() {
            Ok(value) => return Ok(value),
            Err(e) => eprintln!("    invalid value '{answer}': {e}"),
        }
    }
}
