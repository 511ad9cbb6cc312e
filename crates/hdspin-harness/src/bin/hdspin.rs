//! CLI entrypoint for hdspin.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hdspin_core::Grids;
use hdspin_core::engine::TransitionRule;
use hdspin_harness::BatchRunner;
use hdspin_harness::params;
use hdspin_harness::structured_log::LogEmitter;

/// Aging simulations on random energy landscapes.
#[derive(Debug, Parser)]
#[command(name = "hdspin")]
#[command(about = "Kinetic Monte Carlo tracers on EREM/GREM landscapes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a config and print the derived parameter record.
    Params {
        /// JSON config path.
        #[arg(long, default_value = "config.json")]
        config: PathBuf,
    },
    /// Generate the energy/pi1/pi2 grids.
    Grids {
        /// JSON config path.
        #[arg(long, default_value = "config.json")]
        config: PathBuf,
        /// Output directory for the grid files.
        #[arg(long, default_value = "grids")]
        grids_dir: PathBuf,
    },
    /// Run one batch of tracers.
    Run {
        /// JSON config path.
        #[arg(long, default_value = "config.json")]
        config: PathBuf,
        /// Index of the first tracer in this batch.
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Directory receiving per-tracer output files.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        /// Grid directory; grids are generated there when missing.
        #[arg(long, default_value = "grids")]
        grids_dir: PathBuf,
        /// Structured JSONL log path.
        #[arg(long, default_value = "hdspin.log.jsonl")]
        log: PathBuf,
        /// Run id used in trace ids and the artifact index.
        #[arg(long, default_value = "hdspin")]
        run_id: String,
        /// Transition rule (`metropolis` or `glauber`).
        #[arg(long, default_value = "metropolis")]
        rule: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Params { config } => {
            let resolved = params::resolve(&config)?;
            println!("{}", params::to_pretty_json(&resolved)?);
        }
        Command::Grids { config, grids_dir } => {
            let resolved = params::resolve(&config)?;
            let grids = Grids::generate(&resolved);
            grids.write_to(&grids_dir)?;
            eprintln!(
                "Wrote {} energy and {} pi checkpoints to {}",
                grids.energy.len(),
                grids.pi1.len(),
                grids_dir.display()
            );
        }
        Command::Run {
            config,
            offset,
            data_dir,
            grids_dir,
            log,
            run_id,
            rule,
        } => {
            let resolved = params::resolve(&config)?;
            let rule: TransitionRule = rule.parse()?;
            if let Some(parent) = log.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            let mut emitter = LogEmitter::to_file(&log, &run_id, &format!("offset-{offset}"))?;
            let report = BatchRunner::new(resolved, data_dir, grids_dir)
                .with_offset(offset)
                .with_rule(rule)
                .run(&mut emitter)?;

            eprintln!(
                "{} tracer(s) finished, {} failed; artifact index at {}",
                report.summaries.len(),
                report.failures.len(),
                report.artifact_index.display()
            );
            for failure in &report.failures {
                eprintln!("tracer {}: {}", failure.index, failure.error);
            }
            if !report.all_passed() {
                return Err(format!("{} tracer(s) failed", report.failures.len()).into());
            }
        }
    }
    Ok(())
}
