//! rangecard CLI — batch ballistic table generation.
//!
//! Reads a JSON file of normalized per-vehicle projectile records (the
//! upstream extraction stage's output), computes every shell's ballistic
//! table, and writes `<output>/<vehicle>/<shell>.txt` TSV files in a
//! stable sorted order.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rangecard::{EngineConfig, EngineError, VehicleShells, compute_batch};

#[derive(Parser)]
#[command(name = "rangecard", version, about = "Ballistic range-table generator")]
struct Cli {
    /// JSON file of per-vehicle projectile records
    #[arg(short, long)]
    input: PathBuf,

    /// Directory to write `<vehicle>/<shell>.txt` tables into
    #[arg(short, long)]
    output: PathBuf,

    /// Rangefinder sensitivity (0 < s ≤ 1)
    #[arg(short, long, default_value_t = 0.50)]
    sensitivity: f64,

    /// Number of parallel jobs (0 = auto-detect based on CPU count)
    #[arg(short, long, default_value_t = 0)]
    jobs: usize,

    /// Only process specific vehicle(s) by identifier
    #[arg(long)]
    vehicle: Option<Vec<String>>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), EngineError> {
    let content = std::fs::read_to_string(&cli.input)
        .map_err(|e| EngineError::io(cli.input.display().to_string(), e))?;
    let mut groups: Vec<VehicleShells> = serde_json::from_str(&content)
        .map_err(|e| EngineError::json(cli.input.display().to_string(), e))?;

    if let Some(filter) = &cli.vehicle {
        groups.retain(|g| filter.iter().any(|f| f == &g.vehicle));
    }

    let config = EngineConfig {
        sensitivity: cli.sensitivity,
        jobs: cli.jobs,
    };

    eprintln!(
        "Computing ballistic tables for {} vehicles (sensitivity={}, jobs={})",
        groups.len(),
        cli.sensitivity,
        if cli.jobs == 0 { "auto".to_owned() } else { cli.jobs.to_string() },
    );

    let (tables, report) = compute_batch(&groups, &config)?;

    // Computation is done before any file is touched; writes go out
    // sequentially in the already-sorted order.
    let mut shells_written = 0_usize;
    for vehicle in &tables {
        if vehicle.shells.is_empty() {
            continue;
        }
        let vehicle_dir = cli.output.join(&vehicle.vehicle);
        std::fs::create_dir_all(&vehicle_dir)
            .map_err(|e| EngineError::io(vehicle_dir.display().to_string(), e))?;

        for shell in &vehicle.shells {
            let path = vehicle_dir.join(format!("{}.txt", shell.shell));
            std::fs::write(&path, shell.table.to_tsv())
                .map_err(|e| EngineError::io(path.display().to_string(), e))?;
            shells_written += 1;
        }
    }

    for failure in &report.failures {
        eprintln!("  {}/{}: {}", failure.vehicle, failure.shell, failure.error);
    }

    let stats = &report.stats;
    let total_lookups = stats.cache_hits + stats.cache_misses;
    eprintln!();
    eprintln!(
        "Done: {} shells computed ({} degraded, {} truncated), {} skipped, {} duplicates collapsed",
        stats.computed, stats.degraded, stats.truncated, stats.skipped,
        stats.duplicates_collapsed,
    );
    eprintln!(
        "      {shells_written} tables written; cache {} unique / {total_lookups} lookups ({:.0}% reuse)",
        stats.cache_misses,
        if total_lookups > 0 {
            100.0 * stats.cache_hits as f64 / total_lookups as f64
        } else {
            0.0
        },
    );

    Ok(())
}
