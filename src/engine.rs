//! Batch scheduler: fans per-vehicle ballistic computation across a
//! bounded rayon pool with a shared memoization cache.
//!
//! Workers are independent except for the cache; per-vehicle statistics
//! are merged in a reduce step, so there is no shared mutable state
//! beyond the cache's own synchronization. Vehicles and shells are sorted
//! by identifier before dispatch and collected in input order, so the
//! output set is deterministic regardless of completion order.

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cache::BallisticCache;
use crate::error::{EngineError, Result};
use crate::fingerprint::fingerprint;
use crate::penetration::{he_equivalent_penetration, penetrate};
use crate::quantizer::{max_range_m, sample_distances};
use crate::record::{ProjectileRecord, ShellClass};
use crate::table::{BallisticRow, BallisticTable};
use crate::trajectory::integrate;

/// One vehicle's projectile set, as handed over by the upstream
/// extraction stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleShells {
    /// Vehicle identifier, used for output path construction.
    pub vehicle: String,
    pub projectiles: Vec<ProjectileRecord>,
}

/// Process-wide configuration for one generation run.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Rangefinder sensitivity in (0, 1].
    pub sensitivity: f64,
    /// Worker pool size; 0 uses the available hardware concurrency.
    pub jobs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.5,
            jobs: 0,
        }
    }
}

/// Reject sensitivities outside (0, 1] before any computation starts.
pub fn validate_sensitivity(value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidSensitivity { value })
    }
}

/// A computed table for one shell of one vehicle.
#[derive(Debug, Clone)]
pub struct ShellTable {
    pub shell: String,
    pub table: Arc<BallisticTable>,
}

/// All computed tables for one vehicle, shells ascending by identifier.
#[derive(Debug, Clone)]
pub struct VehicleTables {
    pub vehicle: String,
    pub shells: Vec<ShellTable>,
}

/// Counters accumulated per work unit and merged in a reduce step.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchStats {
    /// Shells with a computed (possibly truncated) table.
    pub computed: usize,
    /// Shells rejected by record validation.
    pub skipped: usize,
    /// Indexed-subcaliber shells that fell back to the kinetic formula.
    pub degraded: usize,
    /// Shells whose trajectory stalled and whose table was truncated.
    pub truncated: usize,
    /// Same-name shell definitions collapsed (last definition wins).
    pub duplicates_collapsed: usize,
    /// Cache lookups served from an existing entry.
    pub cache_hits: u64,
    /// Cache lookups that ran the computation.
    pub cache_misses: u64,
}

impl BatchStats {
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.computed += other.computed;
        self.skipped += other.skipped;
        self.degraded += other.degraded;
        self.truncated += other.truncated;
        self.duplicates_collapsed += other.duplicates_collapsed;
        self.cache_hits += other.cache_hits;
        self.cache_misses += other.cache_misses;
        self
    }
}

/// A recoverable per-shell condition recorded in the batch report.
#[derive(Debug)]
pub struct ShellFailure {
    pub vehicle: String,
    pub shell: String,
    pub error: EngineError,
}

/// Completed-run report: no shell leaves the batch without either a table
/// or an entry here (degraded and truncated shells get both).
#[derive(Debug, Default)]
pub struct BatchReport {
    pub stats: BatchStats,
    pub failures: Vec<ShellFailure>,
}

/// Compute the ballistic table for a single shell at the given
/// sensitivity. This is the unit of work the cache memoizes.
#[must_use]
pub fn compute_table(record: &ProjectileRecord, sensitivity: f64) -> BallisticTable {
    let distances = sample_distances(max_range_m(&record.class), sensitivity);
    let trajectory = integrate(record, &distances);

    let rows = trajectory
        .samples
        .iter()
        .map(|sample| BallisticRow {
            distance_m: sample.distance_m,
            time_s: sample.time_s,
            penetration_mm: penetrate(record, sample.distance_m, sample.velocity_mps),
        })
        .collect();

    let he_equivalent_mm = match &record.class {
        ShellClass::Explosive { filler } => Some(he_equivalent_penetration(filler)),
        _ => None,
    };

    BallisticTable {
        rows,
        he_equivalent_mm,
        divergence: trajectory.divergence,
    }
}

/// Run the full batch: every vehicle, every shell, in parallel.
///
/// Returns the per-vehicle tables sorted by vehicle then shell
/// identifier, plus the batch report.
///
/// # Errors
///
/// Fails only on conditions outside single-shell scope: an empty input
/// set, an invalid sensitivity, or a worker pool that cannot be built.
/// Per-shell failures land in the report and never abort the batch.
pub fn compute_batch(
    groups: &[VehicleShells],
    config: &EngineConfig,
) -> Result<(Vec<VehicleTables>, BatchReport)> {
    validate_sensitivity(config.sensitivity)?;
    if groups.is_empty() {
        return Err(EngineError::EmptyBatch);
    }

    let mut ordered: Vec<&VehicleShells> = groups.iter().collect();
    ordered.sort_by(|a, b| a.vehicle.cmp(&b.vehicle));

    let cache = BallisticCache::new();
    let sensitivity = config.sensitivity;

    let run = || {
        ordered
            .par_iter()
            .map(|group| process_vehicle(group, sensitivity, &cache))
            .collect::<Vec<_>>()
    };

    let per_vehicle = if config.jobs == 0 {
        run()
    } else {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs)
            .build()?
            .install(run)
    };

    let mut tables = Vec::with_capacity(per_vehicle.len());
    let mut report = BatchReport::default();
    for (vehicle_tables, stats, mut failures) in per_vehicle {
        tables.push(vehicle_tables);
        report.stats = report.stats.merge(stats);
        report.failures.append(&mut failures);
    }
    report.stats.cache_hits = cache.hits();
    report.stats.cache_misses = cache.misses();

    Ok((tables, report))
}

/// One parallel work unit: dedup, sort, and compute a vehicle's shells.
fn process_vehicle(
    group: &VehicleShells,
    sensitivity: f64,
    cache: &BallisticCache,
) -> (VehicleTables, BatchStats, Vec<ShellFailure>) {
    let mut stats = BatchStats::default();
    let mut failures = Vec::new();

    // Duplicate shell names within one vehicle resolve last-definition-
    // wins; each collapse is counted so conflicts stay visible.
    let mut last_by_name: HashMap<&str, usize> = HashMap::new();
    for (idx, record) in group.projectiles.iter().enumerate() {
        last_by_name.insert(&record.name, idx);
    }
    stats.duplicates_collapsed = group.projectiles.len() - last_by_name.len();

    let mut picked: Vec<&ProjectileRecord> = last_by_name
        .values()
        .map(|&idx| &group.projectiles[idx])
        .collect();
    picked.sort_by(|a, b| a.name.cmp(&b.name));

    let mut shells = Vec::with_capacity(picked.len());
    for record in picked {
        if let Some(shell_table) =
            process_shell(&group.vehicle, record, sensitivity, cache, &mut stats, &mut failures)
        {
            shells.push(shell_table);
        }
    }

    (
        VehicleTables {
            vehicle: group.vehicle.clone(),
            shells,
        },
        stats,
        failures,
    )
}

/// Validate, memoize, and compute a single shell; record every
/// recoverable condition in the report.
fn process_shell(
    vehicle: &str,
    record: &ProjectileRecord,
    sensitivity: f64,
    cache: &BallisticCache,
    stats: &mut BatchStats,
    failures: &mut Vec<ShellFailure>,
) -> Option<ShellTable> {
    if let Err(error) = record.validate() {
        stats.skipped += 1;
        failures.push(ShellFailure {
            vehicle: vehicle.to_owned(),
            shell: record.name.clone(),
            error,
        });
        return None;
    }

    if let ShellClass::IndexedSubcaliber { series } = &record.class {
        if series.as_ref().is_none_or(|s| s.is_empty()) {
            stats.degraded += 1;
            failures.push(ShellFailure {
                vehicle: vehicle.to_owned(),
                shell: record.name.clone(),
                error: EngineError::MissingArmorPowerSeries {
                    shell: record.name.clone(),
                },
            });
        }
    }

    let key = fingerprint(record, sensitivity);
    let table = cache.get_or_compute(key, || compute_table(record, sensitivity));

    if let Some(divergence) = table.divergence {
        stats.truncated += 1;
        failures.push(ShellFailure {
            vehicle: vehicle.to_owned(),
            shell: record.name.clone(),
            error: EngineError::DivergentTrajectory {
                shell: record.name.clone(),
                last_valid_m: divergence.last_valid_m,
                requested_m: divergence.requested_m,
            },
        });
    }

    stats.computed += 1;
    Some(ShellTable {
        shell: record.name.clone(),
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ArmorPowerSeries, ExplosiveFill};

    fn kinetic(name: &str) -> ProjectileRecord {
        ProjectileRecord {
            name: name.to_owned(),
            class: ShellClass::Kinetic,
            mass_kg: 0.389,
            caliber_m: 0.03,
            muzzle_velocity_mps: 960.0,
            drag_coefficient: 0.298,
            demarre: None,
        }
    }

    fn group(vehicle: &str, projectiles: Vec<ProjectileRecord>) -> VehicleShells {
        VehicleShells {
            vehicle: vehicle.to_owned(),
            projectiles,
        }
    }

    #[test]
    fn test_empty_batch_is_fatal() {
        let result = compute_batch(&[], &EngineConfig::default());
        assert!(matches!(result, Err(EngineError::EmptyBatch)));
    }

    #[test]
    fn test_invalid_sensitivity_is_fatal() {
        let groups = [group("a", vec![kinetic("ap")])];
        for bad in [0.0, -0.5, 1.5, f64::NAN] {
            let config = EngineConfig {
                sensitivity: bad,
                jobs: 0,
            };
            assert!(matches!(
                compute_batch(&groups, &config),
                Err(EngineError::InvalidSensitivity { .. })
            ));
        }
    }

    #[test]
    fn test_first_row_is_muzzle_row() {
        let table = compute_table(&kinetic("ap"), 0.5);
        let first = table.rows[0];
        assert!((first.distance_m).abs() < f64::EPSILON);
        assert!((first.time_s).abs() < f64::EPSILON);
        let muzzle_pen = penetrate(&kinetic("ap"), 0.0, 960.0);
        assert!((first.penetration_mm - muzzle_pen).abs() < 1e-12);
    }

    #[test]
    fn test_output_sorted_by_vehicle_then_shell() {
        let groups = [
            group("zulu", vec![kinetic("b_shell"), kinetic("a_shell")]),
            group("alpha", vec![kinetic("ap")]),
        ];
        let (tables, _) = compute_batch(&groups, &EngineConfig::default()).unwrap();
        assert_eq!(tables[0].vehicle, "alpha");
        assert_eq!(tables[1].vehicle, "zulu");
        assert_eq!(tables[1].shells[0].shell, "a_shell");
        assert_eq!(tables[1].shells[1].shell, "b_shell");
    }

    #[test]
    fn test_duplicate_definitions_collapse_last_wins() {
        let mut older = kinetic("ap");
        older.drag_coefficient = 0.5;
        let newer = kinetic("ap");
        let groups = [group("a", vec![older, newer.clone()])];
        let (tables, report) = compute_batch(&groups, &EngineConfig::default()).unwrap();

        assert_eq!(report.stats.duplicates_collapsed, 1);
        assert_eq!(tables[0].shells.len(), 1);
        // The surviving table matches the last definition.
        let expected = compute_table(&newer, 0.5);
        let got = &tables[0].shells[0].table;
        assert_eq!(got.rows.len(), expected.rows.len());
        assert!((got.rows[10].penetration_mm - expected.rows[10].penetration_mm).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_record_skipped_and_reported() {
        let mut bad = kinetic("broken");
        bad.mass_kg = -1.0;
        let groups = [group("a", vec![bad, kinetic("ap")])];
        let (tables, report) = compute_batch(&groups, &EngineConfig::default()).unwrap();

        assert_eq!(report.stats.computed, 1);
        assert_eq!(report.stats.skipped, 1);
        assert_eq!(tables[0].shells.len(), 1);
        assert!(report
            .failures
            .iter()
            .any(|f| f.shell == "broken"
                && matches!(f.error, EngineError::InvalidRecord { .. })));
    }

    #[test]
    fn test_degraded_fallback_counted_and_still_computed() {
        let degraded = ProjectileRecord {
            class: ShellClass::IndexedSubcaliber { series: None },
            ..kinetic("no_series")
        };
        let groups = [group("a", vec![degraded])];
        let (tables, report) = compute_batch(&groups, &EngineConfig::default()).unwrap();

        assert_eq!(report.stats.computed, 1);
        assert_eq!(report.stats.degraded, 1);
        assert_eq!(tables[0].shells.len(), 1);
        assert!(report
            .failures
            .iter()
            .any(|f| matches!(f.error, EngineError::MissingArmorPowerSeries { .. })));
    }

    #[test]
    fn test_empty_series_counts_as_degraded() {
        let degraded = ProjectileRecord {
            class: ShellClass::IndexedSubcaliber {
                series: Some(ArmorPowerSeries::new(Vec::new())),
            },
            ..kinetic("empty_series")
        };
        let groups = [group("a", vec![degraded])];
        let (_, report) = compute_batch(&groups, &EngineConfig::default()).unwrap();
        assert_eq!(report.stats.degraded, 1);
    }

    #[test]
    fn test_cross_vehicle_cache_reuse() {
        let groups = [
            group("a", vec![kinetic("ap")]),
            group("b", vec![kinetic("ap")]),
            group("c", vec![kinetic("ap")]),
        ];
        let (_, report) = compute_batch(&groups, &EngineConfig::default()).unwrap();
        assert_eq!(report.stats.cache_misses, 1);
        assert_eq!(report.stats.cache_hits, 2);
    }

    #[test]
    fn test_he_table_has_equivalence_but_zero_rows() {
        let he = ProjectileRecord {
            class: ShellClass::Explosive {
                filler: ExplosiveFill {
                    mass_kg: 1.0,
                    explosive_type: Some("tnt".to_owned()),
                },
            },
            ..kinetic("he_shell")
        };
        let table = compute_table(&he, 0.5);
        assert!(table.rows.iter().all(|r| r.penetration_mm.abs() < f64::EPSILON));
        assert!((table.he_equivalent_mm.unwrap() - 32.0).abs() < 1e-9);
        // Trajectory still fully computed.
        assert_eq!(table.rows.len(), 41);
    }
}
