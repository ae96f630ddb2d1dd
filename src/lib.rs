//! # Rangecard
//!
//! Ballistic range-table engine for aiming overlay generation: trajectory
//! integration under drag, class-dispatched armor penetration,
//! sensitivity-driven rangefinder tick quantization, and a memoized
//! parallel batch scheduler over a vehicle corpus.

// Re-export the main types and functions
pub use cache::BallisticCache;
pub use engine::{
    BatchReport, BatchStats, EngineConfig, ShellFailure, ShellTable, VehicleShells,
    VehicleTables, compute_batch, compute_table, validate_sensitivity,
};
pub use error::{EngineError, Result};
pub use fingerprint::{ShellFingerprint, fingerprint};
pub use penetration::{demarre_penetration, he_equivalent_penetration, penetrate};
pub use quantizer::{max_range_m, sample_distances, tick_step_m};
pub use record::{
    ArmorPowerSeries, DemarreParams, ExplosiveFill, ProjectileRecord, ShellClass,
    resolve_demarre,
};
pub use table::{BallisticRow, BallisticTable};
pub use trajectory::{Divergence, Trajectory, TrajectorySample, integrate};

// Module declarations
pub mod atmosphere;
pub mod cache;
pub mod constants;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod penetration;
pub mod quantizer;
pub mod record;
pub mod table;
pub mod trajectory;
