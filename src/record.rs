//! Normalized projectile records consumed by the engine.
//!
//! The upstream extraction stage owns these shapes; the engine treats them
//! as read-only input. Shell classification is a closed tagged variant —
//! each class carries exactly the fields its penetration formula needs, so
//! "has an indexed series" is a fact of the data model rather than a
//! type-name heuristic.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DEMARRE_CALIBER_POW, DEFAULT_DEMARRE_K, DEFAULT_DEMARRE_MASS_POW,
    DEFAULT_DEMARRE_SPEED_POW,
};
use crate::error::EngineError;

/// A single shell, normalized by the upstream data stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileRecord {
    /// Shell identifier used for output file naming (e.g. "m735").
    pub name: String,

    /// Shell class with its class-specific parameters.
    pub class: ShellClass,

    /// Projectile mass in kg.
    pub mass_kg: f64,

    /// Ballistic caliber in meters (e.g. 0.03 for 30 mm).
    pub caliber_m: f64,

    /// Muzzle velocity in m/s.
    pub muzzle_velocity_mps: f64,

    /// Drag coefficient (pre-averaged upstream if the source was an array).
    pub drag_coefficient: f64,

    /// DeMarre penetration coefficients, when the shell carries its own.
    pub demarre: Option<DemarreParams>,
}

/// Shell classification.
///
/// Replaces the legacy string-prefix type matching (`"ap"`, `"aphe"`,
/// `"apds_fs"`, …) with a closed variant set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShellClass {
    /// Solid kinetic penetrator (AP, APC, APBC); DeMarre formula.
    Kinetic,

    /// Kinetic penetrator with an explosive filler cavity (APHE, SAP);
    /// DeMarre with a filler-ratio penalty.
    KineticExplosive { filler: ExplosiveFill },

    /// Full-bore subcaliber shot (APCR/APDS); DeMarre on an effective
    /// mass derived from the core/total mass ratio.
    Subcaliber {
        core_mass_kg: f64,
        core_caliber_m: f64,
    },

    /// Long-rod discarding-sabot (APFSDS); penetration interpolated from
    /// the supplied distance-indexed series. A missing series is an
    /// explicit degraded mode that falls back to the kinetic formula.
    IndexedSubcaliber {
        series: Option<ArmorPowerSeries>,
    },

    /// High explosive; zero primary penetration, HE-equivalence exposed
    /// separately.
    Explosive { filler: ExplosiveFill },

    /// Guided missile or rocket; constant-speed trajectory with the
    /// stated armor power, constant over distance.
    Guided { armor_power_mm: Option<f64> },
}

impl ShellClass {
    /// Stable discriminant used in fingerprint encoding.
    pub(crate) fn tag(&self) -> u64 {
        match self {
            Self::Kinetic => 0,
            Self::KineticExplosive { .. } => 1,
            Self::Subcaliber { .. } => 2,
            Self::IndexedSubcaliber { .. } => 3,
            Self::Explosive { .. } => 4,
            Self::Guided { .. } => 5,
        }
    }
}

/// Explosive filler description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosiveFill {
    /// Filler mass in kg.
    pub mass_kg: f64,

    /// Filler type key (e.g. "a_ix_2", "octol"). `None` means plain TNT.
    pub explosive_type: Option<String>,
}

/// DeMarre penetration formula coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemarreParams {
    pub k: f64,
    pub speed_pow: f64,
    pub mass_pow: f64,
    pub caliber_pow: f64,
}

impl DemarreParams {
    /// Engine defaults applied when a shell carries no coefficient block.
    pub const DEFAULTS: DemarreParams = DemarreParams {
        k: DEFAULT_DEMARRE_K,
        speed_pow: DEFAULT_DEMARRE_SPEED_POW,
        mass_pow: DEFAULT_DEMARRE_MASS_POW,
        caliber_pow: DEFAULT_DEMARRE_CALIBER_POW,
    };

    /// Apply defaults to any zero-valued coefficient.
    ///
    /// Upstream parsers emit 0.0 for coefficients absent from the source
    /// data, so zero means "not specified" rather than a usable value.
    #[must_use]
    pub fn with_defaults(self) -> DemarreParams {
        DemarreParams {
            k: non_zero_or(self.k, DEFAULT_DEMARRE_K),
            speed_pow: non_zero_or(self.speed_pow, DEFAULT_DEMARRE_SPEED_POW),
            mass_pow: non_zero_or(self.mass_pow, DEFAULT_DEMARRE_MASS_POW),
            caliber_pow: non_zero_or(self.caliber_pow, DEFAULT_DEMARRE_CALIBER_POW),
        }
    }
}

/// Resolve the DeMarre coefficients a record actually computes with.
#[must_use]
pub fn resolve_demarre(demarre: Option<&DemarreParams>) -> DemarreParams {
    demarre.map_or(DemarreParams::DEFAULTS, |d| d.with_defaults())
}

/// Return `val` when it is non-zero, otherwise `default`.
fn non_zero_or(val: f64, default: f64) -> f64 {
    if val == 0.0 { default } else { val }
}

/// Distance-indexed armor-power breakpoints for long-rod penetrators.
///
/// Kept sorted by distance; construction normalizes the order so
/// interpolation can assume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct ArmorPowerSeries {
    points: Vec<(f64, f64)>,
}

impl ArmorPowerSeries {
    /// Build a series from `(distance_m, penetration_mm)` pairs.
    #[must_use]
    pub fn new(mut points: Vec<(f64, f64)>) -> Self {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { points }
    }

    /// Breakpoints in ascending distance order.
    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<(f64, f64)>> for ArmorPowerSeries {
    fn from(points: Vec<(f64, f64)>) -> Self {
        Self::new(points)
    }
}

impl From<ArmorPowerSeries> for Vec<(f64, f64)> {
    fn from(series: ArmorPowerSeries) -> Self {
        series.points
    }
}

impl ProjectileRecord {
    /// Reject non-physical records before computation.
    ///
    /// Negative or non-finite mass, caliber, drag, or velocity — and a
    /// zero velocity on any class — mark upstream extraction bugs; the
    /// shell is skipped and reported. Zero mass or drag on a gun class is
    /// tolerated: the integrator treats such records as constant-speed
    /// (see [`crate::trajectory::integrate`]).
    pub fn validate(&self) -> Result<(), EngineError> {
        let checks: [(&str, f64); 4] = [
            ("mass_kg", self.mass_kg),
            ("caliber_m", self.caliber_m),
            ("muzzle_velocity_mps", self.muzzle_velocity_mps),
            ("drag_coefficient", self.drag_coefficient),
        ];
        for (field, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::invalid_record(
                    &self.name,
                    format!("{field} = {value} is not a physical value"),
                ));
            }
        }
        if self.muzzle_velocity_mps == 0.0 {
            return Err(EngineError::invalid_record(
                &self.name,
                "muzzle velocity is zero",
            ));
        }
        if let ShellClass::Subcaliber {
            core_mass_kg,
            core_caliber_m,
        } = &self.class
        {
            if !(core_mass_kg.is_finite() && *core_mass_kg > 0.0)
                || !(core_caliber_m.is_finite() && *core_caliber_m > 0.0)
            {
                return Err(EngineError::invalid_record(
                    &self.name,
                    "subcaliber core mass/caliber must be positive",
                ));
            }
            if core_mass_kg > &self.mass_kg {
                return Err(EngineError::invalid_record(
                    &self.name,
                    "subcaliber core heavier than the whole shell",
                ));
            }
        }
        Ok(())
    }
}
