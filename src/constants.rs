/// Physical constants and empirical model tables used in ballistic computation

/// Gravitational acceleration in m/s²
pub const G_ACCEL_MPS2: f64 = 9.80665;

/// Fixed Euler integration step in seconds
///
/// Small enough that per-step velocity loss stays well under 1% for every
/// gun-fired shell in the corpus; halving it moves penetration outputs by
/// less than 0.1 mm.
pub const DT_S: f64 = 0.01;

/// Air density at sea level, ICAO standard atmosphere (kg/m³)
pub const AIR_DENSITY_SEA_LEVEL: f64 = 1.225;

/// Specific gas constant for dry air (J/(kg·K))
pub const R_AIR: f64 = 287.0531;

/// DeMarre reference velocity in m/s
///
/// The empirical base constant K is calibrated against impacts at this
/// velocity; current velocity enters the formula as a ratio against it.
pub const DEMARRE_REF_VELOCITY_MPS: f64 = 1900.0;

/// DeMarre output scale: the K·ratio^pow product converts to millimeters
/// through this factor.
pub const DEMARRE_SCALE_MM: f64 = 100.0;

/// Meters to decimeters; DeMarre caliber exponents are calibrated for
/// calibers expressed in decimeters.
pub const CALIBER_TO_DECIMETERS: f64 = 10.0;

// DeMarre defaults, applied per-field when the shell carries no
// coefficient block or a parsed coefficient is zero
pub const DEFAULT_DEMARRE_K: f64 = 0.9;
pub const DEFAULT_DEMARRE_SPEED_POW: f64 = 1.43;
pub const DEFAULT_DEMARRE_MASS_POW: f64 = 0.71;
pub const DEFAULT_DEMARRE_CALIBER_POW: f64 = 1.07;

/// Default maximum table range in meters
pub const MAX_RANGE_M: f64 = 4000.0;

/// Maximum table range for full-bore subcaliber shot (APCR/APDS) in meters
///
/// Light cores shed velocity fast enough that rows past this range sit
/// below any useful penetration and the integrator walk degenerates.
pub const SUBCALIBER_MAX_RANGE_M: f64 = 3000.0;

/// Rangefinder tick gain in meters
///
/// The legacy sight scroll moves `2.8·s²` mils per wheel tick; folded with
/// the flat-fire range constant (~143 m/mil) this quantizes to `400·s²`
/// meters of range per tick — 100 m at the default s = 0.50.
pub const TICK_GAIN_M: f64 = 400.0;

/// Velocity floor in m/s below which the integrator declares divergence
pub const MIN_INTEGRATION_VELOCITY_MPS: f64 = 1.0;

/// Flight-time ceiling in seconds; a walk past this is divergent
pub const MAX_FLIGHT_TIME_S: f64 = 60.0;

/// APHE explosive-filler penalty table: (filler/shell mass ratio → factor)
///
/// Cavity volume traded for filler weakens the penetrator body; the factor
/// is piecewise-linear between breakpoints and clamped at both ends.
pub const PEN_BY_FILLER_RATIO: [(f64, f64); 5] = [
    (0.0065, 1.0),
    (0.016, 0.93),
    (0.02, 0.9),
    (0.03, 0.85),
    (0.04, 0.75),
];

/// APCR/APDS effective-mass table: (core/total mass ratio → sheath factor)
///
/// Only the dense core penetrates; the carrier sheath contributes this
/// fraction of its mass to the effective penetrator mass.
pub const PEN_BY_CORE_RATIO: [(f64, f64); 4] = [
    (0.0, 0.25),
    (0.15, 0.4),
    (0.3, 0.5),
    (0.4, 0.75),
];

/// TNT-equivalence multipliers by explosive filler type
///
/// Unknown types fall back to 1.0 (plain TNT).
pub const TNT_EQUIVALENCE: [(&str, f64); 10] = [
    ("tnt", 1.0),
    ("amatol", 0.91),
    ("ammonal", 0.99),
    ("tetryl", 1.15),
    ("torpex", 1.3),
    ("comp_b", 1.33),
    ("a_ix_2", 1.55),
    ("hexogen", 1.6),
    ("a_ix_1", 1.65),
    ("octol", 1.8),
];

/// HE-equivalent penetration curve: (TNT-equivalent filler mass kg → mm)
///
/// Piecewise-linear blast-penetration estimate for shells whose damage
/// mechanism is not kinetic; roughly a cube-root law through measured
/// points, clamped at both ends.
pub const HE_PENETRATION_BY_TNT_KG: [(f64, f64); 7] = [
    (0.01, 5.0),
    (0.05, 10.0),
    (0.1, 14.0),
    (0.5, 25.0),
    (1.0, 32.0),
    (2.0, 41.0),
    (5.0, 57.0),
];
