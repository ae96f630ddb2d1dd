//! Class-dispatched armor penetration calculation.
//!
//! Kinetic classes run the DeMarre empirical formula at the *decayed*
//! velocity the integrator hands over — never the muzzle velocity.
//! Long-rod penetrators interpolate their supplied armor-power series.
//! High explosive reports zero primary penetration; its blast-equivalence
//! figure is derived separately and never substituted into the primary
//! column.
//!
//! Everything here stays floating-point. Rounding to integer millimeters
//! is the table writer's job, so interpolation error never compounds.

use crate::constants::{
    CALIBER_TO_DECIMETERS, DEMARRE_REF_VELOCITY_MPS, DEMARRE_SCALE_MM,
    HE_PENETRATION_BY_TNT_KG, PEN_BY_CORE_RATIO, PEN_BY_FILLER_RATIO, TNT_EQUIVALENCE,
};
use crate::record::{ArmorPowerSeries, DemarreParams, ExplosiveFill, ProjectileRecord, ShellClass,
    resolve_demarre};

/// Penetration in millimeters at `distance_m`, given the decayed
/// `velocity_mps` at that distance.
#[must_use]
pub fn penetrate(record: &ProjectileRecord, distance_m: f64, velocity_mps: f64) -> f64 {
    let params = resolve_demarre(record.demarre.as_ref());

    match &record.class {
        ShellClass::Kinetic => {
            demarre_penetration(&params, record.mass_kg, record.caliber_m, velocity_mps)
        }
        ShellClass::KineticExplosive { filler } => {
            let pen =
                demarre_penetration(&params, record.mass_kg, record.caliber_m, velocity_mps);
            pen * filler_penalty(filler.mass_kg / record.mass_kg)
        }
        ShellClass::Subcaliber {
            core_mass_kg,
            core_caliber_m,
        } => {
            let effective_mass = effective_penetrator_mass(record.mass_kg, *core_mass_kg);
            demarre_penetration(&params, effective_mass, *core_caliber_m, velocity_mps)
        }
        ShellClass::IndexedSubcaliber { series } => match series {
            Some(series) if !series.is_empty() => interpolate_series(series, distance_m),
            // Degraded mode: the engine counts this per shell before
            // computing the table.
            _ => demarre_penetration(&params, record.mass_kg, record.caliber_m, velocity_mps),
        },
        ShellClass::Explosive { .. } => 0.0,
        ShellClass::Guided { armor_power_mm } => armor_power_mm.unwrap_or(0.0),
    }
}

/// DeMarre empirical formula, millimeters.
///
/// `100 · K · (v/1900)^speedPow · m^massPow / (10·d)^caliberPow` with the
/// caliber folded in decimeters.
#[must_use]
pub fn demarre_penetration(
    params: &DemarreParams,
    mass_kg: f64,
    caliber_m: f64,
    velocity_mps: f64,
) -> f64 {
    params.k
        * (velocity_mps / DEMARRE_REF_VELOCITY_MPS).powf(params.speed_pow)
        * mass_kg.powf(params.mass_pow)
        / (caliber_m * CALIBER_TO_DECIMETERS).powf(params.caliber_pow)
        * DEMARRE_SCALE_MM
}

/// APHE filler penalty factor over filler/shell mass ratio.
fn filler_penalty(ratio: f64) -> f64 {
    interpolate_table(&PEN_BY_FILLER_RATIO, ratio)
}

/// Effective penetrator mass for APCR/APDS: the carrier sheath counts at
/// a ratio-dependent fraction, the core at full weight.
fn effective_penetrator_mass(mass_kg: f64, core_mass_kg: f64) -> f64 {
    let sheath_factor = interpolate_table(&PEN_BY_CORE_RATIO, core_mass_kg / mass_kg);
    (mass_kg - core_mass_kg) * sheath_factor + core_mass_kg
}

/// Linear interpolation of a distance-indexed armor-power series, clamped
/// at both series ends. An empty series reads as zero.
#[must_use]
pub fn interpolate_series(series: &ArmorPowerSeries, distance_m: f64) -> f64 {
    let points = series.points();
    if points.is_empty() {
        return 0.0;
    }
    interpolate_table(points, distance_m)
}

/// HE-equivalent penetration in millimeters for an explosive filler.
///
/// TNT-equivalence multiplier by explosive type (default 1.0), then the
/// piecewise-linear mass→penetration curve.
#[must_use]
pub fn he_equivalent_penetration(fill: &ExplosiveFill) -> f64 {
    let multiplier = fill
        .explosive_type
        .as_deref()
        .and_then(|kind| {
            TNT_EQUIVALENCE
                .iter()
                .find(|(key, _)| *key == kind)
                .map(|(_, factor)| *factor)
        })
        .unwrap_or(1.0);

    interpolate_table(&HE_PENETRATION_BY_TNT_KG, fill.mass_kg * multiplier)
}

/// Piecewise-linear lookup over ascending `(threshold, value)` pairs.
///
/// - Below the first threshold → the first value.
/// - Above the last threshold → the last value.
/// - Between thresholds → linear interpolation.
fn interpolate_table(table: &[(f64, f64)], k: f64) -> f64 {
    if k < table[0].0 {
        return table[0].1;
    }
    for window in table.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        if k >= x0 && k < x1 {
            return y0 + (y1 - y0) / (x1 - x0) * (k - x0);
        }
    }
    table[table.len() - 1].1
}
