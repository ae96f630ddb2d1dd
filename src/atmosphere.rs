//! Atmospheric density model.
//!
//! Direct-fire ground trajectories live in a near-constant density band,
//! but the model keeps a layered lookup with in-layer interpolation so
//! future indirect-fire arcs need no re-architecture.

use crate::constants::{G_ACCEL_MPS2, R_AIR};

/// One atmospheric layer with a linear temperature gradient.
#[derive(Debug, Clone)]
struct AtmosphereLayer {
    /// Base altitude of this layer (m)
    base_altitude: f64,
    /// Temperature at layer base (K)
    base_temperature: f64,
    /// Pressure at layer base (Pa)
    base_pressure: f64,
    /// Temperature lapse rate (K/m)
    lapse_rate: f64,
}

/// Standard-atmosphere layers up to 32 km.
///
/// Base pressures follow the barometric formula between layers.
const LAYERS: &[AtmosphereLayer] = &[
    // Troposphere (0 - 11 km)
    AtmosphereLayer {
        base_altitude: 0.0,
        base_temperature: 288.15,
        base_pressure: 101_325.0,
        lapse_rate: -0.0065,
    },
    // Tropopause (11 - 20 km), isothermal
    AtmosphereLayer {
        base_altitude: 11_000.0,
        base_temperature: 216.65,
        base_pressure: 22_632.1,
        lapse_rate: 0.0,
    },
    // Lower stratosphere (20 - 32 km)
    AtmosphereLayer {
        base_altitude: 20_000.0,
        base_temperature: 216.65,
        base_pressure: 5474.89,
        lapse_rate: 0.001,
    },
];

/// Model ceiling; densities above clamp to this altitude.
const MAX_ALTITUDE_M: f64 = 32_000.0;

/// Air density in kg/m³ at the given altitude.
///
/// Out-of-range altitudes clamp to the nearest table bound; negative
/// altitudes (a trajectory dropping below the muzzle plane) read the
/// sea-level band.
#[must_use]
pub fn density_at(altitude_m: f64) -> f64 {
    let altitude = altitude_m.clamp(0.0, MAX_ALTITUDE_M);

    let layer = LAYERS
        .iter()
        .rev()
        .find(|layer| altitude >= layer.base_altitude)
        .unwrap_or(&LAYERS[0]);

    let height_diff = altitude - layer.base_altitude;
    let temperature = layer.base_temperature + layer.lapse_rate * height_diff;

    let pressure = if layer.lapse_rate.abs() < 1e-10 {
        // Isothermal layer
        layer.base_pressure
            * (-G_ACCEL_MPS2 * height_diff / (R_AIR * layer.base_temperature)).exp()
    } else {
        let temp_ratio = temperature / layer.base_temperature;
        layer.base_pressure * temp_ratio.powf(-G_ACCEL_MPS2 / (layer.lapse_rate * R_AIR))
    };

    pressure / (R_AIR * temperature)
}
