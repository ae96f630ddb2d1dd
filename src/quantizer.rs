//! Sample-distance quantization for rangefinder ticks.
//!
//! Downstream sight geometry maps one scroll-wheel tick to one table row,
//! so tick spacing must scale with the user's sensitivity setting. The
//! quantizer is pure: identical `(max_range, sensitivity)` inputs always
//! produce the identical distance sequence, which is what makes
//! fingerprint+sensitivity a valid cache key.

use crate::constants::{MAX_RANGE_M, SUBCALIBER_MAX_RANGE_M, TICK_GAIN_M};
use crate::record::ShellClass;

/// Distance between adjacent ticks in meters: `400·s²`.
///
/// Derived from the legacy scroll gain of `2.8·s²` mils per wheel tick
/// folded with the flat-fire range constant.
#[must_use]
pub fn tick_step_m(sensitivity: f64) -> f64 {
    TICK_GAIN_M * sensitivity * sensitivity
}

/// Maximum table range for a shell class in meters.
///
/// Full-bore subcaliber shot decays too fast to be worth sampling out to
/// the default range.
#[must_use]
pub fn max_range_m(class: &ShellClass) -> f64 {
    match class {
        ShellClass::Subcaliber { .. } => SUBCALIBER_MAX_RANGE_M,
        _ => MAX_RANGE_M,
    }
}

/// Ascending sample distances from 0 to `max_range_m` inclusive.
///
/// Callers validate sensitivity; a non-positive value here would yield a
/// degenerate single-row grid rather than loop forever.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sample_distances(max_range_m: f64, sensitivity: f64) -> Vec<f64> {
    let step = tick_step_m(sensitivity);
    if step <= 0.0 || max_range_m < 0.0 {
        return vec![0.0];
    }

    let ticks = (max_range_m / step).floor() as usize;
    (0..=ticks).map(|i| i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sensitivity_spacing() {
        // s = 0.50 → 100 m ticks.
        let distances = sample_distances(4000.0, 0.5);
        assert_eq!(distances.len(), 41);
        assert!((distances[0]).abs() < f64::EPSILON);
        assert!((distances[1] - 100.0).abs() < 1e-9);
        assert!((distances[2] - 200.0).abs() < 1e-9);
        assert!((distances[40] - 4000.0).abs() < 1e-9);
    }

    #[test]
    fn test_spacing_scales_with_sensitivity() {
        let coarse = sample_distances(4000.0, 1.0);
        assert!((coarse[1] - 400.0).abs() < 1e-9);
        let fine = sample_distances(4000.0, 0.25);
        assert!((fine[1] - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(sample_distances(4000.0, 0.37), sample_distances(4000.0, 0.37));
    }

    #[test]
    fn test_ascending_from_zero() {
        let distances = sample_distances(3000.0, 0.8);
        assert!((distances[0]).abs() < f64::EPSILON);
        assert!(distances.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_subcaliber_range_cap() {
        let apcr = ShellClass::Subcaliber {
            core_mass_kg: 0.1,
            core_caliber_m: 0.015,
        };
        assert!((max_range_m(&apcr) - 3000.0).abs() < f64::EPSILON);
        assert!((max_range_m(&ShellClass::Kinetic) - 4000.0).abs() < f64::EPSILON);
    }
}
