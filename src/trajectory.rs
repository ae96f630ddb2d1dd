//! Flat-fire trajectory integration.
//!
//! Fixed-step Euler march of velocity loss under drag, with a horizontal
//! distance accumulator. At each requested sample distance the crossing
//! step is linearly interpolated to a `(time, velocity)` pair. Vertical
//! drop is carried in the state for future line-of-sight correction but
//! does not enter the emitted samples.

use nalgebra::Vector2;
use std::f64::consts::PI;

use crate::atmosphere::density_at;
use crate::constants::{
    DT_S, G_ACCEL_MPS2, MAX_FLIGHT_TIME_S, MIN_INTEGRATION_VELOCITY_MPS,
};
use crate::record::{ProjectileRecord, ShellClass};

/// One interpolated point of a trajectory.
#[derive(Debug, Clone, Copy)]
pub struct TrajectorySample {
    pub distance_m: f64,
    pub time_s: f64,
    pub velocity_mps: f64,
}

/// Marker for a walk that stalled before its last requested distance.
#[derive(Debug, Clone, Copy)]
pub struct Divergence {
    /// Distance of the last sample that was still reachable.
    pub last_valid_m: f64,
    /// Distance the caller asked for but the projectile never reached.
    pub requested_m: f64,
}

/// Integration result: samples for every reached distance, plus the
/// divergence marker when the projectile stalled early. The sample list is
/// truncated at the last valid distance — rows are never fabricated.
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub samples: Vec<TrajectorySample>,
    pub divergence: Option<Divergence>,
}

/// Walk a projectile through `sample_distances` (ascending, starting at 0).
///
/// Guided rounds — and gun records whose mass or drag coefficient is zero,
/// which would make the drag term degenerate — fly the constant-speed
/// straight-line special case: rocket/ATGM ballistics are not
/// drag-integrated the way gun-fired rounds are.
#[must_use]
pub fn integrate(record: &ProjectileRecord, sample_distances: &[f64]) -> Trajectory {
    if matches!(record.class, ShellClass::Guided { .. })
        || record.mass_kg == 0.0
        || record.drag_coefficient == 0.0
    {
        return integrate_constant_speed(record.muzzle_velocity_mps, sample_distances);
    }

    let area = PI * record.caliber_m * record.caliber_m / 4.0;
    let mut vel = Vector2::new(record.muzzle_velocity_mps, 0.0);
    let mut pos: Vector2<f64> = Vector2::zeros();
    let mut t = 0.0_f64;

    let mut samples = Vec::with_capacity(sample_distances.len());
    let mut idx = 0;

    // The muzzle row needs no stepping.
    while idx < sample_distances.len() && sample_distances[idx] <= 0.0 {
        samples.push(TrajectorySample {
            distance_m: sample_distances[idx],
            time_s: 0.0,
            velocity_mps: vel.norm(),
        });
        idx += 1;
    }

    while idx < sample_distances.len() {
        if vel.x <= MIN_INTEGRATION_VELOCITY_MPS || t >= MAX_FLIGHT_TIME_S {
            let divergence = Divergence {
                last_valid_m: samples.last().map_or(0.0, |s: &TrajectorySample| s.distance_m),
                requested_m: *sample_distances.last().unwrap_or(&0.0),
            };
            return Trajectory {
                samples,
                divergence: Some(divergence),
            };
        }

        let speed = vel.norm();
        let drag_decel = density_at(pos.y) * record.drag_coefficient * speed * speed / 2.0
            * area
            / record.mass_kg;

        let prev_x = pos.x;
        let prev_speed = speed;
        let prev_t = t;

        // Drag opposes the velocity vector; gravity pulls straight down.
        let accel = vel * (-drag_decel / speed) + Vector2::new(0.0, -G_ACCEL_MPS2);
        vel += accel * DT_S;
        pos += vel * DT_S;
        t += DT_S;

        while idx < sample_distances.len() && pos.x >= sample_distances[idx] {
            let target = sample_distances[idx];
            let frac = (target - prev_x) / (pos.x - prev_x);
            samples.push(TrajectorySample {
                distance_m: target,
                time_s: prev_t + frac * DT_S,
                velocity_mps: prev_speed + frac * (vel.norm() - prev_speed),
            });
            idx += 1;
        }
    }

    Trajectory {
        samples,
        divergence: None,
    }
}

/// Straight-line constant-speed samples for guided rounds.
fn integrate_constant_speed(speed_mps: f64, sample_distances: &[f64]) -> Trajectory {
    let samples = sample_distances
        .iter()
        .map(|&d| TrajectorySample {
            distance_m: d,
            time_s: d / speed_mps,
            velocity_mps: speed_mps,
        })
        .collect();
    Trajectory {
        samples,
        divergence: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinetic_record() -> ProjectileRecord {
        ProjectileRecord {
            name: "test_ap".to_owned(),
            class: ShellClass::Kinetic,
            mass_kg: 0.389,
            caliber_m: 0.03,
            muzzle_velocity_mps: 960.0,
            drag_coefficient: 0.298,
            demarre: None,
        }
    }

    fn grid() -> Vec<f64> {
        (0..=40).map(|i| f64::from(i) * 100.0).collect()
    }

    #[test]
    fn test_muzzle_sample() {
        let traj = integrate(&kinetic_record(), &grid());
        let first = &traj.samples[0];
        assert!((first.distance_m).abs() < f64::EPSILON);
        assert!((first.time_s).abs() < f64::EPSILON);
        assert!((first.velocity_mps - 960.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_grid_reached() {
        let traj = integrate(&kinetic_record(), &grid());
        assert!(traj.divergence.is_none());
        assert_eq!(traj.samples.len(), 41);
    }

    #[test]
    fn test_time_strictly_increasing() {
        let traj = integrate(&kinetic_record(), &grid());
        assert!(traj.samples.windows(2).all(|w| w[1].time_s > w[0].time_s));
    }

    #[test]
    fn test_velocity_decays_with_distance() {
        let traj = integrate(&kinetic_record(), &grid());
        assert!(traj
            .samples
            .windows(2)
            .all(|w| w[1].velocity_mps < w[0].velocity_mps));
    }

    #[test]
    fn test_guided_constant_speed() {
        let record = ProjectileRecord {
            name: "test_atgm".to_owned(),
            class: ShellClass::Guided {
                armor_power_mm: Some(600.0),
            },
            mass_kg: 11.0,
            caliber_m: 0.125,
            muzzle_velocity_mps: 400.0,
            drag_coefficient: 0.8,
            demarre: None,
        };
        let traj = integrate(&record, &grid());
        assert!(traj.divergence.is_none());
        for sample in &traj.samples {
            assert!((sample.velocity_mps - 400.0).abs() < f64::EPSILON);
            assert!((sample.time_s - sample.distance_m / 400.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_mass_falls_back_to_constant_speed() {
        let mut record = kinetic_record();
        record.mass_kg = 0.0;
        let traj = integrate(&record, &grid());
        assert!(traj.divergence.is_none());
        assert!((traj.samples[40].velocity_mps - 960.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_divergent_trajectory_truncates() {
        // Very light, very draggy: stalls long before 4 km.
        let record = ProjectileRecord {
            name: "test_stall".to_owned(),
            class: ShellClass::Kinetic,
            mass_kg: 0.05,
            caliber_m: 0.03,
            muzzle_velocity_mps: 960.0,
            drag_coefficient: 1.0,
            demarre: None,
        };
        let traj = integrate(&record, &grid());
        let divergence = traj.divergence.expect("stalling shell must diverge");
        assert!(traj.samples.len() < 41);
        assert!(divergence.last_valid_m < 4000.0);
        assert!((divergence.requested_m - 4000.0).abs() < f64::EPSILON);
        // Truncated, not fabricated: every emitted sample is a real crossing.
        assert!((traj.samples.last().unwrap().distance_m - divergence.last_valid_m).abs()
            < f64::EPSILON);
    }

    #[test]
    fn test_interpolated_velocity_between_steps() {
        let traj = integrate(&kinetic_record(), &[0.0, 100.0]);
        let at_100 = traj.samples[1];
        assert!(at_100.velocity_mps < 960.0);
        assert!(at_100.velocity_mps > 900.0);
    }
}
