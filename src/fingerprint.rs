//! Shell identity for memoization.
//!
//! A fingerprint is a canonical bit-level encoding of every record field
//! that affects table output, plus the active sensitivity. Encoding rather
//! than hashing makes key equality exact: two fingerprints are equal iff
//! the encoded inputs are identical, so cache-key collisions are
//! impossible by construction rather than improbable.
//!
//! The shell *name* is deliberately excluded — two shells with identical
//! physics share one cached table regardless of what they are called.

use crate::record::{ProjectileRecord, ShellClass, resolve_demarre};

/// Cache key derived from a record and the active sensitivity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShellFingerprint {
    words: Vec<u64>,
}

/// Compute the fingerprint for `(record, sensitivity)`.
#[must_use]
pub fn fingerprint(record: &ProjectileRecord, sensitivity: f64) -> ShellFingerprint {
    let mut enc = Encoder::default();

    enc.push_f64(sensitivity);
    enc.push_f64(record.mass_kg);
    enc.push_f64(record.caliber_m);
    enc.push_f64(record.muzzle_velocity_mps);
    enc.push_f64(record.drag_coefficient);

    // DeMarre coefficients are encoded resolved: a record with no block
    // and one carrying explicit defaults produce identical tables, so
    // they may share a cache entry.
    let demarre = resolve_demarre(record.demarre.as_ref());
    enc.push_f64(demarre.k);
    enc.push_f64(demarre.speed_pow);
    enc.push_f64(demarre.mass_pow);
    enc.push_f64(demarre.caliber_pow);

    enc.push_word(record.class.tag());
    match &record.class {
        ShellClass::Kinetic => {}
        ShellClass::KineticExplosive { filler } | ShellClass::Explosive { filler } => {
            enc.push_f64(filler.mass_kg);
            enc.push_opt_str(filler.explosive_type.as_deref());
        }
        ShellClass::Subcaliber {
            core_mass_kg,
            core_caliber_m,
        } => {
            enc.push_f64(*core_mass_kg);
            enc.push_f64(*core_caliber_m);
        }
        ShellClass::IndexedSubcaliber { series } => match series {
            Some(series) => {
                enc.push_word(1);
                enc.push_word(series.points().len() as u64);
                for &(distance, penetration) in series.points() {
                    enc.push_f64(distance);
                    enc.push_f64(penetration);
                }
            }
            None => enc.push_word(0),
        },
        ShellClass::Guided { armor_power_mm } => match armor_power_mm {
            Some(power) => {
                enc.push_word(1);
                enc.push_f64(*power);
            }
            None => enc.push_word(0),
        },
    }

    ShellFingerprint { words: enc.words }
}

/// Canonical word-stream encoder.
///
/// Strings are length-prefixed so adjacent fields can never alias into
/// the same word stream.
#[derive(Default)]
struct Encoder {
    words: Vec<u64>,
}

impl Encoder {
    fn push_word(&mut self, word: u64) {
        self.words.push(word);
    }

    fn push_f64(&mut self, value: f64) {
        self.words.push(value.to_bits());
    }

    fn push_opt_str(&mut self, value: Option<&str>) {
        match value {
            None => self.push_word(0),
            Some(s) => {
                self.push_word(1);
                self.push_word(s.len() as u64);
                for chunk in s.as_bytes().chunks(8) {
                    let mut word = [0_u8; 8];
                    word[..chunk.len()].copy_from_slice(chunk);
                    self.push_word(u64::from_le_bytes(word));
                }
            }
        }
    }
}
