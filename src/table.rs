//! Ballistic table rows and the TSV writer.
//!
//! Rows keep full floating-point precision; quantization to the persisted
//! format (3-decimal distance, 1-decimal time, integer millimeters) happens
//! only here at the writer boundary.

use std::fmt::Write;

use crate::trajectory::Divergence;

/// One persisted row: distance, time of flight, penetration.
#[derive(Debug, Clone, Copy)]
pub struct BallisticRow {
    pub distance_m: f64,
    pub time_s: f64,
    pub penetration_mm: f64,
}

/// Computed table for one shell. Write-once: cached tables are shared
/// behind `Arc` and never mutated after insertion.
#[derive(Debug, Clone)]
pub struct BallisticTable {
    /// Rows ascending in distance, starting at 0.
    pub rows: Vec<BallisticRow>,

    /// Blast-equivalence figure for explosive shells, kept out of the
    /// primary penetration column.
    pub he_equivalent_mm: Option<f64>,

    /// Set when the trajectory stalled and the rows were truncated.
    pub divergence: Option<Divergence>,
}

impl BallisticTable {
    /// Render the table in the persisted TSV layout, one row per line:
    /// `distance \t time \t penetration`.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        let mut out = String::with_capacity(self.rows.len() * 16);
        for row in &self.rows {
            writeln!(
                out,
                "{:.3}\t{}\t{}",
                row.distance_m,
                fmt_time(quantize_time(row.time_s)),
                fmt_penetration(row.penetration_mm),
            )
            .expect("writing to String cannot fail");
        }
        out
    }
}

/// Snap time of flight to one decimal for output.
fn quantize_time(t: f64) -> f64 {
    (t * 10.0).round() / 10.0
}

/// Format a quantized time without a trailing zero decimal: `"0"`, `"1"`,
/// `"10"`, `"0.1"`, `"3.5"`.
#[allow(clippy::cast_possible_truncation)]
fn fmt_time(t: f64) -> String {
    if t.fract().abs() < 1e-9 {
        format!("{}", t as i64)
    } else {
        format!("{t:.1}")
    }
}

/// Format penetration as integer millimeters.
///
/// A non-finite value (degenerate caliber in the DeMarre denominator)
/// renders as the infinity symbol, matching the legacy output.
#[allow(clippy::cast_possible_truncation)]
fn fmt_penetration(p: f64) -> String {
    if p.is_infinite() || p.is_nan() {
        "\u{221E}".to_owned()
    } else {
        format!("{}", p.round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_time() {
        assert_eq!(fmt_time(0.0), "0");
        assert_eq!(fmt_time(1.0), "1");
        assert_eq!(fmt_time(10.0), "10");
        assert_eq!(fmt_time(0.1), "0.1");
        assert_eq!(fmt_time(3.5), "3.5");
    }

    #[test]
    fn test_time_quantized_to_one_decimal() {
        assert!((quantize_time(0.1234) - 0.1).abs() < 1e-12);
        assert!((quantize_time(3.449) - 3.4).abs() < 1e-12);
        assert!((quantize_time(3.45) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_fmt_penetration_rounds_to_integer() {
        assert_eq!(fmt_penetration(62.93), "63");
        assert_eq!(fmt_penetration(0.0), "0");
        assert_eq!(fmt_penetration(f64::INFINITY), "∞");
    }

    #[test]
    fn test_tsv_layout() {
        let table = BallisticTable {
            rows: vec![
                BallisticRow {
                    distance_m: 0.0,
                    time_s: 0.0,
                    penetration_mm: 62.93,
                },
                BallisticRow {
                    distance_m: 100.0,
                    time_s: 0.1083,
                    penetration_mm: 61.4,
                },
            ],
            he_equivalent_mm: None,
            divergence: None,
        };
        assert_eq!(table.to_tsv(), "0.000\t0\t63\n100.000\t0.1\t61\n");
    }

    #[test]
    fn test_rounding_happens_only_at_the_writer() {
        // The stored row keeps its fractional value.
        let table = BallisticTable {
            rows: vec![BallisticRow {
                distance_m: 0.0,
                time_s: 0.0,
                penetration_mm: 62.93,
            }],
            he_equivalent_mm: None,
            divergence: None,
        };
        assert!((table.rows[0].penetration_mm - 62.93).abs() < f64::EPSILON);
        assert!(table.to_tsv().contains("\t63\n"));
    }
}
