//! Fixed-precision rounding for serialized coordinates.
//!
//! Every float written to a `.bdsket` document is rounded to
//! [`EXPORT_DECIMALS`] digits so that repeated exports of the same scene are
//! byte-identical and compact.

/// Number of decimal digits kept for exported floats.
pub const EXPORT_DECIMALS: i32 = 6;

/// Rounds `value` to `decimals` digits after the point (half away from zero).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // Collapse -0.0 so serialized output never shows "-0.0".
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Rounds to the export precision.
pub fn round6(value: f64) -> f64 {
    round_to(value, EXPORT_DECIMALS)
}

/// Rounds both components of a 2D point to the export precision.
pub fn round_point(point: [f64; 2]) -> [f64; 2] {
    [round6(point[0]), round6(point[1])]
}
