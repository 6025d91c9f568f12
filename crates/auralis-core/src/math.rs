//! Level conversion helpers.

use libm::expf;

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use auralis_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(1.5) - 1.1885).abs() < 0.001);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}
