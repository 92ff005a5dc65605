pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn clamp01(t: f64) -> f64 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Fractional part for non-negative inputs, `0.0` for non-finite ones.
pub(crate) fn fract(t: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    t - t.floor()
}
