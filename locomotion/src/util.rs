/// Wrap an angle in degrees into `[0, 360)`.
#[inline]
pub(crate) fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to the modulus for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Wrap an angle in degrees into `[-180, 180)`.
#[inline]
pub(crate) fn wrap_signed_degrees(angle: f32) -> f32 {
    wrap_degrees(angle + 180.0) - 180.0
}

/// Acceleration limit coefficient for the moving-orientation smoothing,
/// derived from the orientation adjust time: `4^(1 - log2 t)`. Short adjust
/// times allow sharply higher turn acceleration.
#[inline]
pub(crate) fn climb_limit_accel_from_adjust_time(adjust_time: f32) -> f32 {
    if adjust_time > 0.001 {
        4.0f32.powf(1.0 - adjust_time.log2())
    } else {
        0.0
    }
}
