//! Vibration magnitude from tri-axial accelerometer samples.

/// Raw accelerometer counts per g at full scale.
pub const FULL_SCALE_COUNTS: f64 = 16384.0;

/// Convert raw 3-axis acceleration into a vibration magnitude in g.
///
/// This is the Euclidean norm of the three axes divided by
/// [`FULL_SCALE_COUNTS`]. The operation order is fixed so results match
/// previously stored values bit for bit.
///
/// ```rust
/// use rigwatch_types::derive_vibration;
///
/// assert_eq!(derive_vibration(0.0, 0.0, 0.0), 0.0);
/// assert_eq!(derive_vibration(16384.0, 0.0, 0.0), 1.0);
/// ```
pub fn derive_vibration(ax: f64, ay: f64, az: f64) -> f64 {
    (ax * ax + ay * ay + az * az).sqrt() / FULL_SCALE_COUNTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_acceleration_is_zero_vibration() {
        assert_eq!(derive_vibration(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn full_scale_on_one_axis_is_one_g() {
        assert!((derive_vibration(16384.0, 0.0, 0.0) - 1.0).abs() < f64::EPSILON);
        assert!((derive_vibration(0.0, -16384.0, 0.0) - 1.0).abs() < f64::EPSILON);
        assert!((derive_vibration(0.0, 0.0, 16384.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn combines_axes_as_euclidean_norm() {
        // 3-4-5 triangle scaled to counts
        let v = derive_vibration(3.0 * 4096.0, 4.0 * 4096.0, 0.0);
        assert!((v - 1.25).abs() < 1e-12);
    }

    #[test]
    fn matches_reference_arithmetic() {
        let (ax, ay, az) = (-1234.56, 9876.54, 42.0);
        let expected = f64::sqrt(ax * ax + ay * ay + az * az) / 16384.0;
        assert_eq!(derive_vibration(ax, ay, az).to_bits(), expected.to_bits());
    }
}
