//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Clamp a value between `min` and `max`.
///
/// Returns the clamped value and `true` if the value had to be limited.
pub fn clamp<T>(value: T, min: T, max: T) -> (T, bool)
where
    T: Float,
{
    if value > max {
        (max, true)
    } else if value < min {
        (min, true)
    } else {
        (value, false)
    }
}

/// Clamp a value into the normalised range `[-1, 1]`.
pub fn clamp_norm<T>(value: T) -> (T, bool)
where
    T: Float,
{
    clamp(value, -T::one(), T::one())
}

/// Wrap an angle into the range `[-pi, pi]`.
pub fn wrap_pi<T>(value: T) -> T
where
    T: Float,
{
    let pi_t = T::from(std::f64::consts::PI).unwrap();
    let tau_t = T::from(std::f64::consts::TAU).unwrap();

    let r = rem_euclid(value + pi_t, tau_t);
    r - pi_t
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// `num_traits::Float` has no `rem_euclid` so this mirrors the std version.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp_norm() {
        assert_eq!(clamp_norm(0.5f64), (0.5, false));
        assert_eq!(clamp_norm(1.0f64), (1.0, false));
        assert_eq!(clamp_norm(-1.0f64), (-1.0, false));
        assert_eq!(clamp_norm(200.1f64), (1.0, true));
        assert_eq!(clamp_norm(-3.0f64), (-1.0, true));
    }

    #[test]
    fn test_clamp_bounds() {
        for i in -100..100 {
            let v = i as f64 * 0.37;
            let (c, limited) = clamp_norm(v);
            assert!(c >= -1.0 && c <= 1.0);
            if v.abs() <= 1.0 {
                assert_eq!(c, v);
                assert!(!limited);
            }
        }
    }

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 10f64), (-1f64, 1f64), 5f64), 0f64);
        assert_eq!(lin_map((0f64, 10f64), (-1f64, 1f64), 10f64), 1f64);
    }

    #[test]
    fn test_wrap_pi() {
        const PI: f64 = std::f64::consts::PI;

        assert!((wrap_pi(0.5f64) - 0.5).abs() < 1e-12);
        assert!((wrap_pi(PI + 0.5) - (-PI + 0.5)).abs() < 1e-12);
        assert!((wrap_pi(-PI - 0.5) - (PI - 0.5)).abs() < 1e-12);
    }
}
