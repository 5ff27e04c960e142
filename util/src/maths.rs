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

/// Clamp a value into `[min, max]`.
///
/// If `min > max` the upper bound wins, matching the behaviour of clamping
/// a speed demand whose minimum is configured above its maximum.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    let mut ret = value;

    if ret < min {
        ret = min
    }
    if ret > max {
        ret = max
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// `num_traits::Float` has no `rem_euclid`, so this mirrors the std
/// implementation.
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

/// Wrap an angle in degrees into the range [-180, 180).
pub fn wrap_deg<T>(angle_deg: T) -> T
where
    T: Float,
{
    let half_turn = T::from(180.0).unwrap_or_else(T::zero);
    let full_turn = half_turn + half_turn;

    rem_euclid(angle_deg + half_turn, full_turn) - half_turn
}

/// Get the shortest signed angular distance from `from_deg` to `to_deg`.
///
/// The result is in [-180, 180), so adding it to `from_deg` reaches `to_deg`
/// (modulo a full turn) by the shortest way round.
pub fn ang_dist_deg<T>(from_deg: T, to_deg: T) -> T
where
    T: Float,
{
    wrap_deg(to_deg - from_deg)
}

#[cfg(test)]
mod test {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_lin_map() {
        assert!(close(lin_map((0.0, 10.0), (0.0, 100.0), 2.5), 25.0));
        assert!(close(lin_map((-1.0, 1.0), (0.0, 1.0), 0.0), 0.5));
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-5.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);

        // Inverted bounds resolve to the maximum
        assert_eq!(clamp(0.5, 2.0, 1.0), 1.0);
    }

    #[test]
    fn test_wrap_deg() {
        assert!(close(wrap_deg(0.0), 0.0));
        assert!(close(wrap_deg(190.0), -170.0));
        assert!(close(wrap_deg(-190.0), 170.0));
        assert!(close(wrap_deg(360.0), 0.0));
        assert!(close(wrap_deg(180.0), -180.0));
        assert!(close(wrap_deg(-180.0), -180.0));
    }

    #[test]
    fn test_ang_dist_deg() {
        assert!(close(ang_dist_deg(10.0, 20.0), 10.0));
        assert!(close(ang_dist_deg(20.0, 10.0), -10.0));

        // Across the +/-180 seam
        assert!(close(ang_dist_deg(179.0, -179.0), 2.0));
        assert!(close(ang_dist_deg(-179.0, 179.0), -2.0));
        assert!(close(ang_dist_deg(-90.0, 90.0), -180.0));
    }
}
