//! Small 2D helpers used by every simulation system.

use std::f32::consts::{PI, TAU};

/// Vectors shorter than this normalise to zero.
const NORMALIZE_EPSILON: f32 = 1e-6;

/// Returns the unit vector pointing along `(x, y)`, or `(0, 0)` when the
/// input is too short to have a direction.
pub fn normalize(x: f32, y: f32) -> (f32, f32) {
    let len = x.hypot(y);
    if len < NORMALIZE_EPSILON {
        (0.0, 0.0)
    } else {
        (x / len, y / len)
    }
}

/// Clamps without panicking when `lo > hi`; the lower bound wins.
pub fn clamp(value: f32, lo: f32, hi: f32) -> f32 {
    value.min(hi).max(lo)
}

pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    (bx - ax).hypot(by - ay)
}

pub fn distance_sq(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    dx * dx + dy * dy
}

/// Wraps an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let mut wrapped = angle % TAU;
    if wrapped <= -PI {
        wrapped += TAU;
    } else if wrapped > PI {
        wrapped -= TAU;
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_normalize_diagonal() {
        let (x, y) = normalize(1.0, 1.0);
        assert_approx_eq!(x, std::f32::consts::FRAC_1_SQRT_2, 1e-6);
        assert_approx_eq!(y, std::f32::consts::FRAC_1_SQRT_2, 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(normalize(0.0, 0.0), (0.0, 0.0));
        assert_eq!(normalize(1e-9, -1e-9), (0.0, 0.0));
    }

    #[test]
    fn test_clamp_inverted_bounds() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(15.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp(3.0, 8.0, 2.0), 8.0);
    }

    #[test]
    fn test_distance() {
        assert_approx_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0, 1e-6);
        assert_approx_eq!(distance_sq(1.0, 1.0, 4.0, 5.0), 25.0, 1e-6);
    }

    #[test]
    fn test_wrap_angle_range() {
        assert_approx_eq!(wrap_angle(0.0), 0.0, 1e-6);
        assert_approx_eq!(wrap_angle(PI), PI, 1e-6);
        assert_approx_eq!(wrap_angle(-PI), PI, 1e-6);
        assert_approx_eq!(wrap_angle(3.0 * PI / 2.0), -PI / 2.0, 1e-5);
        assert_approx_eq!(wrap_angle(-3.0 * PI / 2.0), PI / 2.0, 1e-5);
        assert_approx_eq!(wrap_angle(5.0 * TAU + 0.25), 0.25, 1e-4);

        for i in -100..100 {
            let wrapped = wrap_angle(i as f32 * 0.37);
            assert!(wrapped > -PI && wrapped <= PI, "{} out of range", wrapped);
        }
    }
}
