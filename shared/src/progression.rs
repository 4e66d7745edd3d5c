//! Experience curve.
//!
//! The level is derived from experience with
//! `max(1, floor(ln(xp + 1) * LEVEL_SCALE) + 1)`, evaluated in `f64`.
//! [`level_bounds`] inverts the curve for progress bars; its result is
//! corrected against [`level_for_xp`] so the two never disagree at a
//! boundary.

use crate::constants::LEVEL_SCALE;

/// Experience range covered by one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBounds {
    /// Smallest xp at which the level is reached.
    pub lower: u32,
    /// Smallest xp of the next level, `None` when it does not fit in `u32`.
    pub upper: Option<u32>,
}

pub fn level_for_xp(xp: u32) -> u32 {
    let raw = (f64::from(xp) + 1.0).ln() * LEVEL_SCALE;
    let level = raw.floor() as u32 + 1;
    level.max(1)
}

/// Smallest xp whose level is at least `level`.
fn min_xp_for_level(level: u32) -> Option<u32> {
    if level <= 1 {
        return Some(0);
    }

    let estimate = (f64::from(level - 1) / LEVEL_SCALE).exp() - 1.0;
    if !estimate.is_finite() || estimate >= f64::from(u32::MAX) {
        return None;
    }

    let mut xp = estimate.max(0.0).ceil() as u32;
    while xp > 0 && level_for_xp(xp - 1) >= level {
        xp -= 1;
    }
    while level_for_xp(xp) < level {
        xp = xp.checked_add(1)?;
    }
    Some(xp)
}

pub fn level_bounds(level: u32) -> LevelBounds {
    let level = level.max(1);
    LevelBounds {
        lower: min_xp_for_level(level).unwrap_or(u32::MAX),
        upper: level.checked_add(1).and_then(min_xp_for_level),
    }
}

/// Fraction of the current level completed, in `[0, 1)`.
pub fn level_progress(xp: u32) -> f64 {
    let bounds = level_bounds(level_for_xp(xp));
    match bounds.upper {
        Some(upper) if upper > bounds.lower => {
            f64::from(xp - bounds.lower) / f64::from(upper - bounds.lower)
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_at_zero_xp() {
        assert_eq!(level_for_xp(0), 1);
    }

    #[test]
    fn test_level_is_non_decreasing() {
        let mut previous = level_for_xp(0);
        for xp in 1..20_000 {
            let level = level_for_xp(xp);
            assert!(level >= previous, "level dropped at xp {}", xp);
            assert!(level <= previous + 1, "level skipped at xp {}", xp);
            previous = level;
        }
    }

    #[test]
    fn test_level_is_deterministic() {
        for xp in [0, 1, 2, 7, 25, 1000, u32::MAX] {
            assert_eq!(level_for_xp(xp), level_for_xp(xp));
        }
    }

    #[test]
    fn test_bounds_agree_with_forward_curve() {
        for level in 1..=15 {
            let bounds = level_bounds(level);
            assert_eq!(level_for_xp(bounds.lower), level);
            if bounds.lower > 0 {
                assert!(level_for_xp(bounds.lower - 1) < level);
            }
            let upper = bounds.upper.expect("next level fits in u32");
            assert!(upper > bounds.lower);
            assert_eq!(level_for_xp(upper), level + 1);
            assert_eq!(level_for_xp(upper - 1), level);
        }
    }

    #[test]
    fn test_every_xp_lies_inside_its_level_bounds() {
        for xp in 0..5_000 {
            let bounds = level_bounds(level_for_xp(xp));
            assert!(bounds.lower <= xp);
            assert!(bounds.upper.map_or(true, |upper| xp < upper));
        }
    }

    #[test]
    fn test_highest_level_has_no_upper_bound() {
        let top = level_for_xp(u32::MAX);
        assert_eq!(level_bounds(top).upper, None);
        assert_eq!(level_bounds(top + 5).lower, u32::MAX);
    }

    #[test]
    fn test_progress_range() {
        assert_eq!(level_progress(0), 0.0);
        for xp in 0..2_000 {
            let progress = level_progress(xp);
            assert!((0.0..1.0).contains(&progress), "xp {} gave {}", xp, progress);
        }
        let bounds = level_bounds(3);
        assert_eq!(level_progress(bounds.lower), 0.0);
    }
}
