//! Exponential easing toward a moving target
//!
//! The rate is applied once per frame and is not scaled by frame delta, so
//! convergence speed follows the display refresh rate.

/// Move `current` a fraction `rate` of the way to `target`.
///
/// Snaps to `target` exactly once the remaining distance is within
/// `threshold`, so an eased value settles instead of approaching forever.
#[inline]
pub fn ease(current: f32, target: f32, rate: f32, threshold: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= threshold {
        target
    } else {
        current + delta * rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{CAMERA_EASE, PARTICLE_SIZE_EASE};
    use proptest::prelude::*;

    #[test]
    fn test_ease_moves_fraction_of_distance() {
        assert!((ease(0.0, 10.0, 0.5, 0.0) - 5.0).abs() < 1e-6);
        assert!((ease(10.0, 0.0, 0.25, 0.0) - 7.5).abs() < 1e-6);
    }

    #[test]
    fn test_ease_snaps_within_threshold() {
        assert_eq!(ease(0.95, 1.0, 0.1, 0.05), 1.0);
        assert_eq!(ease(1.04, 1.0, 0.1, 0.05), 1.0);
        // Just outside the threshold still eases
        assert!(ease(0.9, 1.0, 0.1, 0.05) < 1.0);
    }

    #[test]
    fn test_rates_are_distinct() {
        assert!((PARTICLE_SIZE_EASE / CAMERA_EASE - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_camera_rate_converges_slowly() {
        let mut x = 0.0;
        for _ in 0..60 {
            x = ease(x, 20.0, CAMERA_EASE, 0.0);
        }
        // One second at 60 Hz covers roughly 14% of the distance
        assert!(x > 2.0 && x < 4.0, "x = {x}");
    }

    proptest! {
        #[test]
        fn prop_target_is_fixed_point(
            x in -1.0e4f32..1.0e4,
            rate in 0.0001f32..=1.0,
            threshold in 0.0f32..10.0,
        ) {
            prop_assert_eq!(ease(x, x, rate, threshold), x);
        }

        #[test]
        fn prop_snaps_within_threshold(
            c in -1.0e3f32..1.0e3,
            offset in -1.0f32..1.0,
            rate in 0.0001f32..=1.0,
        ) {
            let t = c + offset;
            let threshold = (t - c).abs();
            prop_assert_eq!(ease(c, t, rate, threshold), t);
        }

        #[test]
        fn prop_never_overshoots(
            c in -1.0e3f32..1.0e3,
            t in -1.0e3f32..1.0e3,
            rate in 0.0001f32..=1.0,
        ) {
            let next = ease(c, t, rate, 0.0);
            let (lo, hi) = if c <= t { (c, t) } else { (t, c) };
            prop_assert!(next >= lo - 1e-3 && next <= hi + 1e-3);
        }
    }
}
