//! Easing curves mapping linear progress in [0, 1] onto eased progress

pub use keepsake_core::EasingType;

/// Curve evaluation for the configured easing
pub trait Ease {
    /// Eased value of `t`; `t` is clamped to [0, 1] first
    fn ease(&self, t: f64) -> f64;
}

impl Ease for EasingType {
    #[inline]
    fn ease(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::None => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            EasingType::Linear => t,
            EasingType::Cubic => ease_out_pow(t, 3),
            EasingType::Quintic => ease_out_pow(t, 5),
            EasingType::EaseOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f64.powf(-10.0 * t)
                }
            }
        }
    }
}

/// 1 - (1 - t)^n
#[inline]
fn ease_out_pow(t: f64, n: i32) -> f64 {
    1.0 - (1.0 - t).powi(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EasingType; 5] = [
        EasingType::None,
        EasingType::Linear,
        EasingType::Cubic,
        EasingType::Quintic,
        EasingType::EaseOut,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!((easing.ease(1.0) - 1.0).abs() < 1e-3, "{:?} at 1", easing);
            assert!(easing.ease(0.0).abs() < 1e-3, "{:?} at 0", easing);
        }
    }

    #[test]
    fn test_monotonic_and_clamped() {
        for easing in ALL {
            let mut prev = easing.ease(-1.0);
            for i in 0..=20 {
                let v = easing.ease(i as f64 / 20.0);
                assert!(v >= prev, "{:?} not monotonic", easing);
                prev = v;
            }
            assert_eq!(easing.ease(3.0), 1.0);
        }
    }

    #[test]
    fn test_cubic_midpoint() {
        assert!((EasingType::Cubic.ease(0.5) - 0.875).abs() < 1e-9);
    }
}
