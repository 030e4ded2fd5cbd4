//! Progress and interpolation on the presentation clock

use keepsake_core::Millis;

/// Linear progress of an animation that started at `start`, clamped to [0, 1]
#[inline]
pub fn progress(start: Millis, now: Millis, duration: Millis) -> f64 {
    if duration == 0 {
        return 1.0;
    }
    (now.saturating_sub(start) as f64 / duration as f64).clamp(0.0, 1.0)
}

#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Interpolated terminal coordinate
#[inline]
pub fn lerp_u16(from: u16, to: u16, t: f64) -> u16 {
    lerp(from as f64, to as f64, t).round().max(0.0) as u16
}

/// On/off phase of a blinking element with the given period
#[inline]
pub fn blink(now: Millis, period: Millis) -> bool {
    period == 0 || (now / period) % 2 == 0
}
