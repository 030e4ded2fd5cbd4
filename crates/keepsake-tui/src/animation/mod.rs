//! Frame-level animation helpers: fades, blinking and falling units
//!
//! - `easing` - easing curves for the configured [`EasingType`]
//! - `timing` - progress and interpolation on the presentation clock

pub mod easing;
pub mod timing;

use keepsake_core::{EffectUnit, Millis};
use ratatui::style::Color;

pub use easing::{Ease, EasingType};
pub use timing::{blink, lerp, lerp_u16, progress};

/// Length of a fade-in or fade-out
pub const FADE_MS: Millis = 800;

/// Period of the typewriter cursor blink
pub const CURSOR_BLINK_MS: Millis = 530;

/// Opacity of an element whose visibility flipped at `since`
pub fn opacity(easing: EasingType, visible: bool, since: Millis, now: Millis) -> f64 {
    let t = easing.ease(progress(since, now, FADE_MS));
    if visible {
        t
    } else {
        1.0 - t
    }
}

/// Mix `from` into `to`; anything but RGB snaps at the midpoint
pub fn blend(from: Color, to: Color, t: f64) -> Color {
    match (from, to) {
        (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) => {
            let mix = |a: u8, b: u8| lerp(a as f64, b as f64, t.clamp(0.0, 1.0)).round() as u8;
            Color::Rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2))
        }
        _ => {
            if t < 0.5 {
                from
            } else {
                to
            }
        }
    }
}

/// Cell of a falling unit inside a `width` x `height` area, if it is on screen
pub fn fall_position(unit: &EffectUnit, now: Millis, width: u16, height: u16) -> Option<(u16, u16)> {
    if width == 0 || height == 0 {
        return None;
    }
    let t = unit.fall_progress(now);
    if now < unit.mounted_at + unit.delay_ms {
        return None;
    }
    let x = ((unit.x_percent / 100.0) * width as f64).floor() as u16;
    let y = lerp_u16(0, height, t);
    if x >= width || y >= height {
        return None;
    }
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_core::UnitId;

    fn unit(x_percent: f64) -> EffectUnit {
        EffectUnit {
            id: UnitId(1),
            x_percent,
            size: 10.0,
            color: "#ffd700".into(),
            fall_ms: 1_000,
            delay_ms: 200,
            mounted_at: 0,
            lifetime_ms: 2_000,
        }
    }

    #[test]
    fn test_opacity_fades_both_ways() {
        assert_eq!(opacity(EasingType::Linear, true, 0, 0), 0.0);
        assert_eq!(opacity(EasingType::Linear, true, 0, FADE_MS), 1.0);
        assert_eq!(opacity(EasingType::Linear, false, 0, FADE_MS), 0.0);
    }

    #[test]
    fn test_blend() {
        let mid = blend(Color::Rgb(0, 0, 0), Color::Rgb(200, 100, 50), 0.5);
        assert_eq!(mid, Color::Rgb(100, 50, 25));
        assert_eq!(blend(Color::Red, Color::Blue, 0.2), Color::Red);
    }

    #[test]
    fn test_fall_position() {
        let u = unit(50.0);
        assert_eq!(fall_position(&u, 100, 40, 20), None);
        assert_eq!(fall_position(&u, 200, 40, 20), Some((20, 0)));
        assert_eq!(fall_position(&u, 700, 40, 20), Some((20, 10)));
        // Landed units leave the area
        assert_eq!(fall_position(&u, 1_200, 40, 20), None);
    }
}
