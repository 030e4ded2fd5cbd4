use keepsake_core::surface::anchors;
use keepsake_core::{EffectUnit, Millis};
use ratatui::{buffer::Buffer, layout::Rect, Frame};

use crate::animation::fall_position;
use crate::app::App;
use crate::theme::{unit_color, Theme};

const PETAL: &str = "✿";
const CONFETTI: &str = "▪";
/// Units at least this large use the heavier glyph
const LARGE_CONFETTI: f64 = 10.0;

pub struct ParticlesWidget;

impl ParticlesWidget {
    /// Draw falling petals and confetti over whatever is already in `area`
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let now = app.now();
        let surface = app.navigator.surface();
        let buf = frame.buffer_mut();

        draw_units(buf, area, surface.units(anchors::PETALS), now, &app.theme, |_| PETAL);
        draw_units(buf, area, surface.units(anchors::CONFETTI), now, &app.theme, |unit| {
            if unit.size >= LARGE_CONFETTI {
                "■"
            } else {
                CONFETTI
            }
        });
    }
}

fn draw_units(
    buf: &mut Buffer,
    area: Rect,
    units: &[EffectUnit],
    now: Millis,
    theme: &Theme,
    glyph: impl Fn(&EffectUnit) -> &'static str,
) {
    for unit in units {
        let Some((x, y)) = fall_position(unit, now, area.width, area.height) else {
            continue;
        };
        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(glyph(unit));
            cell.set_fg(unit_color(theme, &unit.color));
        }
    }
}
