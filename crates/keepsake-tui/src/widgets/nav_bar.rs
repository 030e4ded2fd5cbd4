use keepsake_core::surface::anchors;
use keepsake_core::{Control, SectionRegistry};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::animation::{blend, opacity};
use crate::app::App;

const SEPARATOR: u16 = 1;

/// Label drawn for a navigation control
fn control_label(control: Control, audio_enabled: bool) -> String {
    match control {
        Control::Section(id) => format!(" {} ", id.label()),
        Control::Replay => " ↻ Replay ".to_string(),
        Control::Restart => " « Restart ".to_string(),
        Control::ToggleAudio => {
            if audio_enabled {
                " ♪ On ".to_string()
            } else {
                " ♪ Off ".to_string()
            }
        }
        Control::Begin => String::new(),
    }
}

/// Hit regions of the navigation bar: section tabs from the left, the
/// replay, restart and audio buttons from the right. Tabs that would run
/// into the buttons are dropped.
pub fn nav_layout(area: Rect, registry: &SectionRegistry, audio_enabled: bool) -> Vec<(Rect, Control)> {
    let mut regions = Vec::new();
    if area.width == 0 || area.height == 0 {
        return regions;
    }

    let mut right = area.x.saturating_add(area.width);
    let mut buttons = Vec::new();
    for control in [Control::ToggleAudio, Control::Restart, Control::Replay] {
        let width = control_label(control, audio_enabled).width() as u16;
        if right < area.x + width {
            break;
        }
        right -= width;
        buttons.push((Rect::new(right, area.y, width, 1), control));
        right = right.saturating_sub(SEPARATOR);
    }

    let mut x = area.x;
    for id in registry.ids() {
        let control = Control::Section(id);
        let width = control_label(control, audio_enabled).width() as u16;
        if x + width > right {
            break;
        }
        regions.push((Rect::new(x, area.y, width, 1), control));
        x += width + SEPARATOR;
    }

    buttons.reverse();
    regions.extend(buttons);
    regions
}

pub struct NavBarWidget;

impl NavBarWidget {
    /// Render the bar and register its hit regions; hidden until navigation is enabled
    pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
        let now = app.now();
        let Some(view) = app.navigator.surface().anchor(anchors::NAVIGATION) else {
            return;
        };
        let visible = view.visible;
        let alpha = opacity(app.config.ui.easing, visible, view.since, now);
        if alpha <= 0.0 {
            return;
        }

        let theme = &app.theme;
        let current = app.navigator.current();
        let audio_enabled = app.navigator.audio_enabled();
        let regions = nav_layout(area, app.navigator.registry(), audio_enabled);

        let mut spans = Vec::new();
        let mut x = area.x;
        for (rect, control) in &regions {
            if rect.x > x {
                spans.push(Span::raw(" ".repeat((rect.x - x) as usize)));
            }
            let active = matches!(control, Control::Section(id) if *id == current);
            let style = if active {
                Style::default()
                    .fg(theme.background)
                    .bg(blend(theme.background, theme.rose, alpha))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(blend(theme.background, theme.foreground, alpha))
            };
            spans.push(Span::styled(control_label(*control, audio_enabled), style));
            x = rect.x + rect.width;
        }

        let paragraph = Paragraph::new(Line::from(spans))
            .style(Style::default().bg(blend(theme.background, theme.surface, alpha)));
        frame.render_widget(paragraph, area);

        // Only clickable once fully shown
        if visible {
            app.hitboxes.extend(regions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_core::{config::EffectsConfig, SectionId};

    #[test]
    fn test_layout_tabs_then_buttons() {
        let registry = SectionRegistry::standard(&EffectsConfig::default());
        let regions = nav_layout(Rect::new(0, 10, 120, 1), &registry, false);

        let controls: Vec<Control> = regions.iter().map(|(_, c)| *c).collect();
        assert_eq!(controls.len(), 10);
        assert_eq!(controls[0], Control::Section(SectionId::Landing));
        assert_eq!(controls[6], Control::Section(SectionId::Finale));
        assert_eq!(&controls[7..], &[Control::Replay, Control::Restart, Control::ToggleAudio]);

        let (home, _) = regions[0];
        assert_eq!(home, Rect::new(0, 10, 6, 1));
        let (audio, _) = regions[9];
        assert_eq!(audio.x + audio.width, 120);

        for pair in regions.windows(2) {
            assert!(pair[0].0.x + pair[0].0.width <= pair[1].0.x);
        }
    }

    #[test]
    fn test_layout_drops_tabs_that_do_not_fit() {
        let registry = SectionRegistry::standard(&EffectsConfig::default());
        let regions = nav_layout(Rect::new(0, 0, 40, 1), &registry, true);
        assert!(regions
            .iter()
            .any(|(_, c)| *c == Control::ToggleAudio));
        assert!(!regions
            .iter()
            .any(|(_, c)| *c == Control::Section(SectionId::Finale)));

        assert!(nav_layout(Rect::new(0, 0, 0, 1), &registry, true).is_empty());
    }
}
