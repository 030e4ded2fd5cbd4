use keepsake_core::Phase;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Mode};

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let navigator = &app.navigator;

        let mode_str = match app.mode {
            Mode::Help => "HELP".to_string(),
            Mode::Normal => navigator.phase().to_string().to_uppercase(),
        };
        let audio_str = if navigator.audio_enabled() { "♪ on" } else { "♪ off" };

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {} | {}", mode_str, msg)
        } else {
            let registry = navigator.registry();
            let current = navigator.current();
            let position = registry.position(current).map(|p| p + 1).unwrap_or(0);
            format!(
                " {} | {} {}/{} | {}",
                mode_str,
                current.label(),
                position,
                registry.len(),
                audio_str
            )
        };

        let help_hint = match navigator.phase() {
            Phase::Idle => " Enter:begin q:quit ?:help ",
            _ => " h/l:move r:replay R:restart m:music ?:help ",
        };
        let padding_len = area
            .width
            .saturating_sub(status_text.width() as u16 + help_hint.width() as u16)
            as usize;

        let bar = Style::default().bg(theme.surface);
        let line = Line::from(vec![
            Span::styled(status_text, bar.fg(theme.foreground)),
            Span::styled(" ".repeat(padding_len), bar),
            Span::styled(help_hint, bar.fg(theme.muted)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
