use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::input::Action;
use crate::keymap::Keymap;
use crate::theme::Theme;

const HELP_ENTRIES: [(Action, &str); 10] = [
    (Action::Begin, "Begin"),
    (Action::Next, "Next section"),
    (Action::Previous, "Previous section"),
    (Action::First, "First section"),
    (Action::Last, "Last section"),
    (Action::Replay, "Replay effects"),
    (Action::Restart, "Restart"),
    (Action::ToggleAudio, "Music on/off"),
    (Action::ToggleHelp, "This help"),
    (Action::Quit, "Quit"),
];

pub struct PopupWidget;

impl PopupWidget {
    /// Render the key help overlay
    pub fn render_help(frame: &mut Frame, keymap: &Keymap, theme: &Theme) {
        let area = frame.area();

        let rows: Vec<(String, &str)> = HELP_ENTRIES
            .iter()
            .map(|(action, description)| {
                let keys = keymap.keys_for(*action);
                let keys = if keys.is_empty() {
                    "-".to_string()
                } else {
                    keys.join(" ")
                };
                (keys, *description)
            })
            .collect();
        let key_width = rows.iter().map(|(keys, _)| keys.chars().count()).max().unwrap_or(0);

        let mut lines: Vec<Line> = rows
            .into_iter()
            .map(|(keys, description)| {
                Line::from(vec![
                    Span::styled(
                        format!(" {:>width$} ", keys, width = key_width),
                        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(description, Style::default().fg(theme.foreground)),
                ])
            })
            .collect();
        lines.push(Line::default());
        lines.push(Line::styled(
            "Mouse: wheel to move, click a tab or button",
            Style::default().fg(theme.muted),
        ));

        let popup_width = 56u16.min(area.width.saturating_sub(4));
        let popup_height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
        let popup_area = centered_rect(popup_width, popup_height, area);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Keys ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.rose))
            .style(Style::default().bg(theme.surface));

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}

/// Helper function to create a centered rect
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
