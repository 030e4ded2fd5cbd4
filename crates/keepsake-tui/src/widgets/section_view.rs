//! Content of the section on screen
//!
//! Every element reads its fade from the surface: the section from the time
//! it was shown, anchors and staggered children from their last visibility
//! change.

use keepsake_core::surface::anchors;
use keepsake_core::{Control, EasingType, Millis, SectionId};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::animation::{blend, blink, opacity, CURSOR_BLINK_MS};
use crate::app::App;
use crate::content;
use crate::surface::TerminalSurface;
use crate::theme::Theme;

const CURSOR: &str = "▌";

/// Per-frame values shared by the section renderers
struct Paint<'a> {
    surface: &'a TerminalSurface,
    theme: &'a Theme,
    easing: EasingType,
    now: Millis,
    /// Fade of the section itself
    section_alpha: f64,
}

impl Paint<'_> {
    fn tint(&self, color: Color, alpha: f64) -> Color {
        blend(self.theme.background, color, alpha)
    }

    fn anchor_alpha(&self, name: &str) -> f64 {
        self.surface
            .anchor(name)
            .map(|view| opacity(self.easing, view.visible, view.since, self.now))
            .unwrap_or(0.0)
    }

    /// Fade of a staggered child, never brighter than the section
    fn child_alpha(&self, selector: &str, index: usize) -> f64 {
        self.surface
            .child(selector, index)
            .map(|view| opacity(self.easing, view.visible, view.since, self.now))
            .unwrap_or(1.0)
            .min(self.section_alpha)
    }

    fn heading(&self, frame: &mut Frame, area: Rect, id: SectionId) {
        let style = Style::default()
            .fg(self.tint(self.theme.rose, self.section_alpha))
            .add_modifier(Modifier::BOLD);
        let paragraph = Paragraph::new(Line::styled(content::heading(id), style))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn card(&self, title: &str, color: Color, alpha: f64) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.tint(color, alpha)))
            .title(Span::styled(
                format!(" {} ", title),
                Style::default()
                    .fg(self.tint(color, alpha))
                    .add_modifier(Modifier::BOLD),
            ))
            .title_alignment(Alignment::Center)
    }
}

pub struct SectionViewWidget;

impl SectionViewWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
        let now = app.now();
        let surface = app.navigator.surface();
        let Some((id, since)) = surface.section() else {
            return;
        };
        let paint = Paint {
            surface,
            theme: &app.theme,
            easing: app.config.ui.easing,
            now,
            section_alpha: opacity(app.config.ui.easing, true, since, now),
        };

        let begin = match id {
            SectionId::Landing => render_landing(frame, area, &paint),
            SectionId::Poem => {
                render_poem(frame, area, &paint);
                None
            }
            SectionId::About => {
                render_achievements(frame, area, &paint);
                None
            }
            SectionId::Gallery => {
                render_gallery(frame, area, &paint);
                None
            }
            SectionId::Testimonials => {
                render_testimonials(frame, area, &paint);
                None
            }
            SectionId::Video => {
                render_video(frame, area, &paint);
                None
            }
            SectionId::Finale => {
                render_finale(frame, area, &paint);
                None
            }
        };

        if let Some(rect) = begin {
            app.hitboxes.push((rect, Control::Begin));
        }
    }
}

/// Rect of `width` x `height` centred in `area`
fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Split `area` into a `cols` x `rows` grid, row-major
fn grid(area: Rect, cols: u32, rows: u32) -> Vec<Rect> {
    let row_areas = Layout::vertical((0..rows).map(|_| Constraint::Ratio(1, rows))).split(area);
    row_areas
        .iter()
        .flat_map(|row| {
            Layout::horizontal((0..cols).map(|_| Constraint::Ratio(1, cols)))
                .spacing(1)
                .split(*row)
                .to_vec()
        })
        .collect()
}

/// Returns the begin button's rect while the intro is up
fn render_landing(frame: &mut Frame, area: Rect, paint: &Paint) -> Option<Rect> {
    let theme = paint.theme;

    let [_, stage, _] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(content::CENTERPIECE.len() as u16 + 4),
        Constraint::Min(0),
    ])
    .areas(area);

    let intro_alpha = paint.anchor_alpha(anchors::INTRO);
    let intro_visible = paint
        .surface
        .anchor(anchors::INTRO)
        .map(|view| view.visible)
        .unwrap_or(false);

    let mut begin = None;
    if intro_alpha > 0.0 {
        let lines = vec![
            Line::styled(
                content::INTRO_TITLE,
                Style::default()
                    .fg(paint.tint(theme.rose, intro_alpha))
                    .add_modifier(Modifier::BOLD),
            ),
            Line::default(),
            Line::styled(
                content::INTRO_SUBTITLE,
                Style::default().fg(paint.tint(theme.lavender, intro_alpha)),
            ),
            Line::default(),
            Line::styled(
                content::BEGIN_LABEL,
                Style::default()
                    .fg(paint.tint(theme.accent, intro_alpha))
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        let height = lines.len() as u16;
        let intro_area = centered(stage.width, height, stage);
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            intro_area,
        );

        let label_width = content::BEGIN_LABEL.width() as u16;
        let label_row = intro_area.y + height.saturating_sub(1);
        if intro_visible && label_row < area.y + area.height {
            begin = Some(centered(
                label_width,
                1,
                Rect::new(intro_area.x, label_row, intro_area.width, 1),
            ));
        }
    }

    let cake_alpha = paint.anchor_alpha(anchors::CENTERPIECE);
    if cake_alpha > 0.0 {
        let [cake_area, _, message_area] = Layout::vertical([
            Constraint::Length(content::CENTERPIECE.len() as u16),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .areas(stage);

        let cake: Vec<Line> = content::CENTERPIECE
            .iter()
            .enumerate()
            .map(|(row, line)| {
                // Candles in gold, the cake in rose
                let color = if row < 2 { theme.gold } else { theme.rose };
                Line::styled(*line, Style::default().fg(paint.tint(color, cake_alpha)))
            })
            .collect();
        frame.render_widget(Paragraph::new(cake).alignment(Alignment::Center), cake_area);

        if let Some(view) = paint.surface.anchor(anchors::TYPEWRITER) {
            let mut spans = vec![Span::styled(
                view.text.clone(),
                Style::default()
                    .fg(paint.tint(theme.foreground, cake_alpha))
                    .add_modifier(Modifier::ITALIC),
            )];
            if view.cursor && blink(paint.now, CURSOR_BLINK_MS) {
                spans.push(Span::styled(CURSOR, Style::default().fg(theme.accent)));
            }
            frame.render_widget(
                Paragraph::new(Line::from(spans))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                message_area,
            );
        }
    }

    begin
}

fn render_poem(frame: &mut Frame, area: Rect, paint: &Paint) {
    let mut constraints = vec![Constraint::Length(2)];
    constraints.extend(
        content::POEM_STANZAS
            .iter()
            .map(|stanza| Constraint::Length(stanza.len() as u16 + 1)),
    );
    constraints.push(Constraint::Min(0));
    let rows = Layout::vertical(constraints).split(area);

    paint.heading(frame, rows[0], SectionId::Poem);
    for (i, stanza) in content::POEM_STANZAS.iter().enumerate() {
        let alpha = paint.child_alpha(anchors::POEM_STANZAS, i);
        if alpha <= 0.0 {
            continue;
        }
        let style = Style::default().fg(paint.tint(paint.theme.foreground, alpha));
        let lines: Vec<Line> = stanza.iter().map(|line| Line::styled(*line, style)).collect();
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rows[i + 1]);
    }
}

fn render_achievements(frame: &mut Frame, area: Rect, paint: &Paint) {
    let [head, body] = Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);
    paint.heading(frame, head, SectionId::About);

    let colors = [paint.theme.gold, paint.theme.rose, paint.theme.lavender, paint.theme.accent];
    for (i, ((title, text), cell)) in content::ACHIEVEMENTS
        .iter()
        .zip(grid(body, 2, 2))
        .enumerate()
    {
        let alpha = paint.child_alpha(anchors::ACHIEVEMENTS, i);
        if alpha <= 0.0 {
            continue;
        }
        let block = paint.card(title, colors[i % colors.len()], alpha);
        let paragraph = Paragraph::new(*text)
            .style(Style::default().fg(paint.tint(paint.theme.foreground, alpha)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(paragraph, cell);
    }
}

fn render_gallery(frame: &mut Frame, area: Rect, paint: &Paint) {
    let [head, body] = Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);
    paint.heading(frame, head, SectionId::Gallery);

    for (i, ((caption, when), cell)) in content::POLAROIDS.iter().zip(grid(body, 3, 2)).enumerate() {
        let alpha = paint.child_alpha(anchors::POLAROIDS, i);
        if alpha <= 0.0 {
            continue;
        }
        let frame_color = paint.tint(paint.theme.foreground, alpha);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(frame_color));
        let inner = block.inner(cell);
        frame.render_widget(block, cell);

        let [photo, label, date] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let fill: Vec<Line> = (0..photo.height)
            .map(|_| {
                Line::styled(
                    "░".repeat(photo.width as usize),
                    Style::default().fg(paint.tint(paint.theme.lavender, alpha)),
                )
            })
            .collect();
        frame.render_widget(Paragraph::new(fill), photo);
        frame.render_widget(
            Paragraph::new(*caption)
                .style(Style::default().fg(frame_color))
                .alignment(Alignment::Center),
            label,
        );
        frame.render_widget(
            Paragraph::new(*when)
                .style(Style::default().fg(paint.tint(paint.theme.muted, alpha)))
                .alignment(Alignment::Center),
            date,
        );
    }
}

fn render_testimonials(frame: &mut Frame, area: Rect, paint: &Paint) {
    let [head, body] = Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);
    paint.heading(frame, head, SectionId::Testimonials);

    let count = content::TESTIMONIALS.len() as u32;
    let rows = Layout::vertical((0..count).map(|_| Constraint::Ratio(1, count))).split(body);
    for (i, (quote, author)) in content::TESTIMONIALS.iter().enumerate() {
        let alpha = paint.child_alpha(anchors::TESTIMONIALS, i);
        if alpha <= 0.0 {
            continue;
        }
        let lines = vec![
            Line::styled(
                format!("“{}”", quote),
                Style::default()
                    .fg(paint.tint(paint.theme.foreground, alpha))
                    .add_modifier(Modifier::ITALIC),
            ),
            Line::styled(
                format!("~ {}", author),
                Style::default().fg(paint.tint(paint.theme.rose, alpha)),
            ),
        ];
        let block = Block::default()
            .borders(Borders::LEFT)
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(paint.tint(paint.theme.accent, alpha)));
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
            rows[i],
        );
    }
}

fn render_video(frame: &mut Frame, area: Rect, paint: &Paint) {
    let alpha = paint.section_alpha;
    let [head, body] = Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);
    paint.heading(frame, head, SectionId::Video);

    let screen = centered(body.width.min(48), body.height.min(9), body);
    let block = paint.card(content::VIDEO_CAPTION, paint.theme.lavender, alpha);
    let inner = block.inner(screen);
    frame.render_widget(block, screen);

    let lines = vec![
        Line::styled(
            "▶",
            Style::default()
                .fg(paint.tint(paint.theme.accent, alpha))
                .add_modifier(Modifier::BOLD),
        ),
        Line::default(),
        Line::styled(content::VIDEO_HINT, Style::default().fg(paint.tint(paint.theme.muted, alpha))),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        centered(inner.width, 3, inner),
    );
}

fn render_finale(frame: &mut Frame, area: Rect, paint: &Paint) {
    let alpha = paint.section_alpha;
    let mut lines = vec![
        Line::styled(
            content::FINALE_TITLE,
            Style::default()
                .fg(paint.tint(paint.theme.gold, alpha))
                .add_modifier(Modifier::BOLD),
        ),
        Line::default(),
    ];
    lines.extend(content::FINALE_MESSAGE.iter().map(|line| {
        Line::styled(*line, Style::default().fg(paint.tint(paint.theme.foreground, alpha)))
    }));

    let height = lines.len() as u16;
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        centered(area.width, height, area),
    );
}
