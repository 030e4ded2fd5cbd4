use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use keepsake_core::surface::anchors;
use keepsake_core::{
    AppConfig, Control, InputEvent, InputRouter, Millis, MonotonicClock, NavKey, Navigator,
    NavigatorEvent, Phase, SectionRegistry,
};
use ratatui::layout::Rect;
use tracing::debug;

use crate::animation::FADE_MS;
use crate::input::Action;
use crate::surface::TerminalSurface;
use crate::theme::Theme;

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Key help overlay
    Help,
}

/// Application state
pub struct App {
    pub config: Arc<AppConfig>,
    pub navigator: Navigator<TerminalSurface>,
    pub router: InputRouter,
    pub theme: Theme,
    pub mode: Mode,
    pub should_quit: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Clickable regions from the last frame
    pub hitboxes: Vec<(Rect, Control)>,
    events: Receiver<NavigatorEvent>,
}

impl App {
    pub fn new(config: Arc<AppConfig>, theme: Theme) -> Self {
        let registry = SectionRegistry::standard(&config.effects);
        Self::with_registry(config, theme, registry)
    }

    pub fn with_registry(config: Arc<AppConfig>, theme: Theme, registry: SectionRegistry) -> Self {
        let clock = MonotonicClock::new();
        let (tx, rx) = mpsc::channel();
        let navigator = Navigator::new(registry, TerminalSurface::new(clock.clone()), &config)
            .with_clock(clock)
            .with_event_sender(tx);

        Self {
            router: InputRouter::new(config.input.wheel_cooldown_ms),
            config,
            navigator,
            theme,
            mode: Mode::Normal,
            should_quit: false,
            status_message: None,
            hitboxes: Vec::new(),
            events: rx,
        }
    }

    /// Wall-clock presentation time used for drawing
    pub fn now(&self) -> Millis {
        self.navigator.surface().now()
    }

    /// Advance the presentation and fold navigator events into the status line
    pub fn tick(&mut self) {
        self.navigator.tick();
        self.drain_events();
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleHelp => {
                self.mode = match self.mode {
                    Mode::Normal => Mode::Help,
                    Mode::Help => Mode::Normal,
                };
            }
            Action::CloseHelp => self.mode = Mode::Normal,
            Action::Begin => {
                if self.navigator.phase() == Phase::Idle {
                    self.dispatch(InputEvent::Click(Control::Begin));
                }
            }
            Action::Next => self.dispatch(InputEvent::Key(NavKey::Next)),
            Action::Previous => self.dispatch(InputEvent::Key(NavKey::Previous)),
            Action::First => self.dispatch(InputEvent::Key(NavKey::First)),
            Action::Last => self.dispatch(InputEvent::Key(NavKey::Last)),
            Action::Replay => self.dispatch(InputEvent::Click(Control::Replay)),
            Action::Restart => self.dispatch(InputEvent::Click(Control::Restart)),
            Action::ToggleAudio => self.dispatch(InputEvent::Click(Control::ToggleAudio)),
            Action::Wheel(steps) => self.dispatch(InputEvent::Wheel {
                delta_y: steps as f64,
            }),
            Action::Click { column, row } => {
                if let Some(control) = self.hit_test(column, row) {
                    self.dispatch(InputEvent::Click(control));
                }
            }
            Action::None => {}
        }
    }

    /// Control under a terminal cell
    pub fn hit_test(&self, column: u16, row: u16) -> Option<Control> {
        self.hitboxes
            .iter()
            .find(|(rect, _)| {
                column >= rect.x
                    && column < rect.x.saturating_add(rect.width)
                    && row >= rect.y
                    && row < rect.y.saturating_add(rect.height)
            })
            .map(|(_, control)| *control)
    }

    /// Whether the next frame differs from the last one
    pub fn is_animating(&self) -> bool {
        let surface = self.navigator.surface();
        let now = self.now();
        let recently_shown = surface
            .section()
            .map(|(_, since)| now.saturating_sub(since) < FADE_MS)
            .unwrap_or(false);

        self.navigator.phase() == Phase::Opening
            || self.navigator.live_count() > 0
            || recently_shown
            || !surface.units(anchors::PETALS).is_empty()
            || !surface.units(anchors::CONFETTI).is_empty()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    fn dispatch(&mut self, event: InputEvent) {
        let changed = self.router.dispatch(&mut self.navigator, event);
        debug!(?event, changed, "Input dispatched");
        self.drain_events();
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                NavigatorEvent::SectionChanged { to, .. } => {
                    let registry = self.navigator.registry();
                    let position = registry.position(to).map(|p| p + 1).unwrap_or(0);
                    let message = format!("{} ({}/{})", to.label(), position, registry.len());
                    self.set_status(message);
                }
                NavigatorEvent::NavigationEnabled => {
                    self.set_status("Use ←/→, the wheel or click a tab to explore");
                }
                NavigatorEvent::AudioChanged { enabled } => {
                    self.set_status(if enabled { "Music on" } else { "Music off" });
                }
                NavigatorEvent::Reset => self.clear_status(),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_core::SectionId;

    fn app() -> App {
        App::new(Arc::new(AppConfig::default()), Theme::default())
    }

    #[test]
    fn test_begin_only_from_idle() {
        let mut app = app();
        app.handle_action(Action::Begin);
        assert_eq!(app.navigator.phase(), Phase::Opening);
        assert!(app.is_animating());

        app.handle_action(Action::Begin);
        assert_eq!(app.navigator.phase(), Phase::Opening);

        app.handle_action(Action::Restart);
        assert_eq!(app.navigator.phase(), Phase::Idle);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_help_toggle() {
        let mut app = app();
        app.handle_action(Action::ToggleHelp);
        assert_eq!(app.mode, Mode::Help);
        app.handle_action(Action::CloseHelp);
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_click_hits_control() {
        let mut app = app();
        app.hitboxes = vec![
            (Rect::new(0, 0, 6, 1), Control::Section(SectionId::Poem)),
            (Rect::new(10, 0, 5, 1), Control::ToggleAudio),
        ];
        assert_eq!(app.hit_test(5, 0), Some(Control::Section(SectionId::Poem)));
        assert_eq!(app.hit_test(6, 0), None);
        assert_eq!(app.hit_test(12, 1), None);

        app.handle_action(Action::Click { column: 11, row: 0 });
        assert!(app.navigator.audio_enabled());
        assert_eq!(app.status_message.as_deref(), Some("Music on"));
    }

    #[test]
    fn test_navigation_ignored_while_idle() {
        let mut app = app();
        app.handle_action(Action::Next);
        app.handle_action(Action::Wheel(1));
        assert_eq!(app.navigator.current(), SectionId::Landing);
    }
}
