use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tracing::info;

use keepsake_core::AppConfig;
use keepsake_tui::{
    app::{App, Mode},
    event::{AppEvent, EventHandler},
    input::{handle_key_event, handle_mouse_event, Action},
    keymap::Keymap,
    load_theme,
    widgets::{NavBarWidget, ParticlesWidget, PopupWidget, SectionViewWidget, StatusBarWidget},
};

pub fn run(config: Arc<AppConfig>) -> Result<()> {
    // Create keymap from config
    let keymap = Keymap::from_config(&config.keymap);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Keepsake"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = load_theme(&config.ui.theme);
    let mut app = App::new(config.clone(), theme);

    let event_handler = EventHandler::with_animation_fps(config.ui.tick_rate_ms, config.ui.animation_fps);

    info!("Presentation started");
    let result = run_loop(&mut terminal, &mut app, &keymap, &event_handler);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    info!("Presentation closed");

    result
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    keymap: &Keymap,
    event_handler: &EventHandler,
) -> Result<()> {
    loop {
        app.tick();

        terminal.draw(|frame| draw(frame, app, keymap))?;

        // Poll faster while something is moving on screen
        let event = if app.is_animating() {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };

        match event {
            Some(AppEvent::Key(key)) => {
                let action = handle_key_event(key, app, keymap);
                app.handle_action(action);
            }
            Some(AppEvent::Mouse(mouse)) => {
                let action = if app.mode == Mode::Help {
                    Action::CloseHelp
                } else {
                    handle_mouse_event(mouse)
                };
                app.handle_action(action);
            }
            Some(AppEvent::Resize(_, _)) | Some(AppEvent::Tick) | None => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn draw(frame: &mut Frame, app: &mut App, keymap: &Keymap) {
    // Hit regions are rebuilt every frame
    app.hitboxes.clear();

    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(app.theme.background)), area);

    let [content, nav, status] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    SectionViewWidget::render(frame, content, app);
    ParticlesWidget::render(frame, content, app);
    NavBarWidget::render(frame, nav, app);
    StatusBarWidget::render(frame, status, app);

    if app.mode == Mode::Help {
        PopupWidget::render_help(frame, keymap, &app.theme);
    }
}
