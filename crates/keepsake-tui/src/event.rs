use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};

/// Event handler for terminal events
pub struct EventHandler {
    /// Poll timeout when nothing is moving
    idle_rate: Duration,
    /// Poll timeout while effects are running
    frame_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self::with_animation_fps(tick_rate_ms, 0)
    }

    /// Poll at `animation_fps` while animating, `tick_rate_ms` otherwise
    pub fn with_animation_fps(tick_rate_ms: u64, animation_fps: u32) -> Self {
        let idle_rate = Duration::from_millis(tick_rate_ms.max(1));
        let frame_rate = if animation_fps == 0 {
            idle_rate
        } else {
            Duration::from_millis((1000 / animation_fps as u64).max(1)).min(idle_rate)
        };
        Self {
            idle_rate,
            frame_rate,
        }
    }

    /// Poll for the next event at the idle rate
    pub fn next(&self) -> Result<Option<AppEvent>> {
        self.poll(self.idle_rate)
    }

    /// Poll for the next event at the animation frame rate
    pub fn next_animation(&self) -> Result<Option<AppEvent>> {
        self.poll(self.frame_rate)
    }

    fn poll(&self, timeout: Duration) -> Result<Option<AppEvent>> {
        if !event::poll(timeout)? {
            return Ok(Some(AppEvent::Tick));
        }
        let event = match event::read()? {
            // Some terminals also report releases; only presses count
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown | MouseEventKind::ScrollUp | MouseEventKind::Down(_) => {
                    Some(AppEvent::Mouse(mouse))
                }
                _ => None,
            },
            Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            _ => None,
        };
        Ok(event)
    }
}

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    /// A key was pressed
    Key(KeyEvent),
    /// Wheel step or button press
    Mouse(MouseEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// Poll timed out; time to advance the presentation
    Tick,
}
