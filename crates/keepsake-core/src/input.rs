//! Semantic input routing
//!
//! Terminal decoding lives in the TUI crate; by the time an event arrives here
//! it is a click on a named control, a navigation key or a wheel step.

use std::str::FromStr;

use tracing::debug;

use crate::navigator::Navigator;
use crate::section::SectionId;
use crate::surface::PresentationSurface;
use crate::timer::Millis;
use crate::{Error, Result};

/// Clickable controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Begin,
    Section(SectionId),
    Replay,
    Restart,
    ToggleAudio,
}

impl FromStr for Control {
    type Err = Error;

    /// Parses control names and `data-section` style section names
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "begin" => Ok(Control::Begin),
            "replay" => Ok(Control::Replay),
            "restart" => Ok(Control::Restart),
            "audio" | "music" | "toggle_audio" => Ok(Control::ToggleAudio),
            other => other.parse().map(Control::Section),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Next,
    Previous,
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Click(Control),
    Key(NavKey),
    /// Positive delta scrolls down (next section)
    Wheel { delta_y: f64 },
}

/// Routes input to the navigator and debounces wheel navigation
///
/// Holds no position state of its own; it always reads the navigator's
/// current section.
#[derive(Debug, Clone)]
pub struct InputRouter {
    wheel_cooldown_ms: Millis,
    cooldown_until: Option<Millis>,
}

impl InputRouter {
    pub fn new(wheel_cooldown_ms: Millis) -> Self {
        Self {
            wheel_cooldown_ms,
            cooldown_until: None,
        }
    }

    /// Apply an input event at the navigator's current time.
    /// Returns true when the event changed what is on screen.
    pub fn dispatch<S: PresentationSurface>(
        &mut self,
        navigator: &mut Navigator<S>,
        event: InputEvent,
    ) -> bool {
        match event {
            InputEvent::Click(control) => Self::click(navigator, control),
            InputEvent::Key(key) => match key {
                NavKey::Next => navigator.next(),
                NavKey::Previous => navigator.previous(),
                NavKey::First => navigator.first(),
                NavKey::Last => navigator.last(),
            },
            InputEvent::Wheel { delta_y } => self.wheel(navigator, delta_y),
        }
    }

    fn click<S: PresentationSurface>(navigator: &mut Navigator<S>, control: Control) -> bool {
        match control {
            Control::Begin => {
                let idle = navigator.phase() == crate::navigator::Phase::Idle;
                navigator.begin();
                idle
            }
            Control::Section(id) => navigator.go_to(id),
            Control::Replay => {
                let enabled = navigator.is_navigation_enabled();
                navigator.replay();
                enabled
            }
            Control::Restart => {
                navigator.reset();
                true
            }
            Control::ToggleAudio => {
                navigator.toggle_audio();
                true
            }
        }
    }

    fn wheel<S: PresentationSurface>(&mut self, navigator: &mut Navigator<S>, delta_y: f64) -> bool {
        if delta_y == 0.0 {
            return false;
        }
        // Make sure the navigator's notion of now is current
        navigator.tick();
        let now = navigator.now();
        if let Some(until) = self.cooldown_until {
            if now < until {
                debug!(now, until, "Wheel event inside cooldown");
                return false;
            }
            self.cooldown_until = None;
        }

        let moved = if delta_y > 0.0 {
            navigator.next()
        } else {
            navigator.previous()
        };
        if moved && self.wheel_cooldown_ms > 0 {
            self.cooldown_until = Some(now + self.wheel_cooldown_ms);
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_controls() {
        assert_eq!("begin".parse::<Control>().unwrap(), Control::Begin);
        assert_eq!("Replay".parse::<Control>().unwrap(), Control::Replay);
        assert_eq!(
            "final".parse::<Control>().unwrap(),
            Control::Section(SectionId::Finale)
        );
        assert_eq!(
            "gallery".parse::<Control>().unwrap(),
            Control::Section(SectionId::Gallery)
        );
        assert!(matches!(
            "balloons".parse::<Control>(),
            Err(Error::InvalidTransition(_))
        ));
    }
}
