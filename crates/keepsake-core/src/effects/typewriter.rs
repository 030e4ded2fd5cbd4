//! Text revealer: types one randomly chosen message, one character per tick

use tracing::{debug, warn};

use super::{Effect, EffectContext, EffectKind, Signal, Step};
use crate::timer::{Millis, TimerId};
use crate::{Error, Result};

/// Marker shown after the last character, rendered blinking
pub const CURSOR_MARKER: char = '|';

#[derive(Debug, Clone, PartialEq)]
pub struct TypewriterParams {
    pub anchor: String,
    pub messages: Vec<String>,
    pub char_delay_ms: Millis,
}

pub struct TextRevealer {
    params: TypewriterParams,
    message: Vec<char>,
    cursor: usize,
    timer: Option<TimerId>,
}

impl TextRevealer {
    pub fn new(params: TypewriterParams) -> Self {
        Self {
            params,
            message: Vec::new(),
            cursor: 0,
            timer: None,
        }
    }

    /// Message being typed, empty until started
    pub fn message(&self) -> String {
        self.message.iter().collect()
    }

    /// Characters revealed so far
    pub fn revealed(&self) -> usize {
        self.cursor
    }
}

impl Effect for TextRevealer {
    fn kind(&self) -> EffectKind {
        EffectKind::Typewriter
    }

    fn start(&mut self, ctx: &mut EffectContext<'_>) -> Result<Step> {
        if !ctx.surface.contains(&self.params.anchor) {
            return Err(Error::MountUnavailable(self.params.anchor.clone()));
        }
        if self.params.messages.is_empty() {
            warn!(anchor = %self.params.anchor, "No typewriter messages configured");
            return Ok(Step::Expired);
        }

        let pick = ctx.rng.index(self.params.messages.len());
        self.message = self.params.messages[pick].chars().collect();
        self.cursor = 0;

        ctx.surface.set_text(&self.params.anchor, "")?;
        ctx.surface.set_cursor(&self.params.anchor, false)?;
        self.timer = Some(ctx.every(self.params.char_delay_ms, Signal::Type));
        Ok(Step::Continue)
    }

    fn on_signal(&mut self, ctx: &mut EffectContext<'_>, signal: Signal) -> Step {
        if signal != Signal::Type {
            return Step::Continue;
        }

        if self.cursor < self.message.len() {
            self.cursor += 1;
            let typed: String = self.message[..self.cursor].iter().collect();
            if let Err(e) = ctx.surface.set_text(&self.params.anchor, &typed) {
                debug!(handle = %ctx.handle(), error = %e, "Typewriter anchor vanished");
                self.cancel(ctx);
                return Step::Expired;
            }
            return Step::Continue;
        }

        if let Some(id) = self.timer.take() {
            ctx.cancel_timer(id);
        }
        // The text is already complete
        if let Err(e) = ctx.surface.set_cursor(&self.params.anchor, true) {
            debug!(handle = %ctx.handle(), error = %e, "Could not show typewriter cursor");
        }
        Step::Expired
    }

    fn cancel(&mut self, ctx: &mut EffectContext<'_>) {
        if let Some(id) = self.timer.take() {
            ctx.cancel_timer(id);
        }
        if let Err(e) = ctx.surface.set_text(&self.params.anchor, "") {
            debug!(handle = %ctx.handle(), error = %e, "Could not clear typewriter text");
        }
        if let Err(e) = ctx.surface.set_cursor(&self.params.anchor, false) {
            debug!(handle = %ctx.handle(), error = %e, "Could not hide typewriter cursor");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectHandle;
    use crate::navigator::TimerEvent;
    use crate::random::SeededRandom;
    use crate::surface::{anchors, MemorySurface};
    use crate::timer::TimerQueue;

    struct Rig {
        surface: MemorySurface,
        rng: SeededRandom,
        timers: TimerQueue<TimerEvent>,
        next_unit: u64,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                surface: MemorySurface::standard(),
                rng: SeededRandom::from_seed(5),
                timers: TimerQueue::new(),
                next_unit: 0,
            }
        }

        fn ctx(&mut self) -> EffectContext<'_> {
            EffectContext::new(
                EffectHandle(1),
                &mut self.surface,
                &mut self.rng,
                &mut self.timers,
                &mut self.next_unit,
            )
        }

        /// Deliver every signal due by `until`; returns the last step taken
        fn run_until(&mut self, effect: &mut TextRevealer, until: Millis) -> Step {
            let mut step = Step::Continue;
            while let Some(fired) = self.timers.pop_due(until) {
                if let TimerEvent::Effect { signal, .. } = fired.payload {
                    step = effect.on_signal(&mut self.ctx(), signal);
                    if step == Step::Expired {
                        break;
                    }
                }
            }
            step
        }
    }

    fn params(messages: &[&str]) -> TypewriterParams {
        TypewriterParams {
            anchor: anchors::TYPEWRITER.to_string(),
            messages: messages.iter().map(|m| m.to_string()).collect(),
            char_delay_ms: 100,
        }
    }

    #[test]
    fn test_types_one_char_per_tick() {
        let mut rig = Rig::new();
        let mut effect = TextRevealer::new(params(&["Hey"]));

        assert_eq!(effect.start(&mut rig.ctx()).unwrap(), Step::Continue);
        assert_eq!(effect.message(), "Hey");
        assert_eq!(effect.revealed(), 0);

        assert_eq!(rig.run_until(&mut effect, 200), Step::Continue);
        assert_eq!(effect.revealed(), 2);
        assert_eq!(rig.surface.text(anchors::TYPEWRITER), "He");

        assert_eq!(rig.run_until(&mut effect, 400), Step::Expired);
        assert_eq!(effect.revealed(), 3);
        assert_eq!(rig.surface.text(anchors::TYPEWRITER), "Hey");
        assert_eq!(rig.surface.anchor(anchors::TYPEWRITER).map(|a| a.cursor), Some(true));
        assert!(rig.timers.is_empty());
    }

    #[test]
    fn test_empty_messages_expire_without_typing() {
        let mut rig = Rig::new();
        let mut effect = TextRevealer::new(params(&[]));

        assert_eq!(effect.start(&mut rig.ctx()).unwrap(), Step::Expired);
        assert_eq!(effect.message(), "");
        assert_eq!(effect.revealed(), 0);
        assert_eq!(rig.surface.text(anchors::TYPEWRITER), "");
        assert!(rig.timers.is_empty());
    }

    #[test]
    fn test_cancel_clears_text_and_timer() {
        let mut rig = Rig::new();
        let mut effect = TextRevealer::new(params(&["Happy"]));

        effect.start(&mut rig.ctx()).unwrap();
        rig.run_until(&mut effect, 300);
        assert_eq!(rig.surface.text(anchors::TYPEWRITER), "Hap");

        effect.cancel(&mut rig.ctx());
        assert_eq!(rig.surface.text(anchors::TYPEWRITER), "");
        assert!(rig.timers.is_empty());
    }
}
