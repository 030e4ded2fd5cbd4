//! Staggered reveal: children become visible one after another

use tracing::debug;

use super::{Effect, EffectContext, EffectKind, Signal, Step};
use crate::config::StaggerConfig;
use crate::timer::{Millis, TimerId};
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct StaggerParams {
    /// Selector naming the ordered children on the surface
    pub selector: String,
    pub stagger_ms: Millis,
    /// Length of one child's reveal animation
    pub animation_ms: Millis,
}

impl StaggerParams {
    pub fn from_config(selector: impl Into<String>, config: StaggerConfig) -> Self {
        Self {
            selector: selector.into(),
            stagger_ms: config.stagger_ms,
            animation_ms: config.animation_ms,
        }
    }

    /// Offset of child `index` from the start of the reveal
    pub fn offset(&self, index: usize) -> Millis {
        index as Millis * self.stagger_ms
    }
}

/// Reveals child `i` at `i * stagger_ms` and expires once the last child's
/// animation has run. Cancelling drops pending reveals only.
pub struct StaggeredReveal {
    params: StaggerParams,
    children: Vec<String>,
    timers: Vec<TimerId>,
    revealed: usize,
}

impl StaggeredReveal {
    pub fn new(params: StaggerParams) -> Self {
        Self {
            params,
            children: Vec::new(),
            timers: Vec::new(),
            revealed: 0,
        }
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }
}

impl Effect for StaggeredReveal {
    fn kind(&self) -> EffectKind {
        EffectKind::Stagger
    }

    fn start(&mut self, ctx: &mut EffectContext<'_>) -> Result<Step> {
        let children = ctx.surface.children(&self.params.selector)?;
        if children.is_empty() {
            return Ok(Step::Expired);
        }

        // Hide first so that a replay animates again
        for child in &children {
            ctx.surface.set_visible(child, false)?;
        }

        self.revealed = 0;
        self.timers = (0..children.len())
            .map(|i| ctx.after(self.params.offset(i), Signal::Reveal(i)))
            .collect();
        let last = self.params.offset(children.len() - 1);
        self.timers
            .push(ctx.after(last + self.params.animation_ms, Signal::Finish));
        self.children = children;

        Ok(Step::Continue)
    }

    fn on_signal(&mut self, ctx: &mut EffectContext<'_>, signal: Signal) -> Step {
        match signal {
            Signal::Reveal(index) => {
                if let Some(child) = self.children.get(index) {
                    if let Err(e) = ctx.surface.set_visible(child, true) {
                        debug!(child = %child, error = %e, "Could not reveal child");
                    }
                    self.revealed += 1;
                }
                Step::Continue
            }
            Signal::Finish => {
                self.timers.clear();
                Step::Expired
            }
            _ => Step::Continue,
        }
    }

    fn cancel(&mut self, ctx: &mut EffectContext<'_>) {
        for id in self.timers.drain(..) {
            ctx.cancel_timer(id);
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

        fn run_until(&mut self, effect: &mut StaggeredReveal, until: Millis) -> Step {
            let mut step = Step::Continue;
            while let Some(fired) = self.timers.pop_due(until) {
                if let TimerEvent::Effect { signal, .. } = fired.payload {
                    step = effect.on_signal(&mut self.ctx(), signal);
                }
            }
            step
        }

        fn stanzas(&self) -> Vec<bool> {
            (0..4)
                .map(|i| self.surface.is_visible(&anchors::child(anchors::POEM_STANZAS, i)))
                .collect()
        }
    }

    fn poem() -> StaggeredReveal {
        StaggeredReveal::new(StaggerParams::from_config(
            anchors::POEM_STANZAS,
            StaggerConfig::new(500, 1_000),
        ))
    }

    #[test]
    fn test_reveals_children_in_order() {
        let mut rig = Rig::new();
        let mut effect = poem();

        assert_eq!(effect.start(&mut rig.ctx()).unwrap(), Step::Continue);
        assert_eq!(rig.stanzas(), vec![false; 4]);

        rig.run_until(&mut effect, 0);
        assert_eq!(rig.stanzas(), vec![true, false, false, false]);
        assert_eq!(effect.revealed(), 1);

        assert_eq!(rig.run_until(&mut effect, 1_500), Step::Continue);
        assert_eq!(effect.revealed(), 4);

        // Last stanza at 1500 plus its 1000 ms animation
        assert_eq!(rig.run_until(&mut effect, 2_500), Step::Expired);
        assert!(rig.timers.is_empty());
    }

    #[test]
    fn test_cancel_keeps_revealed_children() {
        let mut rig = Rig::new();
        let mut effect = poem();

        effect.start(&mut rig.ctx()).unwrap();
        rig.run_until(&mut effect, 600);
        assert_eq!(effect.revealed(), 2);

        effect.cancel(&mut rig.ctx());
        assert!(rig.timers.is_empty());

        rig.run_until(&mut effect, 5_000);
        assert_eq!(rig.stanzas(), vec![true, true, false, false]);
        assert_eq!(effect.revealed(), 2);
    }

    #[test]
    fn test_no_children_expires_at_once() {
        let mut rig = Rig {
            surface: MemorySurface::empty().with_children(anchors::POEM_STANZAS, 0),
            ..Rig::new()
        };
        let mut effect = poem();

        assert_eq!(effect.start(&mut rig.ctx()).unwrap(), Step::Expired);
        assert_eq!(effect.revealed(), 0);
    }
}
