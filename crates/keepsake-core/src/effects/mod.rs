//! Effect generators: time-driven producers of ephemeral visual output
//!
//! Every generator implements [`Effect`]. The navigator starts it once its
//! entry delay has elapsed, forwards the [`Signal`]s it scheduled for itself,
//! and drops it when it reports [`Step::Expired`] or when it is cancelled.
//!
//! - `particles` - falling petals and confetti
//! - `typewriter` - character-by-character message reveal
//! - `stagger` - children revealed one after another

pub mod particles;
pub mod stagger;
pub mod typewriter;

use std::fmt;

use serde::Serialize;

use crate::navigator::TimerEvent;
use crate::random::RandomSource;
use crate::section::SectionId;
use crate::surface::PresentationSurface;
use crate::timer::{Millis, TimerId, TimerQueue};
use crate::Result;

pub use particles::{EffectUnit, ParticleEmitter, ParticleParams, UnitId};
pub use stagger::{StaggerParams, StaggeredReveal};
pub use typewriter::{TextRevealer, TypewriterParams, CURSOR_MARKER};

/// Handle of a running effect instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EffectHandle(pub(crate) u64);

impl fmt::Display for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fx#{}", self.0)
    }
}

/// Effect variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Particles,
    Typewriter,
    Stagger,
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EffectKind::Particles => "particles",
            EffectKind::Typewriter => "typewriter",
            EffectKind::Stagger => "stagger",
        };
        f.write_str(name)
    }
}

/// What an effect instance was spawned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The opening choreography on the landing section (petals, typewriter)
    Opening,
    /// Entry effects of a section
    Section(SectionId),
}

/// Parameters of one effect variant
#[derive(Debug, Clone, PartialEq)]
pub enum EffectParams {
    Particles(ParticleParams),
    Typewriter(TypewriterParams),
    Stagger(StaggerParams),
}

impl EffectParams {
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectParams::Particles(_) => EffectKind::Particles,
            EffectParams::Typewriter(_) => EffectKind::Typewriter,
            EffectParams::Stagger(_) => EffectKind::Stagger,
        }
    }

    /// Create a fresh, not yet started instance
    pub fn instantiate(&self) -> Box<dyn Effect> {
        match self {
            EffectParams::Particles(p) => Box::new(ParticleEmitter::new(p.clone())),
            EffectParams::Typewriter(p) => Box::new(TextRevealer::new(p.clone())),
            EffectParams::Stagger(p) => Box::new(StaggeredReveal::new(p.clone())),
        }
    }

    /// Mount point or anchor this effect draws into
    pub fn target(&self) -> &str {
        match self {
            EffectParams::Particles(p) => &p.container,
            EffectParams::Typewriter(p) => &p.anchor,
            EffectParams::Stagger(p) => &p.selector,
        }
    }
}

/// An effect to run when a section becomes active
#[derive(Debug, Clone, PartialEq)]
pub struct EffectSpec {
    pub params: EffectParams,
    /// Delay between section activation and the effect's start
    pub entry_delay_ms: Millis,
}

impl EffectSpec {
    pub fn new(params: EffectParams) -> Self {
        Self {
            params,
            entry_delay_ms: 0,
        }
    }

    pub fn delayed(params: EffectParams, entry_delay_ms: Millis) -> Self {
        Self {
            params,
            entry_delay_ms,
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.params.kind()
    }
}

/// Timer signals an effect schedules for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Emit the next particle
    Emit,
    /// Stop emitting (emitter ran for its full duration)
    Stop,
    /// Reveal the next character
    Type,
    /// Reveal child at index
    Reveal(usize),
    /// Last reveal animation has finished
    Finish,
}

/// Outcome of a start or a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Expired,
}

/// A running effect generator
pub trait Effect {
    fn kind(&self) -> EffectKind;

    /// Begin producing output. Fails with `MountUnavailable` when the target
    /// anchor does not exist; the instance is then treated as expired.
    fn start(&mut self, ctx: &mut EffectContext<'_>) -> Result<Step>;

    /// Handle a signal previously scheduled through the context
    fn on_signal(&mut self, ctx: &mut EffectContext<'_>, signal: Signal) -> Step;

    /// Stop early; pending signals must be cancelled here
    fn cancel(&mut self, ctx: &mut EffectContext<'_>);
}

/// Everything an effect may touch while it runs
pub struct EffectContext<'a> {
    handle: EffectHandle,
    pub surface: &'a mut dyn PresentationSurface,
    pub rng: &'a mut dyn RandomSource,
    timers: &'a mut TimerQueue<TimerEvent>,
    next_unit: &'a mut u64,
}

impl<'a> EffectContext<'a> {
    pub(crate) fn new(
        handle: EffectHandle,
        surface: &'a mut dyn PresentationSurface,
        rng: &'a mut dyn RandomSource,
        timers: &'a mut TimerQueue<TimerEvent>,
        next_unit: &'a mut u64,
    ) -> Self {
        Self {
            handle,
            surface,
            rng,
            timers,
            next_unit,
        }
    }

    pub fn handle(&self) -> EffectHandle {
        self.handle
    }

    /// Current presentation time
    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    /// Deliver `signal` to this effect after `delay`
    pub fn after(&mut self, delay: Millis, signal: Signal) -> TimerId {
        self.timers.after(
            delay,
            TimerEvent::Effect {
                handle: self.handle,
                signal,
            },
        )
    }

    /// Deliver `signal` to this effect every `interval`
    pub fn every(&mut self, interval: Millis, signal: Signal) -> TimerId {
        self.timers.every(
            interval,
            TimerEvent::Effect {
                handle: self.handle,
                signal,
            },
        )
    }

    pub fn cancel_timer(&mut self, id: TimerId) {
        self.timers.cancel(id);
    }

    /// Mount a unit and schedule its removal after its lifetime
    ///
    /// The removal is independent of the emitting effect: cancelling the
    /// emitter leaves already mounted units to expire on their own.
    pub fn mount_unit(&mut self, container: &str, mut unit: EffectUnit) -> Result<UnitId> {
        let id = UnitId(*self.next_unit);
        *self.next_unit += 1;
        unit.id = id;
        unit.mounted_at = self.now();
        let lifetime = unit.lifetime_ms;

        self.surface.mount_unit(container, unit)?;
        self.timers.after(
            lifetime,
            TimerEvent::UnmountUnit {
                container: container.to_string(),
                unit: id,
            },
        );
        Ok(id)
    }
}
