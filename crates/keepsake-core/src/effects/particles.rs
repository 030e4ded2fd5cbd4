//! Particle emitter: falling petals and confetti

use serde::Serialize;
use tracing::debug;

use super::{Effect, EffectContext, EffectKind, Signal, Step};
use crate::config::ParticleConfig;
use crate::random::RandomSource;
use crate::timer::{Millis, TimerId};
use crate::{Error, Result};

/// Identifier of a mounted unit, unique per navigator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitId(pub u64);

/// One mounted particle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectUnit {
    pub id: UnitId,
    /// Horizontal position, percent of the container width
    pub x_percent: f64,
    pub size: f64,
    /// Hex colour from the emitter palette
    pub color: String,
    /// Length of the fall animation
    pub fall_ms: Millis,
    /// Delay before the fall animation starts
    pub delay_ms: Millis,
    pub mounted_at: Millis,
    /// Time until the unit is unmounted
    pub lifetime_ms: Millis,
}

impl EffectUnit {
    /// Fall progress in `[0, 1]` at `now`, honouring the start delay
    pub fn fall_progress(&self, now: Millis) -> f64 {
        let started = self.mounted_at + self.delay_ms;
        if now <= started {
            return 0.0;
        }
        if self.fall_ms == 0 {
            return 1.0;
        }
        ((now - started) as f64 / self.fall_ms as f64).min(1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleParams {
    pub container: String,
    pub interval_ms: Millis,
    pub duration_ms: Millis,
    pub lifetime_ms: Millis,
    pub size: (f64, f64),
    pub fall_ms: (Millis, Millis),
    pub delay_max_ms: Millis,
    pub palette: Vec<String>,
}

impl ParticleParams {
    pub fn from_config(container: impl Into<String>, config: &ParticleConfig) -> Self {
        Self {
            container: container.into(),
            interval_ms: config.interval_ms,
            duration_ms: config.duration_ms,
            lifetime_ms: config.lifetime_ms,
            size: (config.size_min, config.size_max),
            fall_ms: (config.fall_min_ms, config.fall_max_ms),
            delay_max_ms: config.delay_max_ms,
            palette: config.colors.clone(),
        }
    }

    /// Roll a new unit; id and mount time are filled in when mounting
    pub fn roll(&self, rng: &mut dyn RandomSource) -> EffectUnit {
        let x_percent = rng.range(0.0, 100.0);
        let size = rng.range(self.size.0, self.size.1);
        let fall_ms = rng.range(self.fall_ms.0 as f64, self.fall_ms.1 as f64) as Millis;
        let delay_ms = rng.range(0.0, self.delay_max_ms as f64) as Millis;
        let color = if self.palette.is_empty() {
            String::new()
        } else {
            self.palette[rng.index(self.palette.len())].clone()
        };

        EffectUnit {
            id: UnitId(0),
            x_percent,
            size,
            color,
            fall_ms,
            delay_ms,
            mounted_at: 0,
            lifetime_ms: self.lifetime_ms,
        }
    }
}

/// Emits one unit per interval until its duration has elapsed
///
/// The stop timer is armed before the emission timer so that it wins a tie:
/// nothing is emitted at exactly `duration_ms`.
pub struct ParticleEmitter {
    params: ParticleParams,
    emit_timer: Option<TimerId>,
    stop_timer: Option<TimerId>,
    emitted: usize,
}

impl ParticleEmitter {
    pub fn new(params: ParticleParams) -> Self {
        Self {
            params,
            emit_timer: None,
            stop_timer: None,
            emitted: 0,
        }
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn halt(&mut self, ctx: &mut EffectContext<'_>) {
        if let Some(id) = self.emit_timer.take() {
            ctx.cancel_timer(id);
        }
        if let Some(id) = self.stop_timer.take() {
            ctx.cancel_timer(id);
        }
    }
}

impl Effect for ParticleEmitter {
    fn kind(&self) -> EffectKind {
        EffectKind::Particles
    }

    fn start(&mut self, ctx: &mut EffectContext<'_>) -> Result<Step> {
        if !ctx.surface.contains(&self.params.container) {
            return Err(Error::MountUnavailable(self.params.container.clone()));
        }
        if self.params.duration_ms == 0 {
            return Ok(Step::Expired);
        }

        self.stop_timer = Some(ctx.after(self.params.duration_ms, Signal::Stop));
        self.emit_timer = Some(ctx.every(self.params.interval_ms, Signal::Emit));
        Ok(Step::Continue)
    }

    fn on_signal(&mut self, ctx: &mut EffectContext<'_>, signal: Signal) -> Step {
        match signal {
            Signal::Emit => {
                let unit = self.params.roll(&mut *ctx.rng);
                match ctx.mount_unit(&self.params.container, unit) {
                    Ok(_) => {
                        self.emitted += 1;
                        Step::Continue
                    }
                    Err(e) => {
                        debug!(handle = %ctx.handle(), error = %e, "Particle container vanished, stopping emitter");
                        self.halt(ctx);
                        Step::Expired
                    }
                }
            }
            Signal::Stop => {
                self.stop_timer = None;
                self.halt(ctx);
                debug!(
                    handle = %ctx.handle(),
                    container = %self.params.container,
                    emitted = self.emitted,
                    "Particle emitter finished"
                );
                Step::Expired
            }
            _ => Step::Continue,
        }
    }

    fn cancel(&mut self, ctx: &mut EffectContext<'_>) {
        self.halt(ctx);
    }
}
