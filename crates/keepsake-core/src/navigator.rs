//! Section navigator and its timed-effect scheduler
//!
//! The navigator owns the presentation: the current section, the phase of the
//! opening choreography, every live effect instance and the timer queue that
//! drives them. Input adapters only ever call the public operations below;
//! navigation errors are logged and swallowed here.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::mpsc::Sender;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audio::{Audio, SimulatedAudio};
use crate::config::{AppConfig, TimelineConfig};
use crate::effects::{
    Effect, EffectContext, EffectHandle, EffectKind, EffectParams, Origin, ParticleParams,
    Signal, Step, TypewriterParams, UnitId,
};
use crate::random::{RandomSource, SeededRandom};
use crate::section::{SectionId, SectionRegistry};
use crate::surface::{anchors, PresentationSurface};
use crate::timer::{Clock, Millis, MonotonicClock, TimerId, TimerQueue};
use crate::Error;

/// Stages of the opening choreography after the intro fade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Audio,
    Petals,
    Centerpiece,
    Typewriter,
    Navigation,
}

impl Stage {
    pub const ORDER: [Stage; 5] = [
        Stage::Audio,
        Stage::Petals,
        Stage::Centerpiece,
        Stage::Typewriter,
        Stage::Navigation,
    ];

    fn offset(&self, timeline: &TimelineConfig) -> Millis {
        match self {
            Stage::Audio => timeline.audio_ms,
            Stage::Petals => timeline.petals_ms,
            Stage::Centerpiece => timeline.centerpiece_ms,
            Stage::Typewriter => timeline.typewriter_ms,
            Stage::Navigation => timeline.navigation_ms,
        }
    }
}

/// Payload of every timer the navigator schedules
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TimerEvent {
    Stage(Stage),
    /// Entry delay of a spawned effect has elapsed
    StartEffect(EffectHandle),
    Effect {
        handle: EffectHandle,
        signal: Signal,
    },
    UnmountUnit {
        container: String,
        unit: UnitId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting for the presentation to begin
    Idle,
    /// Opening choreography running, navigation disabled
    Opening,
    Navigating,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Opening => "opening",
            Phase::Navigating => "navigating",
        };
        f.write_str(name)
    }
}

/// Notifications for observers such as the terminal UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavigatorEvent {
    Began,
    NavigationEnabled,
    SectionChanged {
        from: SectionId,
        to: SectionId,
    },
    EffectStarted {
        handle: EffectHandle,
        kind: EffectKind,
        origin: Origin,
    },
    EffectExpired {
        handle: EffectHandle,
    },
    EffectCancelled {
        handle: EffectHandle,
    },
    Reset,
    AudioChanged {
        enabled: bool,
    },
}

/// Snapshot of one live effect
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectInfo {
    pub handle: EffectHandle,
    pub kind: EffectKind,
    pub origin: Origin,
    /// False while the entry delay is still pending
    pub started: bool,
}

struct LiveEffect {
    kind: EffectKind,
    origin: Origin,
    effect: Box<dyn Effect>,
    /// Set while waiting for the entry delay
    start_timer: Option<TimerId>,
}

pub struct Navigator<S: PresentationSurface> {
    registry: SectionRegistry,
    surface: S,
    clock: Box<dyn Clock>,
    audio: Box<dyn Audio>,
    rng: Box<dyn RandomSource>,
    events: Option<Sender<NavigatorEvent>>,

    timeline: TimelineConfig,
    petals: ParticleParams,
    typewriter: TypewriterParams,

    current: SectionId,
    phase: Phase,
    timers: TimerQueue<TimerEvent>,
    live: HashMap<EffectHandle, LiveEffect>,
    next_handle: u64,
    next_unit: u64,
    reported_missing: HashSet<String>,
}

impl<S: PresentationSurface> Navigator<S> {
    /// Create a navigator showing the registry's first section in the idle state
    pub fn new(registry: SectionRegistry, surface: S, config: &AppConfig) -> Self {
        let current = registry.first();
        let mut navigator = Self {
            registry,
            surface,
            clock: Box::new(MonotonicClock::new()),
            audio: Box::new(SimulatedAudio::new()),
            rng: Box::new(SeededRandom::new(config.general.seed)),
            events: None,
            timeline: config.timeline.clone(),
            petals: ParticleParams::from_config(anchors::PETALS, &config.effects.petals),
            typewriter: TypewriterParams {
                anchor: anchors::TYPEWRITER.to_string(),
                messages: config.messages.clone(),
                char_delay_ms: config.effects.typewriter.char_delay_ms,
            },
            current,
            phase: Phase::Idle,
            timers: TimerQueue::new(),
            live: HashMap::new(),
            next_handle: 1,
            next_unit: 1,
            reported_missing: HashSet::new(),
        };
        navigator.restore_surface(None);
        navigator
    }

    /// Drive time from `clock`; the queue restarts at the clock's current time
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.timers.advance_to(clock.now_ms());
        self.clock = Box::new(clock);
        self
    }

    pub fn with_audio(mut self, audio: impl Audio + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    pub fn with_random(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_event_sender(mut self, sender: Sender<NavigatorEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn current(&self) -> SectionId {
        self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_navigation_enabled(&self) -> bool {
        self.phase == Phase::Navigating
    }

    /// Live effects ordered by handle
    pub fn live_effects(&self) -> Vec<EffectInfo> {
        let mut infos: Vec<EffectInfo> = self
            .live
            .iter()
            .map(|(&handle, live)| EffectInfo {
                handle,
                kind: live.kind,
                origin: live.origin,
                started: live.start_timer.is_none(),
            })
            .collect();
        infos.sort_by_key(|info| info.handle);
        infos
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Presentation time of the last dispatched timer or settled operation
    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio.is_enabled()
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<Millis> {
        self.timers.next_due()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Start the opening choreography
    ///
    /// Every stage is scheduled from the same reference time. Navigation only
    /// becomes enabled with the last stage.
    pub fn begin(&mut self) {
        self.settle();
        if self.phase != Phase::Idle {
            debug!(error = %Error::DoubleInit, phase = %self.phase, "Ignoring begin");
            return;
        }

        self.phase = Phase::Opening;
        info!(at = self.now(), "Presentation beginning");
        self.emit(NavigatorEvent::Began);

        if let Err(e) = self.surface.set_visible(anchors::INTRO, false) {
            self.report_missing(anchors::INTRO, &e);
        }
        for stage in Stage::ORDER {
            self.timers
                .after(stage.offset(&self.timeline), TimerEvent::Stage(stage));
        }
    }

    /// Switch to `target`; returns whether the current section changed
    pub fn go_to(&mut self, target: SectionId) -> bool {
        self.settle();
        if !self.is_navigation_enabled() {
            debug!(
                error = %Error::InvalidTransition("navigation disabled".into()),
                target = %target,
                phase = %self.phase,
                "Ignoring navigation"
            );
            return false;
        }
        if target == self.current {
            debug!(target = %target, "Already on section");
            return false;
        }
        let Some(section) = self.registry.get(target) else {
            debug!(
                error = %Error::InvalidTransition(format!("'{}' is not registered", target)),
                "Ignoring navigation"
            );
            return false;
        };
        let specs = section.effects.clone();

        let from = self.current;
        if let Err(e) = self.surface.hide_section(from) {
            warn!(section = %from, error = %e, "Failed to hide section");
        }
        if let Err(e) = self.surface.show_section(target) {
            warn!(section = %target, error = %e, "Failed to show section");
        }
        self.current = target;
        info!(from = %from, to = %target, at = self.now(), "Section changed");
        self.emit(NavigatorEvent::SectionChanged { from, to: target });

        let origin = Origin::Section(target);
        self.supersede(origin);
        for spec in specs {
            self.spawn(spec.params, spec.entry_delay_ms, origin);
        }
        true
    }

    pub fn next(&mut self) -> bool {
        match self.registry.next_after(self.current) {
            Some(target) => self.go_to(target),
            None => {
                debug!(section = %self.current, "Already on the last section");
                false
            }
        }
    }

    pub fn previous(&mut self) -> bool {
        match self.registry.previous_before(self.current) {
            Some(target) => self.go_to(target),
            None => {
                debug!(section = %self.current, "Already on the first section");
                false
            }
        }
    }

    pub fn first(&mut self) -> bool {
        self.go_to(self.registry.first())
    }

    pub fn last(&mut self) -> bool {
        self.go_to(self.registry.last())
    }

    /// Re-run the current section's entry effects
    ///
    /// On the landing section the petals, the centerpiece and the typewriter
    /// are restarted as well.
    pub fn replay(&mut self) {
        self.settle();
        if !self.is_navigation_enabled() {
            debug!(phase = %self.phase, "Ignoring replay before navigation is enabled");
            return;
        }

        let section = self.current;
        info!(section = %section, "Replaying section effects");
        let specs = self
            .registry
            .get(section)
            .map(|s| s.effects.clone())
            .unwrap_or_default();
        let origin = Origin::Section(section);
        self.supersede(origin);
        for spec in specs {
            self.spawn(spec.params, spec.entry_delay_ms, origin);
        }

        if section == SectionId::Landing {
            self.supersede(Origin::Opening);
            self.spawn(EffectParams::Particles(self.petals.clone()), 0, Origin::Opening);
            self.show_centerpiece();
            self.spawn(
                EffectParams::Typewriter(self.typewriter.clone()),
                self.timeline.replay_typewriter_ms,
                Origin::Opening,
            );
        }
    }

    /// Return to the idle landing state from anywhere
    pub fn reset(&mut self) {
        self.settle();

        let mut handles: Vec<EffectHandle> = self.live.keys().copied().collect();
        handles.sort();
        for handle in handles {
            self.cancel_effect(handle);
        }
        self.timers.clear();

        let previous = self.current;
        self.current = self.registry.first();
        self.phase = Phase::Idle;
        self.restore_surface(Some(previous));

        info!(section = %self.current, "Presentation reset");
        self.emit(NavigatorEvent::Reset);
    }

    /// Flip background music; failures leave the navigator untouched
    pub fn toggle_audio(&mut self) {
        let result = if self.audio.is_enabled() {
            self.audio.disable()
        } else {
            self.audio.enable()
        };
        match result {
            Ok(()) => {
                let enabled = self.audio.is_enabled();
                info!(enabled, "Audio toggled");
                self.emit(NavigatorEvent::AudioChanged { enabled });
            }
            Err(e) => warn!(error = %e, "Failed to toggle audio"),
        }
    }

    /// Fire every timer due at the clock's current time; returns how many fired
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now_ms();
        self.fire_due(now)
    }

    fn settle(&mut self) {
        let now = self.clock.now_ms();
        self.fire_due(now);
    }

    fn fire_due(&mut self, until: Millis) -> usize {
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(until) {
            fired += 1;
            match timer.payload {
                TimerEvent::Stage(stage) => self.run_stage(stage),
                TimerEvent::StartEffect(handle) => self.start_effect(handle),
                TimerEvent::Effect { handle, signal } => {
                    if !self.deliver(handle, signal) {
                        // Orphaned repeat of an effect that is gone
                        self.timers.cancel(timer.id);
                    }
                }
                TimerEvent::UnmountUnit { container, unit } => {
                    if let Err(e) = self.surface.unmount_unit(&container, unit) {
                        debug!(container = %container, unit = unit.0, error = %e, "Unit already gone");
                    }
                }
            }
        }
        self.timers.advance_to(until);
        fired
    }

    fn run_stage(&mut self, stage: Stage) {
        debug!(stage = ?stage, at = self.now(), "Opening stage");
        match stage {
            Stage::Audio => match self.audio.enable() {
                Ok(()) => self.emit(NavigatorEvent::AudioChanged {
                    enabled: self.audio.is_enabled(),
                }),
                Err(e) => warn!(error = %e, "Background music could not start"),
            },
            Stage::Petals => {
                self.spawn(EffectParams::Particles(self.petals.clone()), 0, Origin::Opening);
            }
            Stage::Centerpiece => self.show_centerpiece(),
            Stage::Typewriter => {
                self.spawn(EffectParams::Typewriter(self.typewriter.clone()), 0, Origin::Opening);
            }
            Stage::Navigation => {
                if let Err(e) = self.surface.set_visible(anchors::NAVIGATION, true) {
                    self.report_missing(anchors::NAVIGATION, &e);
                }
                self.phase = Phase::Navigating;
                info!(section = %self.current, "Navigation enabled");
                self.emit(NavigatorEvent::NavigationEnabled);
            }
        }
    }

    fn show_centerpiece(&mut self) {
        // Hide first so the reveal animation restarts
        let result = self
            .surface
            .set_visible(anchors::CENTERPIECE, false)
            .and_then(|_| self.surface.set_visible(anchors::CENTERPIECE, true));
        if let Err(e) = result {
            self.report_missing(anchors::CENTERPIECE, &e);
        }
    }

    /// Register an effect instance and start it after `delay`
    fn spawn(&mut self, params: EffectParams, delay: Millis, origin: Origin) -> EffectHandle {
        let handle = EffectHandle(self.next_handle);
        self.next_handle += 1;

        let start_timer = if delay > 0 {
            Some(self.timers.after(delay, TimerEvent::StartEffect(handle)))
        } else {
            None
        };
        self.live.insert(
            handle,
            LiveEffect {
                kind: params.kind(),
                origin,
                effect: params.instantiate(),
                start_timer,
            },
        );
        debug!(handle = %handle, kind = %params.kind(), target = params.target(), delay, "Effect spawned");

        if delay == 0 {
            self.start_effect(handle);
        }
        handle
    }

    fn start_effect(&mut self, handle: EffectHandle) {
        let Some(mut live) = self.live.remove(&handle) else {
            return;
        };
        live.start_timer = None;

        let result = {
            let mut ctx = EffectContext::new(
                handle,
                &mut self.surface,
                &mut *self.rng,
                &mut self.timers,
                &mut self.next_unit,
            );
            live.effect.start(&mut ctx)
        };

        let (kind, origin) = (live.kind, live.origin);
        match result {
            Ok(Step::Continue) => {
                self.live.insert(handle, live);
                self.emit(NavigatorEvent::EffectStarted { handle, kind, origin });
            }
            Ok(Step::Expired) => {
                self.emit(NavigatorEvent::EffectStarted { handle, kind, origin });
                self.emit(NavigatorEvent::EffectExpired { handle });
            }
            Err(e) => {
                if let Error::MountUnavailable(anchor) = &e {
                    let anchor = anchor.clone();
                    self.report_missing(&anchor, &e);
                } else {
                    warn!(handle = %handle, error = %e, "Effect failed to start");
                }
                self.emit(NavigatorEvent::EffectExpired { handle });
            }
        }
    }

    /// Forward a signal to a live effect; false when the handle is not live
    fn deliver(&mut self, handle: EffectHandle, signal: Signal) -> bool {
        let Some(mut live) = self.live.remove(&handle) else {
            debug!(handle = %handle, signal = ?signal, "Signal for a dead effect");
            return false;
        };

        let step = {
            let mut ctx = EffectContext::new(
                handle,
                &mut self.surface,
                &mut *self.rng,
                &mut self.timers,
                &mut self.next_unit,
            );
            live.effect.on_signal(&mut ctx, signal)
        };

        match step {
            Step::Continue => {
                self.live.insert(handle, live);
            }
            Step::Expired => {
                debug!(handle = %handle, kind = %live.kind, at = self.now(), "Effect expired");
                self.emit(NavigatorEvent::EffectExpired { handle });
            }
        }
        true
    }

    fn cancel_effect(&mut self, handle: EffectHandle) {
        let Some(mut live) = self.live.remove(&handle) else {
            return;
        };

        match live.start_timer.take() {
            Some(id) => {
                self.timers.cancel(id);
            }
            None => {
                let mut ctx = EffectContext::new(
                    handle,
                    &mut self.surface,
                    &mut *self.rng,
                    &mut self.timers,
                    &mut self.next_unit,
                );
                live.effect.cancel(&mut ctx);
            }
        }
        debug!(handle = %handle, kind = %live.kind, "Effect cancelled");
        self.emit(NavigatorEvent::EffectCancelled { handle });
    }

    /// Cancel the still-live effects spawned for `origin`
    fn supersede(&mut self, origin: Origin) {
        let mut handles: Vec<EffectHandle> = self
            .live
            .iter()
            .filter(|(_, live)| live.origin == origin)
            .map(|(&handle, _)| handle)
            .collect();
        handles.sort();
        for handle in handles {
            self.cancel_effect(handle);
        }
    }

    /// Put the surface into the idle state
    fn restore_surface(&mut self, previous: Option<SectionId>) {
        for container in self.mount_points() {
            if let Err(e) = self.surface.clear_container(&container) {
                self.report_missing(&container, &e);
            }
        }

        if let Some(previous) = previous {
            if previous != self.current {
                if let Err(e) = self.surface.hide_section(previous) {
                    warn!(section = %previous, error = %e, "Failed to hide section");
                }
            }
        }
        if let Err(e) = self.surface.show_section(self.current) {
            warn!(section = %self.current, error = %e, "Failed to show section");
        }

        for (anchor, visible) in [
            (anchors::INTRO, true),
            (anchors::CENTERPIECE, false),
            (anchors::NAVIGATION, false),
        ] {
            if let Err(e) = self.surface.set_visible(anchor, visible) {
                self.report_missing(anchor, &e);
            }
        }

        let typewriter = self.typewriter.anchor.clone();
        let cleared = self
            .surface
            .set_text(&typewriter, "")
            .and_then(|_| self.surface.set_cursor(&typewriter, false));
        if let Err(e) = cleared {
            self.report_missing(&typewriter, &e);
        }
    }

    /// Every particle container the presentation may mount units into
    fn mount_points(&self) -> Vec<String> {
        let mut containers = vec![self.petals.container.clone()];
        for section in self.registry.iter() {
            for spec in &section.effects {
                if let EffectParams::Particles(p) = &spec.params {
                    if !containers.contains(&p.container) {
                        containers.push(p.container.clone());
                    }
                }
            }
        }
        containers
    }

    fn report_missing(&mut self, anchor: &str, error: &Error) {
        if self.reported_missing.insert(anchor.to_string()) {
            warn!(anchor = %anchor, error = %error, "Presentation surface is missing an anchor");
        } else {
            debug!(anchor = %anchor, "Anchor still missing");
        }
    }

    fn emit(&self, event: NavigatorEvent) {
        if let Some(sender) = &self.events {
            if let Err(e) = sender.send(event) {
                warn!(event = ?e.0, "Navigator event receiver dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use crate::timer::ManualClock;
    use std::sync::mpsc;

    fn navigator() -> (Navigator<MemorySurface>, ManualClock) {
        let config = AppConfig::default();
        let clock = ManualClock::new();
        let registry = SectionRegistry::standard(&config.effects);
        let nav = Navigator::new(registry, MemorySurface::standard(), &config)
            .with_clock(clock.clone())
            .with_random(SeededRandom::from_seed(11));
        (nav, clock)
    }

    #[test]
    fn test_idle_state() {
        let (nav, _) = navigator();
        assert_eq!(nav.phase(), Phase::Idle);
        assert_eq!(nav.current(), SectionId::Landing);
        assert!(nav.surface().is_shown(SectionId::Landing));
        assert!(nav.surface().is_visible(anchors::INTRO));
        assert!(!nav.surface().is_visible(anchors::NAVIGATION));
        assert_eq!(nav.pending_timers(), 0);
    }

    #[test]
    fn test_navigation_disabled_before_last_stage() {
        let (mut nav, clock) = navigator();
        nav.begin();
        assert_eq!(nav.phase(), Phase::Opening);
        assert!(!nav.surface().is_visible(anchors::INTRO));

        clock.set(3_999);
        nav.tick();
        assert!(!nav.is_navigation_enabled());
        assert!(!nav.next());

        clock.set(4_000);
        nav.tick();
        assert!(nav.is_navigation_enabled());
        assert!(nav.surface().is_visible(anchors::NAVIGATION));
    }

    #[test]
    fn test_audio_toggle_and_stage() {
        let (mut nav, clock) = navigator();
        let (tx, rx) = mpsc::channel();
        nav = nav.with_event_sender(tx);

        nav.begin();
        clock.set(500);
        nav.tick();
        assert!(nav.audio_enabled());

        nav.toggle_audio();
        assert!(!nav.audio_enabled());

        let audio: Vec<_> = rx
            .try_iter()
            .filter_map(|e| match e {
                NavigatorEvent::AudioChanged { enabled } => Some(enabled),
                _ => None,
            })
            .collect();
        assert_eq!(audio, vec![true, false]);
    }

    #[test]
    fn test_dead_handle_signal_is_ignored() {
        let (mut nav, _) = navigator();
        let handle = EffectHandle(99);
        nav.timers.every(
            100,
            TimerEvent::Effect {
                handle,
                signal: Signal::Emit,
            },
        );
        assert_eq!(nav.fire_due(100), 1);
        // The orphaned repeat is dropped after its first delivery attempt
        assert_eq!(nav.pending_timers(), 0);
    }

    #[test]
    fn test_missing_anchor_expires_effect() {
        let config = AppConfig::default();
        let clock = ManualClock::new();
        let surface = MemorySurface::empty();
        let mut nav = Navigator::new(SectionRegistry::standard(&config.effects), surface, &config)
            .with_clock(clock.clone());

        nav.begin();
        clock.set(4_000);
        nav.tick();
        assert!(nav.is_navigation_enabled());
        assert_eq!(nav.live_count(), 0);
        assert!(nav.reported_missing.contains(anchors::PETALS));
        assert!(nav.reported_missing.contains(anchors::TYPEWRITER));

        assert!(nav.go_to(SectionId::Poem));
        assert_eq!(nav.live_count(), 0);
    }

    #[test]
    fn test_dropped_receiver_is_not_fatal() {
        let (nav, _) = navigator();
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut nav = nav.with_event_sender(tx);
        nav.begin();
        assert_eq!(nav.phase(), Phase::Opening);
    }
}
