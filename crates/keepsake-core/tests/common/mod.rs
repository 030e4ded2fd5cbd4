#![allow(dead_code)]

use keepsake_core::surface::{Recorded, SurfaceOp};
use keepsake_core::{
    AppConfig, Clock, ManualClock, MemorySurface, Millis, Navigator, SectionId, SectionRegistry,
    SeededRandom,
};

pub struct Harness {
    pub nav: Navigator<MemorySurface>,
    pub clock: ManualClock,
    pub config: AppConfig,
}

impl Harness {
    pub fn standard(seed: u64) -> Self {
        let config = AppConfig::default();
        let registry = SectionRegistry::standard(&config.effects);
        Self::with_registry(registry, config, seed)
    }

    pub fn with_order(order: &[SectionId], seed: u64) -> Self {
        let config = AppConfig::default();
        let registry = SectionRegistry::with_order(order, &config.effects).unwrap();
        Self::with_registry(registry, config, seed)
    }

    pub fn with_registry(registry: SectionRegistry, config: AppConfig, seed: u64) -> Self {
        let clock = ManualClock::new();
        let surface = MemorySurface::standard().with_clock(clock.clone());
        let nav = Navigator::new(registry, surface, &config)
            .with_clock(clock.clone())
            .with_random(SeededRandom::from_seed(seed));
        Self { nav, clock, config }
    }

    /// Step the clock through every due timer up to `until`, so that each
    /// surface operation is stamped with its exact due time
    pub fn run_until(&mut self, until: Millis) {
        while let Some(due) = self.nav.next_due() {
            if due > until {
                break;
            }
            self.clock.set(due.max(self.clock.now_ms()));
            self.nav.tick();
        }
        self.clock.set(until);
        self.nav.tick();
    }

    pub fn run_for(&mut self, delta: Millis) {
        let until = self.nav.now() + delta;
        self.run_until(until);
    }

    /// Begin and wait for the opening choreography to finish
    pub fn open(&mut self) {
        self.nav.begin();
        self.run_for(self.config.timeline.navigation_ms);
        assert!(self.nav.is_navigation_enabled());
    }

    pub fn log(&self) -> &[Recorded] {
        self.nav.surface().log()
    }

    pub fn mounts(&self, container: &str) -> Vec<Millis> {
        self.log()
            .iter()
            .filter_map(|r| match &r.op {
                SurfaceOp::Mount { container: c, .. } if c == container => Some(r.at),
                _ => None,
            })
            .collect()
    }

    pub fn reveals(&self, prefix: &str) -> Vec<(Millis, String)> {
        self.log()
            .iter()
            .filter_map(|r| match &r.op {
                SurfaceOp::SetVisible { anchor, visible: true } if anchor.starts_with(prefix) => {
                    Some((r.at, anchor.clone()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn first_time(&self, matches: impl Fn(&SurfaceOp) -> bool) -> Option<Millis> {
        self.log().iter().find(|r| matches(&r.op)).map(|r| r.at)
    }
}
