use std::sync::mpsc;

use anyhow::Result;
use serde::Serialize;

use keepsake_core::surface::{Recorded, SurfaceOp};
use keepsake_core::{
    AppConfig, Clock, ManualClock, MemorySurface, Millis, Navigator, NavigatorEvent, SectionRegistry,
    SeededRandom,
};

pub const DEFAULT_UNTIL_MS: Millis = 30_000;

/// Time spent on each section before moving on
const DWELL_MS: Millis = 3_000;

/// Result of a headless walk
#[derive(Debug, Serialize)]
pub struct Walk {
    pub seed: Option<u64>,
    pub until_ms: Millis,
    pub ops: Vec<Recorded>,
    pub events: Vec<NavigatorEvent>,
}

/// Begin at time zero, wait for navigation, then step forward through every
/// section, dwelling `DWELL_MS` on each, until `until_ms`
pub fn walk(config: &AppConfig, until_ms: Millis, seed: Option<u64>) -> Walk {
    let seed = seed.or(config.general.seed);
    let clock = ManualClock::new();
    let (tx, rx) = mpsc::channel();

    let mut navigator = Navigator::new(
        SectionRegistry::standard(&config.effects),
        MemorySurface::standard().with_clock(clock.clone()),
        config,
    )
    .with_clock(clock.clone())
    .with_random(SeededRandom::new(seed))
    .with_event_sender(tx);

    // Only what happens from begin on
    navigator.surface_mut().take_log();
    navigator.begin();

    let mut next_move = Some(config.timeline.navigation_ms + DWELL_MS);
    loop {
        let target = match (navigator.next_due(), next_move) {
            (Some(due), Some(mv)) => due.min(mv),
            (Some(due), None) => due,
            (None, Some(mv)) => mv,
            (None, None) => break,
        };
        if target > until_ms {
            break;
        }

        clock.set(target.max(clock.now_ms()));
        navigator.tick();

        if next_move == Some(target) {
            next_move = if navigator.next() {
                Some(target + DWELL_MS)
            } else {
                None
            };
        }
    }

    Walk {
        seed,
        until_ms,
        ops: navigator.surface_mut().take_log(),
        events: rx.try_iter().collect(),
    }
}

pub fn run(config: &AppConfig, until_ms: Millis, json: bool, seed: Option<u64>) -> Result<()> {
    let walk = walk(config, until_ms, seed);

    if json {
        println!("{}", serde_json::to_string_pretty(&walk)?);
        return Ok(());
    }

    for record in &walk.ops {
        println!("{:>7} ms  {}", record.at, describe(&record.op));
    }
    println!(
        "\n{} surface calls, {} events, until {} ms",
        walk.ops.len(),
        walk.events.len(),
        walk.until_ms
    );
    Ok(())
}

fn describe(op: &SurfaceOp) -> String {
    match op {
        SurfaceOp::ShowSection { section } => format!("show {}", section),
        SurfaceOp::HideSection { section } => format!("hide {}", section),
        SurfaceOp::Mount { container, unit } => format!("mount {} #{}", container, unit.0),
        SurfaceOp::Unmount { container, unit } => format!("unmount {} #{}", container, unit.0),
        SurfaceOp::Clear { container } => format!("clear {}", container),
        SurfaceOp::SetText { anchor, text } => format!("text {} {:?}", anchor, text),
        SurfaceOp::SetCursor { anchor, visible } => {
            format!("cursor {} {}", anchor, if *visible { "on" } else { "off" })
        }
        SurfaceOp::SetVisible { anchor, visible } => {
            format!("{} {}", if *visible { "reveal" } else { "conceal" }, anchor)
        }
    }
}
