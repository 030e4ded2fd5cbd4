mod common;

use std::sync::mpsc;

use common::Harness;
use keepsake_core::surface::SurfaceOp;
use keepsake_core::{anchors, EffectKind, NavigatorEvent, Origin, Phase, SectionId};

fn live_for(h: &Harness, origin: Origin) -> Vec<(EffectKind, bool)> {
    h.nav
        .live_effects()
        .into_iter()
        .filter(|info| info.origin == origin)
        .map(|info| (info.kind, info.started))
        .collect()
}

#[test]
fn go_to_sequence_ends_on_last_valid_target() {
    let mut h = Harness::standard(1);
    h.open();

    assert!(h.nav.go_to(SectionId::Poem));
    assert!(!h.nav.go_to(SectionId::Poem));
    assert!(h.nav.go_to(SectionId::About));
    h.run_for(50);
    assert!(h.nav.go_to(SectionId::Gallery));
    assert!(h.nav.go_to(SectionId::Landing));
    assert!(h.nav.go_to(SectionId::Finale));
    assert!(!h.nav.go_to(SectionId::Finale));

    assert_eq!(h.nav.current(), SectionId::Finale);
    assert_eq!(h.nav.surface().shown(), vec![SectionId::Finale]);
}

#[test]
fn go_to_unregistered_section_is_ignored() {
    let mut h = Harness::with_order(&[SectionId::Landing, SectionId::Poem], 1);
    h.open();

    assert!(!h.nav.go_to(SectionId::Gallery));
    assert_eq!(h.nav.current(), SectionId::Landing);
}

#[test]
fn navigation_is_ignored_until_enabled() {
    let mut h = Harness::standard(1);
    assert!(!h.nav.go_to(SectionId::Poem));

    h.nav.begin();
    h.run_until(3_000);
    assert!(!h.nav.next());
    assert!(!h.nav.last());
    assert_eq!(h.nav.current(), SectionId::Landing);
}

#[test]
fn reset_is_idempotent() {
    let mut h = Harness::standard(5);
    h.open();
    h.nav.last();
    h.run_for(2_500);
    assert!(h.nav.live_count() > 0);
    assert!(!h.nav.surface().units(anchors::CONFETTI).is_empty());

    for _ in 0..2 {
        h.nav.reset();
        assert_eq!(h.nav.phase(), Phase::Idle);
        assert_eq!(h.nav.current(), SectionId::Landing);
        assert_eq!(h.nav.live_count(), 0);
        assert_eq!(h.nav.pending_timers(), 0);
        assert!(h.nav.surface().units(anchors::CONFETTI).is_empty());
        assert!(h.nav.surface().units(anchors::PETALS).is_empty());
        assert!(h.nav.surface().is_visible(anchors::INTRO));
        assert!(!h.nav.surface().is_visible(anchors::NAVIGATION));
        assert!(!h.nav.surface().is_visible(anchors::CENTERPIECE));
        assert_eq!(h.nav.surface().text(anchors::TYPEWRITER), "");
        assert_eq!(h.nav.surface().shown(), vec![SectionId::Landing]);
    }
}

#[test]
fn reset_during_opening_drops_pending_stages() {
    let mut h = Harness::standard(5);
    h.nav.begin();
    h.run_until(2_000);
    h.nav.reset();

    h.run_until(10_000);
    assert_eq!(h.nav.phase(), Phase::Idle);
    assert!(!h.nav.surface().is_visible(anchors::NAVIGATION));
    assert_eq!(h.nav.surface().text(anchors::TYPEWRITER), "");

    // A fresh begin works after a reset
    h.nav.begin();
    h.run_for(4_000);
    assert!(h.nav.is_navigation_enabled());
}

#[test]
fn begin_twice_is_a_no_op() {
    let mut h = Harness::standard(1);
    let (tx, rx) = mpsc::channel();
    h.nav = h.nav.with_event_sender(tx);

    h.nav.begin();
    let pending = h.nav.pending_timers();
    h.run_until(200);
    h.nav.begin();
    assert_eq!(h.nav.pending_timers(), pending);

    h.run_until(4_000);
    h.nav.begin();
    assert!(h.nav.is_navigation_enabled());
    assert_eq!(h.nav.current(), SectionId::Landing);

    let began = rx
        .try_iter()
        .filter(|e| *e == NavigatorEvent::Began)
        .count();
    assert_eq!(began, 1);
}

#[test]
fn ends_of_the_registry_are_no_ops() {
    let mut h = Harness::standard(1);
    h.open();

    assert!(!h.nav.previous());
    assert_eq!(h.nav.current(), SectionId::Landing);

    assert!(h.nav.last());
    assert!(!h.nav.next());
    assert_eq!(h.nav.current(), SectionId::Finale);

    assert!(h.nav.first());
    assert_eq!(h.nav.current(), SectionId::Landing);
}

#[test]
fn re_entering_a_section_supersedes_its_effects() {
    let mut h = Harness::standard(1);
    let (tx, rx) = mpsc::channel();
    h.nav = h.nav.with_event_sender(tx);
    h.open();
    let _ = rx.try_iter().count();

    h.nav.go_to(SectionId::Poem);
    h.nav.go_to(SectionId::About);
    h.nav.go_to(SectionId::Poem);

    let poem: Vec<_> = h
        .nav
        .live_effects()
        .into_iter()
        .filter(|info| info.origin == Origin::Section(SectionId::Poem))
        .collect();
    assert_eq!(poem.len(), 1);
    assert_eq!(live_for(&h, Origin::Section(SectionId::About)).len(), 1);

    let started: Vec<_> = rx
        .try_iter()
        .filter_map(|e| match e {
            NavigatorEvent::EffectStarted { handle, origin, .. }
                if origin == Origin::Section(SectionId::Poem) =>
            {
                Some(handle)
            }
            _ => None,
        })
        .collect();
    assert_eq!(started.len(), 2);
    assert_eq!(poem[0].handle, started[1]);
}

#[test]
fn poem_and_finale_choreography() {
    let mut h = Harness::with_order(&[SectionId::Landing, SectionId::Poem, SectionId::Finale], 9);
    h.open();
    assert_eq!(h.nav.now(), 4_000);
    assert_eq!(h.nav.current(), SectionId::Landing);

    assert!(h.nav.next());
    assert_eq!(h.nav.current(), SectionId::Poem);
    h.run_until(6_000);
    let stanzas = h.reveals("poem-stanza/");
    assert_eq!(
        stanzas,
        vec![
            (4_000, "poem-stanza/0".to_string()),
            (4_500, "poem-stanza/1".to_string()),
            (5_000, "poem-stanza/2".to_string()),
            (5_500, "poem-stanza/3".to_string()),
        ]
    );

    assert!(h.nav.next());
    assert_eq!(h.nav.current(), SectionId::Finale);
    let finale = Origin::Section(SectionId::Finale);
    assert_eq!(live_for(&h, finale), vec![(EffectKind::Particles, false)]);

    h.run_until(6_999);
    assert!(h.mounts(anchors::CONFETTI).is_empty());
    h.run_until(7_000);
    assert_eq!(live_for(&h, finale), vec![(EffectKind::Particles, true)]);

    h.run_until(11_999);
    assert_eq!(live_for(&h, finale).len(), 1);
    h.run_until(12_000);
    assert!(live_for(&h, finale).is_empty());

    let mounts = h.mounts(anchors::CONFETTI);
    assert_eq!(mounts.len(), 49);
    assert_eq!(mounts.first(), Some(&7_100));
    assert_eq!(mounts.last(), Some(&11_900));
    assert!(!h.nav.surface().units(anchors::CONFETTI).is_empty());

    h.nav.reset();
    assert_eq!(h.nav.current(), SectionId::Landing);
    assert!(!h.nav.is_navigation_enabled());
    assert!(h.nav.surface().units(anchors::CONFETTI).is_empty());
}

#[test]
fn confetti_units_expire_after_their_lifetime() {
    let mut h = Harness::standard(2);
    h.open();
    h.nav.last();
    h.run_for(1_100);
    assert_eq!(h.nav.surface().units(anchors::CONFETTI).len(), 1);

    // Leaving the section does not cut the fall short
    h.nav.first();
    h.run_for(4_999);
    assert!(!h.nav.surface().units(anchors::CONFETTI).is_empty());
    h.run_for(20_000);
    assert!(h.nav.surface().units(anchors::CONFETTI).is_empty());
}

#[test]
fn begin_stages_fire_in_order_and_not_early() {
    let mut h = Harness::standard(3);
    let (tx, rx) = mpsc::channel();
    h.nav = h.nav.with_event_sender(tx);

    h.nav.begin();
    assert!(!h.nav.surface().is_visible(anchors::INTRO));

    h.run_until(499);
    assert!(!h.nav.audio_enabled());
    h.run_until(500);
    assert!(h.nav.audio_enabled());
    h.run_until(8_000);

    let intro = h.first_time(|op| {
        matches!(op, SurfaceOp::SetVisible { anchor, visible: false } if anchor == anchors::INTRO)
    });
    let centerpiece = h.first_time(|op| {
        matches!(op, SurfaceOp::SetVisible { anchor, visible: true } if anchor == anchors::CENTERPIECE)
    });
    let typed = h.first_time(|op| {
        matches!(op, SurfaceOp::SetText { anchor, text } if anchor == anchors::TYPEWRITER && !text.is_empty())
    });
    let navigation = h.first_time(|op| {
        matches!(op, SurfaceOp::SetVisible { anchor, visible: true } if anchor == anchors::NAVIGATION)
    });

    assert_eq!(intro, Some(0));
    assert_eq!(h.mounts(anchors::PETALS).first(), Some(&1_300));
    assert_eq!(centerpiece, Some(1_500));
    assert_eq!(typed, Some(2_600));
    assert_eq!(navigation, Some(4_000));

    let order: Vec<_> = rx
        .try_iter()
        .filter_map(|e| match e {
            NavigatorEvent::Began => Some("began"),
            NavigatorEvent::AudioChanged { enabled: true } => Some("audio"),
            NavigatorEvent::EffectStarted {
                kind: EffectKind::Particles,
                ..
            } => Some("petals"),
            NavigatorEvent::EffectStarted {
                kind: EffectKind::Typewriter,
                ..
            } => Some("typewriter"),
            NavigatorEvent::NavigationEnabled => Some("navigation"),
            _ => None,
        })
        .collect();
    assert_eq!(order, vec!["began", "audio", "petals", "typewriter", "navigation"]);
}

#[test]
fn typewriter_finishes_with_cursor() {
    let mut h = Harness::standard(4);
    h.open();
    h.run_until(20_000);

    let text = h.nav.surface().text(anchors::TYPEWRITER).to_string();
    assert!(h.config.messages.contains(&text));
    let anchor = h.nav.surface().anchor(anchors::TYPEWRITER).unwrap();
    assert!(anchor.cursor);

    let cursor_at = h.first_time(|op| {
        matches!(op, SurfaceOp::SetCursor { anchor, visible: true } if anchor == anchors::TYPEWRITER)
    });
    let chars = text.chars().count() as u64;
    assert_eq!(cursor_at, Some(2_500 + 100 * (chars + 1)));
    assert!(live_for(&h, Origin::Opening).is_empty());
}

#[test]
fn replay_on_landing_restarts_opening_effects() {
    let mut h = Harness::standard(6);
    h.open();
    h.run_until(9_000);
    assert_eq!(live_for(&h, Origin::Opening), vec![(EffectKind::Particles, true)]);

    h.nav.replay();
    assert!(h.nav.surface().is_visible(anchors::CENTERPIECE));
    assert_eq!(
        live_for(&h, Origin::Opening),
        vec![(EffectKind::Particles, true), (EffectKind::Typewriter, false)]
    );

    h.run_for(1_000);
    assert_eq!(h.nav.surface().text(anchors::TYPEWRITER), "");
    assert_eq!(
        live_for(&h, Origin::Opening),
        vec![(EffectKind::Particles, true), (EffectKind::Typewriter, true)]
    );
}

#[test]
fn replay_reruns_section_effects() {
    let mut h = Harness::standard(6);
    h.open();
    h.nav.go_to(SectionId::Gallery);
    h.run_for(2_000);
    assert!(live_for(&h, Origin::Section(SectionId::Gallery)).is_empty());
    assert!(h.nav.surface().is_visible("polaroid-card/5"));

    h.nav.replay();
    assert_eq!(
        live_for(&h, Origin::Section(SectionId::Gallery)),
        vec![(EffectKind::Stagger, true)]
    );
    assert!(!h.nav.surface().is_visible("polaroid-card/5"));

    // Replaying again supersedes the running reveal
    h.run_for(100);
    h.nav.replay();
    assert_eq!(live_for(&h, Origin::Section(SectionId::Gallery)).len(), 1);
}

#[test]
fn replay_is_ignored_before_navigation() {
    let mut h = Harness::standard(6);
    h.nav.replay();
    h.nav.begin();
    h.run_until(1_000);
    h.nav.replay();
    assert_eq!(live_for(&h, Origin::Opening), vec![(EffectKind::Particles, true)]);
}

#[test]
fn same_seed_same_output() {
    let run = |seed: u64| {
        let mut h = Harness::standard(seed);
        h.open();
        h.nav.last();
        h.run_for(8_000);
        h.nav.surface().log().to_vec()
    };

    assert_eq!(run(42), run(42));
    assert_ne!(run(42), run(43));
}

#[test]
fn audio_toggle_leaves_navigation_alone() {
    let mut h = Harness::standard(1);
    h.open();
    h.nav.go_to(SectionId::Video);

    h.nav.toggle_audio();
    assert!(!h.nav.audio_enabled());
    assert_eq!(h.nav.current(), SectionId::Video);

    h.nav.reset();
    assert!(!h.nav.audio_enabled());
    h.nav.toggle_audio();
    assert!(h.nav.audio_enabled());
}
