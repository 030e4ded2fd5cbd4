//! Presentation surface contract and an in-memory implementation
//!
//! The navigator never draws anything itself. It shows and hides sections,
//! mounts particle units, types text and toggles visibility through
//! [`PresentationSurface`]. `MemorySurface` records every call and is what the
//! headless timeline and the tests run against.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::effects::{EffectUnit, UnitId};
use crate::section::SectionId;
use crate::timer::{Clock, Millis};
use crate::{Error, Result};

/// Well-known anchor, container and selector names
pub mod anchors {
    /// Landing content hidden when the presentation begins
    pub const INTRO: &str = "intro";
    /// Animated birthday centerpiece
    pub const CENTERPIECE: &str = "centerpiece";
    /// Typewriter text line
    pub const TYPEWRITER: &str = "typewriter";
    /// Navigation bar
    pub const NAVIGATION: &str = "navigation";
    /// Petal mount point
    pub const PETALS: &str = "petals";
    /// Confetti mount point
    pub const CONFETTI: &str = "confetti";

    pub const POEM_STANZAS: &str = "poem-stanza";
    pub const ACHIEVEMENTS: &str = "achievement-card";
    pub const POLAROIDS: &str = "polaroid-card";
    pub const TESTIMONIALS: &str = "testimonial-card";

    /// Anchor of the `index`-th child matched by `selector`
    pub fn child(selector: &str, index: usize) -> String {
        format!("{}/{}", selector, index)
    }
}

/// Host surface the navigator and its effects draw into
///
/// Every operation fails with [`Error::MountUnavailable`] when the named anchor
/// or container does not exist.
pub trait PresentationSurface {
    fn show_section(&mut self, id: SectionId) -> Result<()>;
    fn hide_section(&mut self, id: SectionId) -> Result<()>;
    fn mount_unit(&mut self, container: &str, unit: EffectUnit) -> Result<()>;
    fn unmount_unit(&mut self, container: &str, unit: UnitId) -> Result<()>;
    /// Remove every unit from a container at once
    fn clear_container(&mut self, container: &str) -> Result<()>;
    fn set_text(&mut self, anchor: &str, text: &str) -> Result<()>;
    /// Show or hide the blinking cursor after an anchor's text
    fn set_cursor(&mut self, anchor: &str, visible: bool) -> Result<()>;
    fn set_visible(&mut self, anchor: &str, visible: bool) -> Result<()>;
    /// Anchors of the ordered children matched by `selector`
    fn children(&self, selector: &str) -> Result<Vec<String>>;
    /// Whether an anchor or container exists
    fn contains(&self, anchor: &str) -> bool;
}

/// State of one anchor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnchorState {
    pub visible: bool,
    pub text: String,
    pub cursor: bool,
}

/// A recorded surface call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceOp {
    ShowSection { section: SectionId },
    HideSection { section: SectionId },
    Mount { container: String, unit: UnitId },
    Unmount { container: String, unit: UnitId },
    Clear { container: String },
    SetText { anchor: String, text: String },
    SetCursor { anchor: String, visible: bool },
    SetVisible { anchor: String, visible: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recorded {
    pub at: Millis,
    #[serde(flatten)]
    pub op: SurfaceOp,
}

/// In-memory surface that keeps state and a log of every call
pub struct MemorySurface {
    clock: Option<Box<dyn Clock>>,
    shown: BTreeSet<SectionId>,
    anchors: BTreeMap<String, AnchorState>,
    containers: BTreeMap<String, Vec<EffectUnit>>,
    children: BTreeMap<String, Vec<String>>,
    log: Vec<Recorded>,
}

impl MemorySurface {
    /// A surface with no anchors at all
    pub fn empty() -> Self {
        Self {
            clock: None,
            shown: BTreeSet::new(),
            anchors: BTreeMap::new(),
            containers: BTreeMap::new(),
            children: BTreeMap::new(),
            log: Vec::new(),
        }
    }

    /// A surface laid out like the standard presentation
    pub fn standard() -> Self {
        Self::empty()
            .with_anchor(anchors::INTRO)
            .with_anchor(anchors::CENTERPIECE)
            .with_anchor(anchors::TYPEWRITER)
            .with_anchor(anchors::NAVIGATION)
            .with_container(anchors::PETALS)
            .with_container(anchors::CONFETTI)
            .with_children(anchors::POEM_STANZAS, 4)
            .with_children(anchors::ACHIEVEMENTS, 4)
            .with_children(anchors::POLAROIDS, 6)
            .with_children(anchors::TESTIMONIALS, 3)
    }

    /// Stamp recorded operations with this clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn with_anchor(mut self, name: &str) -> Self {
        self.anchors.entry(name.to_string()).or_default();
        self
    }

    pub fn with_container(mut self, name: &str) -> Self {
        self.containers.entry(name.to_string()).or_default();
        self
    }

    pub fn with_children(mut self, selector: &str, count: usize) -> Self {
        let names: Vec<String> = (0..count).map(|i| anchors::child(selector, i)).collect();
        for name in &names {
            self.anchors.entry(name.clone()).or_default();
        }
        self.children.insert(selector.to_string(), names);
        self
    }

    pub fn log(&self) -> &[Recorded] {
        &self.log
    }

    pub fn take_log(&mut self) -> Vec<Recorded> {
        std::mem::take(&mut self.log)
    }

    pub fn is_shown(&self, id: SectionId) -> bool {
        self.shown.contains(&id)
    }

    pub fn shown(&self) -> Vec<SectionId> {
        self.shown.iter().copied().collect()
    }

    pub fn anchor(&self, name: &str) -> Option<&AnchorState> {
        self.anchors.get(name)
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.anchors.get(name).map(|a| a.visible).unwrap_or(false)
    }

    pub fn text(&self, name: &str) -> &str {
        self.anchors.get(name).map(|a| a.text.as_str()).unwrap_or("")
    }

    pub fn units(&self, container: &str) -> &[EffectUnit] {
        self.containers
            .get(container)
            .map(|units| units.as_slice())
            .unwrap_or(&[])
    }

    fn record(&mut self, op: SurfaceOp) {
        let at = self.clock.as_ref().map(|c| c.now_ms()).unwrap_or(0);
        self.log.push(Recorded { at, op });
    }

    fn anchor_mut(&mut self, name: &str) -> Result<&mut AnchorState> {
        self.anchors
            .get_mut(name)
            .ok_or_else(|| Error::MountUnavailable(name.to_string()))
    }

    fn container_mut(&mut self, name: &str) -> Result<&mut Vec<EffectUnit>> {
        self.containers
            .get_mut(name)
            .ok_or_else(|| Error::MountUnavailable(name.to_string()))
    }
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::standard()
    }
}

impl PresentationSurface for MemorySurface {
    fn show_section(&mut self, id: SectionId) -> Result<()> {
        self.shown.insert(id);
        self.record(SurfaceOp::ShowSection { section: id });
        Ok(())
    }

    fn hide_section(&mut self, id: SectionId) -> Result<()> {
        self.shown.remove(&id);
        self.record(SurfaceOp::HideSection { section: id });
        Ok(())
    }

    fn mount_unit(&mut self, container: &str, unit: EffectUnit) -> Result<()> {
        let id = unit.id;
        self.container_mut(container)?.push(unit);
        self.record(SurfaceOp::Mount {
            container: container.to_string(),
            unit: id,
        });
        Ok(())
    }

    fn unmount_unit(&mut self, container: &str, unit: UnitId) -> Result<()> {
        let units = self.container_mut(container)?;
        let before = units.len();
        units.retain(|u| u.id != unit);
        if units.len() != before {
            self.record(SurfaceOp::Unmount {
                container: container.to_string(),
                unit,
            });
        }
        Ok(())
    }

    fn clear_container(&mut self, container: &str) -> Result<()> {
        self.container_mut(container)?.clear();
        self.record(SurfaceOp::Clear {
            container: container.to_string(),
        });
        Ok(())
    }

    fn set_text(&mut self, anchor: &str, text: &str) -> Result<()> {
        self.anchor_mut(anchor)?.text = text.to_string();
        self.record(SurfaceOp::SetText {
            anchor: anchor.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn set_cursor(&mut self, anchor: &str, visible: bool) -> Result<()> {
        self.anchor_mut(anchor)?.cursor = visible;
        self.record(SurfaceOp::SetCursor {
            anchor: anchor.to_string(),
            visible,
        });
        Ok(())
    }

    fn set_visible(&mut self, anchor: &str, visible: bool) -> Result<()> {
        self.anchor_mut(anchor)?.visible = visible;
        self.record(SurfaceOp::SetVisible {
            anchor: anchor.to_string(),
            visible,
        });
        Ok(())
    }

    fn children(&self, selector: &str) -> Result<Vec<String>> {
        self.children
            .get(selector)
            .cloned()
            .ok_or_else(|| Error::MountUnavailable(selector.to_string()))
    }

    fn contains(&self, anchor: &str) -> bool {
        self.anchors.contains_key(anchor)
            || self.containers.contains_key(anchor)
            || self.children.contains_key(anchor)
    }
}
