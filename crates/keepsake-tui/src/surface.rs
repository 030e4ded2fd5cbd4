//! Terminal implementation of the presentation surface
//!
//! Nothing is drawn here. The surface keeps what should be on screen, with
//! the time each anchor last changed, and the widgets read it every frame to
//! render fades and falling units.

use std::collections::HashMap;

use keepsake_core::surface::anchors;
use keepsake_core::{
    Clock, EffectUnit, Error, Millis, MonotonicClock, PresentationSurface, Result, SectionId,
    UnitId,
};

use crate::content;

/// What an anchor currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorView {
    pub visible: bool,
    /// Time the visibility last flipped
    pub since: Millis,
    pub text: String,
    pub cursor: bool,
}

pub struct TerminalSurface {
    clock: MonotonicClock,
    section: Option<(SectionId, Millis)>,
    anchors: HashMap<String, AnchorView>,
    containers: HashMap<String, Vec<EffectUnit>>,
    children: HashMap<String, Vec<String>>,
}

impl TerminalSurface {
    /// Surface laid out for the bundled section content
    pub fn new(clock: MonotonicClock) -> Self {
        let mut surface = Self {
            clock,
            section: None,
            anchors: HashMap::new(),
            containers: HashMap::new(),
            children: HashMap::new(),
        };

        for anchor in [
            anchors::INTRO,
            anchors::CENTERPIECE,
            anchors::TYPEWRITER,
            anchors::NAVIGATION,
        ] {
            surface.anchors.insert(anchor.to_string(), AnchorView::default());
        }
        for container in [anchors::PETALS, anchors::CONFETTI] {
            surface.containers.insert(container.to_string(), Vec::new());
        }
        surface.add_children(anchors::POEM_STANZAS, content::POEM_STANZAS.len());
        surface.add_children(anchors::ACHIEVEMENTS, content::ACHIEVEMENTS.len());
        surface.add_children(anchors::POLAROIDS, content::POLAROIDS.len());
        surface.add_children(anchors::TESTIMONIALS, content::TESTIMONIALS.len());
        surface
    }

    fn add_children(&mut self, selector: &str, count: usize) {
        let names: Vec<String> = (0..count).map(|i| anchors::child(selector, i)).collect();
        for name in &names {
            self.anchors.insert(name.clone(), AnchorView::default());
        }
        self.children.insert(selector.to_string(), names);
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    /// Section on screen and the time it was shown
    pub fn section(&self) -> Option<(SectionId, Millis)> {
        self.section
    }

    pub fn anchor(&self, name: &str) -> Option<&AnchorView> {
        self.anchors.get(name)
    }

    /// View of the `index`-th child of `selector`
    pub fn child(&self, selector: &str, index: usize) -> Option<&AnchorView> {
        self.anchors.get(&anchors::child(selector, index))
    }

    pub fn units(&self, container: &str) -> &[EffectUnit] {
        self.containers
            .get(container)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn anchor_mut(&mut self, name: &str) -> Result<&mut AnchorView> {
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

impl PresentationSurface for TerminalSurface {
    fn show_section(&mut self, id: SectionId) -> Result<()> {
        self.section = Some((id, self.now()));
        Ok(())
    }

    fn hide_section(&mut self, id: SectionId) -> Result<()> {
        if matches!(self.section, Some((shown, _)) if shown == id) {
            self.section = None;
        }
        Ok(())
    }

    fn mount_unit(&mut self, container: &str, unit: EffectUnit) -> Result<()> {
        self.container_mut(container)?.push(unit);
        Ok(())
    }

    fn unmount_unit(&mut self, container: &str, unit: UnitId) -> Result<()> {
        self.container_mut(container)?.retain(|u| u.id != unit);
        Ok(())
    }

    fn clear_container(&mut self, container: &str) -> Result<()> {
        self.container_mut(container)?.clear();
        Ok(())
    }

    fn set_text(&mut self, anchor: &str, text: &str) -> Result<()> {
        let view = self.anchor_mut(anchor)?;
        view.text.clear();
        view.text.push_str(text);
        Ok(())
    }

    fn set_cursor(&mut self, anchor: &str, visible: bool) -> Result<()> {
        self.anchor_mut(anchor)?.cursor = visible;
        Ok(())
    }

    fn set_visible(&mut self, anchor: &str, visible: bool) -> Result<()> {
        let now = self.now();
        let view = self.anchor_mut(anchor)?;
        if view.visible != visible {
            view.visible = visible;
            view.since = now;
        }
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
