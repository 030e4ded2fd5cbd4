use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EffectsConfig;
use crate::effects::{EffectParams, EffectSpec, ParticleParams, StaggerParams};
use crate::surface::anchors;
use crate::{Error, Result};

/// Section identifiers in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Landing,
    Poem,
    About,
    Gallery,
    Testimonials,
    Video,
    #[serde(rename = "final", alias = "finale")]
    Finale,
}

impl SectionId {
    pub const ALL: [SectionId; 7] = [
        SectionId::Landing,
        SectionId::Poem,
        SectionId::About,
        SectionId::Gallery,
        SectionId::Testimonials,
        SectionId::Video,
        SectionId::Finale,
    ];

    /// Name used by navigation controls and anchors
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Landing => "landing",
            SectionId::Poem => "poem",
            SectionId::About => "about",
            SectionId::Gallery => "gallery",
            SectionId::Testimonials => "testimonials",
            SectionId::Video => "video",
            SectionId::Finale => "final",
        }
    }

    /// Label shown on the navigation bar
    pub fn label(&self) -> &'static str {
        match self {
            SectionId::Landing => "Home",
            SectionId::Poem => "Poem",
            SectionId::About => "About",
            SectionId::Gallery => "Memories",
            SectionId::Testimonials => "Wishes",
            SectionId::Video => "Video",
            SectionId::Finale => "Finale",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "landing" | "home" => Ok(SectionId::Landing),
            "poem" => Ok(SectionId::Poem),
            "about" => Ok(SectionId::About),
            "gallery" => Ok(SectionId::Gallery),
            "testimonials" => Ok(SectionId::Testimonials),
            "video" => Ok(SectionId::Video),
            "final" | "finale" => Ok(SectionId::Finale),
            other => Err(Error::InvalidTransition(format!("unknown section '{}'", other))),
        }
    }
}

/// One content panel and the effects it runs on entry
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: SectionId,
    /// Opaque handle of the section's content on the presentation surface
    pub anchor: String,
    pub effects: Vec<EffectSpec>,
}

impl Section {
    pub fn new(id: SectionId) -> Self {
        Self {
            id,
            anchor: id.as_str().to_string(),
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, spec: EffectSpec) -> Self {
        self.effects.push(spec);
        self
    }
}

/// Ordered, immutable list of sections
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    /// Build a registry; fails on an empty list or a repeated id
    pub fn new(sections: Vec<Section>) -> Result<Self> {
        if sections.is_empty() {
            return Err(Error::Config("a presentation needs at least one section".into()));
        }
        let mut seen = HashSet::new();
        for section in &sections {
            if !seen.insert(section.id) {
                return Err(Error::Config(format!("section '{}' listed twice", section.id)));
            }
        }
        Ok(Self { sections })
    }

    /// All seven sections with their standard entry effects
    pub fn standard(effects: &EffectsConfig) -> Self {
        Self {
            sections: SectionId::ALL
                .iter()
                .map(|&id| standard_section(id, effects))
                .collect(),
        }
    }

    /// A subset of the standard sections in the given order
    pub fn with_order(order: &[SectionId], effects: &EffectsConfig) -> Result<Self> {
        Self::new(order.iter().map(|&id| standard_section(id, effects)).collect())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn first(&self) -> SectionId {
        self.sections[0].id
    }

    pub fn last(&self) -> SectionId {
        self.sections[self.sections.len() - 1].id
    }

    pub fn get(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: SectionId) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: SectionId) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    /// Section following `id`, if any
    pub fn next_after(&self, id: SectionId) -> Option<SectionId> {
        let idx = self.position(id)?;
        self.sections.get(idx + 1).map(|s| s.id)
    }

    /// Section preceding `id`, if any
    pub fn previous_before(&self, id: SectionId) -> Option<SectionId> {
        let idx = self.position(id)?;
        idx.checked_sub(1).map(|i| self.sections[i].id)
    }

    pub fn ids(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.sections.iter().map(|s| s.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }
}

fn standard_section(id: SectionId, effects: &EffectsConfig) -> Section {
    let section = Section::new(id);
    let stagger = |selector: &str, config| {
        EffectSpec::new(EffectParams::Stagger(StaggerParams::from_config(selector, config)))
    };

    match id {
        SectionId::Poem => section.with_effect(stagger(anchors::POEM_STANZAS, effects.poem)),
        SectionId::About => section.with_effect(stagger(anchors::ACHIEVEMENTS, effects.about)),
        SectionId::Gallery => section.with_effect(stagger(anchors::POLAROIDS, effects.gallery)),
        SectionId::Testimonials => {
            section.with_effect(stagger(anchors::TESTIMONIALS, effects.testimonials))
        }
        SectionId::Finale => section.with_effect(EffectSpec::delayed(
            EffectParams::Particles(ParticleParams::from_config(
                anchors::CONFETTI,
                &effects.confetti,
            )),
            effects.confetti.entry_delay_ms,
        )),
        // The landing choreography belongs to the navigator's opening sequence
        SectionId::Landing | SectionId::Video => section,
    }
}
