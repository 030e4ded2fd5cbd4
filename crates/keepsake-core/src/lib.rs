pub mod audio;
pub mod config;
pub mod effects;
pub mod error;
pub mod input;
pub mod navigator;
pub mod random;
pub mod section;
pub mod surface;
pub mod timer;

pub use audio::{Audio, SimulatedAudio};
pub use config::{AppConfig, EasingType};
pub use effects::{EffectHandle, EffectKind, EffectUnit, Origin, UnitId};
pub use error::{Error, Result};
pub use input::{Control, InputEvent, InputRouter, NavKey};
pub use navigator::{EffectInfo, Navigator, NavigatorEvent, Phase, Stage};
pub use random::{RandomSource, SeededRandom};
pub use section::{Section, SectionId, SectionRegistry};
pub use surface::{anchors, MemorySurface, PresentationSurface};
pub use timer::{Clock, ManualClock, Millis, MonotonicClock};
