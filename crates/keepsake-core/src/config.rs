use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use crate::timer::Millis;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Candidate wishes for the typewriter; one is picked at random
    #[serde(default = "default_messages")]
    pub messages: Vec<String>,
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub effects: EffectsConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            messages: default_messages(),
            general: GeneralConfig::default(),
            ui: UiConfig::default(),
            timeline: TimelineConfig::default(),
            effects: EffectsConfig::default(),
            input: InputConfig::default(),
            keymap: KeymapConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (logs live here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Fixed seed for particle and message randomness
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Idle tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frame rate while effects are running
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Easing used for reveal fades and falling particles
    #[serde(default)]
    pub easing: EasingType,
    /// Colour overrides
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            easing: EasingType::default(),
            theme: ThemeConfig::default(),
        }
    }
}

/// Easing function type for fades and falling particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EasingType {
    /// No easing: jump to the end state
    None,
    /// Linear interpolation
    Linear,
    /// Cubic ease-out: f(t) = 1 - (1-t)^3
    #[default]
    Cubic,
    /// Quintic ease-out: f(t) = 1 - (1-t)^5
    Quintic,
    /// Exponential ease-out: f(t) = 1 - 2^(-10t)
    EaseOut,
}

/// Optional colour overrides; each value is a hex string ("#f8b5c3" or "f8b5c3")
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub background: Option<String>,
    pub foreground: Option<String>,
    pub accent: Option<String>,
    pub muted: Option<String>,
}

/// Offsets of the opening choreography, all relative to the moment the
/// presentation begins. The intro fades out at offset zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_audio_ms")]
    pub audio_ms: Millis,
    #[serde(default = "default_petals_ms")]
    pub petals_ms: Millis,
    #[serde(default = "default_centerpiece_ms")]
    pub centerpiece_ms: Millis,
    #[serde(default = "default_typewriter_ms")]
    pub typewriter_ms: Millis,
    #[serde(default = "default_navigation_ms")]
    pub navigation_ms: Millis,
    /// Delay between re-showing the centerpiece and restarting the typewriter on replay
    #[serde(default = "default_replay_typewriter_ms")]
    pub replay_typewriter_ms: Millis,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            audio_ms: default_audio_ms(),
            petals_ms: default_petals_ms(),
            centerpiece_ms: default_centerpiece_ms(),
            typewriter_ms: default_typewriter_ms(),
            navigation_ms: default_navigation_ms(),
            replay_typewriter_ms: default_replay_typewriter_ms(),
        }
    }
}

impl TimelineConfig {
    /// Stage offsets in firing order
    pub fn stages(&self) -> [(&'static str, Millis); 5] {
        [
            ("audio_ms", self.audio_ms),
            ("petals_ms", self.petals_ms),
            ("centerpiece_ms", self.centerpiece_ms),
            ("typewriter_ms", self.typewriter_ms),
            ("navigation_ms", self.navigation_ms),
        ]
    }

    /// Offsets must never decrease, otherwise stages could be observed out of order
    pub fn validate(&self) -> crate::Result<()> {
        for pair in self.stages().windows(2) {
            let (prev_name, prev) = pair[0];
            let (name, offset) = pair[1];
            if offset < prev {
                return Err(crate::Error::Config(format!(
                    "timeline.{} ({}ms) must not be earlier than timeline.{} ({}ms)",
                    name, offset, prev_name, prev
                )));
            }
        }
        Ok(())
    }
}

/// Particle emitter parameters
///
/// A table may set any subset of fields; the rest come from the table's own
/// defaults (`petals()` or `confetti()`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleConfig {
    /// Time between two emitted units
    pub interval_ms: Millis,
    /// Total time the emitter runs before stopping itself
    pub duration_ms: Millis,
    /// Time a unit stays mounted
    pub lifetime_ms: Millis,
    pub size_min: f64,
    pub size_max: f64,
    /// Range of the fall animation length
    pub fall_min_ms: Millis,
    pub fall_max_ms: Millis,
    /// Upper bound of the random delay before a unit starts falling
    pub delay_max_ms: Millis,
    /// Palette, hex strings
    pub colors: Vec<String>,
    /// Delay between section activation and the first emission window
    pub entry_delay_ms: Millis,
}

impl ParticleConfig {
    pub fn petals() -> Self {
        Self {
            interval_ms: 300,
            duration_ms: 10_000,
            lifetime_ms: 7_000,
            size_min: 10.0,
            size_max: 25.0,
            fall_min_ms: 4_000,
            fall_max_ms: 7_000,
            delay_max_ms: 2_000,
            colors: palette(&["#f8b5c3", "#e91e63", "#d1c4e9", "#ffd700"]),
            entry_delay_ms: 0,
        }
    }

    pub fn confetti() -> Self {
        Self {
            interval_ms: 100,
            duration_ms: 5_000,
            lifetime_ms: 5_000,
            size_min: 6.0,
            size_max: 10.0,
            fall_min_ms: 2_000,
            fall_max_ms: 5_000,
            delay_max_ms: 1_000,
            colors: palette(&["#ffd700", "#e91e63", "#f8b5c3", "#d1c4e9"]),
            entry_delay_ms: 1_000,
        }
    }
}

/// Fields of a partial `[effects.petals]` or `[effects.confetti]` table
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParticleTable {
    interval_ms: Option<Millis>,
    duration_ms: Option<Millis>,
    lifetime_ms: Option<Millis>,
    size_min: Option<f64>,
    size_max: Option<f64>,
    fall_min_ms: Option<Millis>,
    fall_max_ms: Option<Millis>,
    delay_max_ms: Option<Millis>,
    colors: Option<Vec<String>>,
    entry_delay_ms: Option<Millis>,
}

impl ParticleTable {
    fn over(self, base: ParticleConfig) -> ParticleConfig {
        ParticleConfig {
            interval_ms: self.interval_ms.unwrap_or(base.interval_ms),
            duration_ms: self.duration_ms.unwrap_or(base.duration_ms),
            lifetime_ms: self.lifetime_ms.unwrap_or(base.lifetime_ms),
            size_min: self.size_min.unwrap_or(base.size_min),
            size_max: self.size_max.unwrap_or(base.size_max),
            fall_min_ms: self.fall_min_ms.unwrap_or(base.fall_min_ms),
            fall_max_ms: self.fall_max_ms.unwrap_or(base.fall_max_ms),
            delay_max_ms: self.delay_max_ms.unwrap_or(base.delay_max_ms),
            colors: self.colors.unwrap_or(base.colors),
            entry_delay_ms: self.entry_delay_ms.unwrap_or(base.entry_delay_ms),
        }
    }
}

fn petals_table<'de, D: Deserializer<'de>>(d: D) -> Result<ParticleConfig, D::Error> {
    Ok(ParticleTable::deserialize(d)?.over(ParticleConfig::petals()))
}

fn confetti_table<'de, D: Deserializer<'de>>(d: D) -> Result<ParticleConfig, D::Error> {
    Ok(ParticleTable::deserialize(d)?.over(ParticleConfig::confetti()))
}

/// Typewriter parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypewriterConfig {
    #[serde(default = "default_char_delay")]
    pub char_delay_ms: Millis,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            char_delay_ms: default_char_delay(),
        }
    }
}

/// Staggered reveal parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StaggerConfig {
    /// Offset between two consecutive children
    pub stagger_ms: Millis,
    /// Length of one child's reveal animation
    pub animation_ms: Millis,
}

impl StaggerConfig {
    pub const fn new(stagger_ms: Millis, animation_ms: Millis) -> Self {
        Self {
            stagger_ms,
            animation_ms,
        }
    }
}

/// Fields of a partial stagger table
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StaggerTable {
    stagger_ms: Option<Millis>,
    animation_ms: Option<Millis>,
}

impl StaggerTable {
    fn over(self, base: StaggerConfig) -> StaggerConfig {
        StaggerConfig {
            stagger_ms: self.stagger_ms.unwrap_or(base.stagger_ms),
            animation_ms: self.animation_ms.unwrap_or(base.animation_ms),
        }
    }
}

fn poem_table<'de, D: Deserializer<'de>>(d: D) -> Result<StaggerConfig, D::Error> {
    Ok(StaggerTable::deserialize(d)?.over(default_poem_stagger()))
}

fn card_table<'de, D: Deserializer<'de>>(d: D) -> Result<StaggerConfig, D::Error> {
    Ok(StaggerTable::deserialize(d)?.over(default_card_stagger()))
}

fn testimonial_table<'de, D: Deserializer<'de>>(d: D) -> Result<StaggerConfig, D::Error> {
    Ok(StaggerTable::deserialize(d)?.over(default_testimonial_stagger()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectsConfig {
    #[serde(default = "ParticleConfig::petals", deserialize_with = "petals_table")]
    pub petals: ParticleConfig,
    #[serde(default = "ParticleConfig::confetti", deserialize_with = "confetti_table")]
    pub confetti: ParticleConfig,
    #[serde(default)]
    pub typewriter: TypewriterConfig,
    #[serde(default = "default_poem_stagger", deserialize_with = "poem_table")]
    pub poem: StaggerConfig,
    #[serde(default = "default_card_stagger", deserialize_with = "card_table")]
    pub about: StaggerConfig,
    #[serde(default = "default_card_stagger", deserialize_with = "card_table")]
    pub gallery: StaggerConfig,
    #[serde(default = "default_testimonial_stagger", deserialize_with = "testimonial_table")]
    pub testimonials: StaggerConfig,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            petals: ParticleConfig::petals(),
            confetti: ParticleConfig::confetti(),
            typewriter: TypewriterConfig::default(),
            poem: default_poem_stagger(),
            about: default_card_stagger(),
            gallery: default_card_stagger(),
            testimonials: default_testimonial_stagger(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Ignore further wheel navigation for this long after a wheel step (0 = off)
    #[serde(default = "default_wheel_cooldown")]
    pub wheel_cooldown_ms: Millis,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            wheel_cooldown_ms: default_wheel_cooldown(),
        }
    }
}

/// Keymap configuration using Vim-style notation
/// Format: "l", "<C-n>" (Ctrl+n), "G" (Shift+g), "<CR>" (Enter), "<Space>", "<Right>"
///
/// Arrow keys, Home and End are always bound to next/previous/first/last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Quit the presentation
    #[serde(default = "default_key_quit")]
    pub quit: String,
    /// Start the presentation from the landing screen
    #[serde(default = "default_key_begin")]
    pub begin: String,
    /// Next section
    #[serde(default = "default_key_next")]
    pub next: String,
    /// Previous section
    #[serde(default = "default_key_previous")]
    pub previous: String,
    /// First section
    #[serde(default = "default_key_first")]
    pub first: String,
    /// Last section
    #[serde(default = "default_key_last")]
    pub last: String,
    /// Replay the current section's effects
    #[serde(default = "default_key_replay")]
    pub replay: String,
    /// Restart from the landing screen
    #[serde(default = "default_key_restart")]
    pub restart: String,
    /// Toggle background music
    #[serde(default = "default_key_toggle_audio")]
    pub toggle_audio: String,
    /// Show key help
    #[serde(default = "default_key_help")]
    pub help: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            begin: default_key_begin(),
            next: default_key_next(),
            previous: default_key_previous(),
            first: default_key_first(),
            last: default_key_last(),
            replay: default_key_replay(),
            restart: default_key_restart(),
            toggle_audio: default_key_toggle_audio(),
            help: default_key_help(),
        }
    }
}

// Default keymap values (Vim-style notation)
fn default_key_quit() -> String { "q".to_string() }
fn default_key_begin() -> String { "<CR>".to_string() }
fn default_key_next() -> String { "l".to_string() }
fn default_key_previous() -> String { "h".to_string() }
fn default_key_first() -> String { "g".to_string() }
fn default_key_last() -> String { "G".to_string() }
fn default_key_replay() -> String { "r".to_string() }
fn default_key_restart() -> String { "R".to_string() }
fn default_key_toggle_audio() -> String { "m".to_string() }
fn default_key_help() -> String { "?".to_string() }

fn default_messages() -> Vec<String> {
    [
        "Wishing you the most wonderful birthday...",
        "May your special day be filled with joy...",
        "Another year of amazing memories begins...",
        "Celebrating the incredible person you are!",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn palette(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|c| c.to_string()).collect()
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keepsake")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    30
}

fn default_audio_ms() -> Millis {
    500
}

fn default_petals_ms() -> Millis {
    1_000
}

fn default_centerpiece_ms() -> Millis {
    1_500
}

fn default_typewriter_ms() -> Millis {
    2_500 // one second after the centerpiece appears
}

fn default_navigation_ms() -> Millis {
    4_000
}

fn default_replay_typewriter_ms() -> Millis {
    1_000
}

fn default_char_delay() -> Millis {
    100
}

fn default_poem_stagger() -> StaggerConfig {
    StaggerConfig::new(500, 1_000)
}

fn default_card_stagger() -> StaggerConfig {
    StaggerConfig::new(200, 800)
}

fn default_testimonial_stagger() -> StaggerConfig {
    StaggerConfig::new(300, 800)
}

fn default_wheel_cooldown() -> Millis {
    800
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.timeline.validate()?;

        for (name, particles) in [
            ("effects.petals", &self.effects.petals),
            ("effects.confetti", &self.effects.confetti),
        ] {
            if particles.colors.is_empty() {
                return Err(crate::Error::Config(format!("{}.colors must not be empty", name)));
            }
            if particles.size_max < particles.size_min || particles.fall_max_ms < particles.fall_min_ms {
                return Err(crate::Error::Config(format!("{} has an inverted range", name)));
            }
        }

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/keepsake/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("keepsake")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Get the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_opening() {
        let config = AppConfig::default();
        assert_eq!(config.timeline.petals_ms, 1_000);
        assert_eq!(config.timeline.centerpiece_ms, 1_500);
        assert_eq!(config.timeline.typewriter_ms, 2_500);
        assert_eq!(config.timeline.navigation_ms, 4_000);
        assert_eq!(config.effects.confetti.entry_delay_ms, 1_000);
        assert_eq!(config.messages.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            messages = ["Happy birthday!"]

            [input]
            wheel_cooldown_ms = 0

            [effects.poem]
            stagger_ms = 250
            animation_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.messages, vec!["Happy birthday!".to_string()]);
        assert_eq!(config.input.wheel_cooldown_ms, 0);
        assert_eq!(config.effects.poem, StaggerConfig::new(250, 500));
        assert_eq!(config.effects.about, StaggerConfig::new(200, 800));
        assert_eq!(config.effects.petals, ParticleConfig::petals());
        assert_eq!(config.keymap.next, "l");
    }

    #[test]
    fn test_partial_effect_tables_keep_their_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [effects.petals]
            interval_ms = 200

            [effects.confetti]
            interval_ms = 50

            [effects.poem]
            stagger_ms = 250

            [effects.testimonials]
            animation_ms = 400
            "#,
        )
        .unwrap();

        let petals = ParticleConfig {
            interval_ms: 200,
            ..ParticleConfig::petals()
        };
        assert_eq!(config.effects.petals, petals);

        assert_eq!(config.effects.confetti.interval_ms, 50);
        assert_eq!(config.effects.confetti.entry_delay_ms, 1_000);
        assert_eq!(config.effects.confetti.colors, ParticleConfig::confetti().colors);

        assert_eq!(config.effects.poem, StaggerConfig::new(250, 1_000));
        assert_eq!(config.effects.testimonials, StaggerConfig::new(300, 400));
        assert_eq!(config.effects.about, StaggerConfig::new(200, 800));
    }

    #[test]
    fn test_out_of_order_timeline_rejected() {
        let result = AppConfig::from_toml(
            r#"
            [timeline]
            centerpiece_ms = 5000
            "#,
        );
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_easing_parse() {
        let config = AppConfig::from_toml(
            r#"
            [ui]
            easing = "easeout"
            "#,
        )
        .unwrap();
        assert_eq!(config.ui.easing, EasingType::EaseOut);
    }

    #[test]
    fn test_round_trip_toml() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.effects.confetti, config.effects.confetti);
        assert_eq!(parsed.keymap.last, "G");
    }
}
