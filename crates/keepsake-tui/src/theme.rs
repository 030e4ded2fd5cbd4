use keepsake_core::config::ThemeConfig;
use ratatui::style::Color;
use tracing::warn;

/// Runtime palette
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub surface: Color,
    pub foreground: Color,
    pub muted: Color,

    pub accent: Color,
    pub rose: Color,
    pub lavender: Color,
    pub gold: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(0x1e, 0x1a, 0x24),
            surface: Color::Rgb(0x2a, 0x24, 0x32),
            foreground: Color::Rgb(0xf3, 0xe9, 0xf1),
            muted: Color::Rgb(0x9e, 0x8e, 0xa8),
            accent: Color::Rgb(0xe9, 0x1e, 0x63),
            rose: Color::Rgb(0xf8, 0xb5, 0xc3),
            lavender: Color::Rgb(0xd1, 0xc4, 0xe9),
            gold: Color::Rgb(0xff, 0xd7, 0x00),
        }
    }
}

/// Parse "#RRGGBB", "RRGGBB", "#RGB" or "RGB"
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();

    match hex.len() {
        3 => Some(Color::Rgb(
            channel(&hex[0..1])? * 17,
            channel(&hex[1..2])? * 17,
            channel(&hex[2..3])? * 17,
        )),
        6 => Some(Color::Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

/// Default palette with the configured overrides applied
pub fn load_theme(config: &ThemeConfig) -> Theme {
    let mut theme = Theme::default();

    let overrides = [
        ("background", &config.background, &mut theme.background),
        ("foreground", &config.foreground, &mut theme.foreground),
        ("accent", &config.accent, &mut theme.accent),
        ("muted", &config.muted, &mut theme.muted),
    ];
    for (name, value, slot) in overrides {
        let Some(value) = value else { continue };
        match parse_hex_color(value) {
            Some(color) => *slot = color,
            None => warn!("Invalid color '{}' for theme.{}, keeping default", value, name),
        }
    }
    theme
}

/// Colour of a particle unit; falls back to the accent for bad hex strings
pub fn unit_color(theme: &Theme, hex: &str) -> Color {
    parse_hex_color(hex).unwrap_or(theme.accent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#e91e63"), Some(Color::Rgb(0xe9, 0x1e, 0x63)));
        assert_eq!(parse_hex_color("ffd700"), Some(Color::Rgb(0xff, 0xd7, 0x00)));
        assert_eq!(parse_hex_color("#fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex_color("#ggg"), None);
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_load_theme_overrides() {
        let config = ThemeConfig {
            accent: Some("#00ff00".into()),
            muted: Some("nope".into()),
            ..Default::default()
        };
        let theme = load_theme(&config);
        assert_eq!(theme.accent, Color::Rgb(0, 255, 0));
        assert_eq!(theme.muted, Theme::default().muted);
        assert_eq!(theme.background, Theme::default().background);
    }
}
