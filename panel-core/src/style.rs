//! Theme colors, opacity, font requests and time formats.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Color sentinel resolved from the layout's dark-mode flag.
pub const THEME_AUTO: &str = "theme_auto";

/// Color sentinel meaning "paint nothing".
pub const TRANSPARENT: &str = "transparent";

/// Font family used when a request names none.
pub const DEFAULT_FONT_FAMILY: &str = "Roboto";

/// What a color is used for. Decides how `transparent` resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    /// Area fill. `transparent` means no fill.
    Fill,
    /// Shape outline. A transparent outline is invisible, so it falls back to
    /// the theme default.
    Outline,
    /// Text or line foreground. Falls back like an outline.
    Foreground,
}

/// The foreground color for the current theme.
#[must_use]
pub const fn theme_default(dark_mode: bool) -> &'static str {
    if dark_mode {
        "white"
    } else {
        "black"
    }
}

/// Resolve a color property to a literal color.
///
/// Returns `None` only for a transparent fill.
#[must_use]
pub fn resolve_color(value: &str, role: ColorRole, dark_mode: bool) -> Option<String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case(TRANSPARENT) {
        return match role {
            ColorRole::Fill => None,
            ColorRole::Outline | ColorRole::Foreground => {
                Some(theme_default(dark_mode).to_string())
            }
        };
    }
    if value.is_empty() || value.eq_ignore_ascii_case(THEME_AUTO) {
        return Some(theme_default(dark_mode).to_string());
    }
    Some(value.to_string())
}

/// Pick the first explicit color, treating `theme_auto` and blanks as unset.
///
/// Used for shapes whose `bg_color`/`border_color` only override `color`
/// when set to a real color.
#[must_use]
pub fn effective_color<'a>(override_color: Option<&'a str>, base: &'a str) -> &'a str {
    override_color
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(THEME_AUTO))
        .unwrap_or(base)
}

/// RGB triple for a literal color name or `#rrggbb` hex string.
#[must_use]
pub fn color_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let color = color.trim();
    if let Some(hex) = color.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some((channel(0)?, channel(2)?, channel(4)?));
    }
    let rgb = match color.to_ascii_lowercase().as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "gray" | "grey" => (128, 128, 128),
        _ => return None,
    };
    Some(rgb)
}

/// Format an 8-bit opacity for the retained GUI (`COVER`, `TRANSP`, `NN%`).
#[must_use]
pub fn format_opacity(opa: u8) -> String {
    match opa {
        255 => "COVER".to_string(),
        0 => "TRANSP".to_string(),
        _ => format!("{}%", (u32::from(opa) * 100 + 127) / 255),
    }
}

/// A normalized font request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FontRequest {
    /// Font family.
    pub family: String,
    /// CSS weight, 100..=900 in steps of 100.
    pub weight: u16,
    /// Size in pixels.
    pub size: u32,
    /// Italic style.
    pub italic: bool,
}

impl FontRequest {
    /// Create a normalized request.
    ///
    /// A blank or `Custom...` family becomes [`DEFAULT_FONT_FAMILY`], the
    /// weight snaps to the nearest hundred within 100..=900 and the size is
    /// at least one pixel.
    #[must_use]
    pub fn new(family: &str, weight: u32, size: u32, italic: bool) -> Self {
        let family = family.trim();
        let family = if family.is_empty() || family.starts_with("Custom") {
            if !family.is_empty() {
                tracing::debug!(family, "custom font family without file, using default");
            }
            DEFAULT_FONT_FAMILY
        } else {
            family
        };
        let snapped = ((weight.clamp(100, 900) + 50) / 100) * 100;
        Self {
            family: family.to_string(),
            weight: u16::try_from(snapped.min(900)).unwrap_or(400),
            size: size.max(1),
            italic,
        }
    }

    /// Stable identifier, e.g. `font_roboto_700_28_italic`.
    #[must_use]
    pub fn id(&self) -> String {
        let family: String = self
            .family
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        let mut id = format!("font_{family}_{}_{}", self.weight, self.size);
        if self.italic {
            id.push_str("_italic");
        }
        id
    }

    /// Font source reference (`gfonts://Roboto@700`).
    #[must_use]
    pub fn source(&self) -> String {
        if self.italic {
            format!("gfonts://{}@{}italic", self.family, self.weight)
        } else {
            format!("gfonts://{}@{}", self.family, self.weight)
        }
    }

    /// Font file used by declarative renderers.
    #[must_use]
    pub fn declarative_file(&self) -> &'static str {
        if self.family.contains("Mono") {
            "mononoki.ttf"
        } else {
            "ppb.ttf"
        }
    }
}

impl fmt::Display for FontRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}px", self.family, self.weight, self.size)?;
        if self.italic {
            write!(f, " italic")?;
        }
        Ok(())
    }
}

/// Date/time display format shared by every target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// `14:05`
    TimeOnly,
    /// `16.10.2026`
    DateOnly,
    /// `Friday 16 October`
    WeekdayDayMonth,
    /// Time above a short date.
    #[default]
    TimeDate,
}

impl TimeFormat {
    /// Pattern of the first (or only) line.
    #[must_use]
    pub const fn primary_pattern(self) -> &'static str {
        match self {
            Self::TimeOnly | Self::TimeDate => "%H:%M",
            Self::DateOnly => "%d.%m.%Y",
            Self::WeekdayDayMonth => "%A %d %B",
        }
    }

    /// Pattern of the second line, for two-line formats.
    #[must_use]
    pub const fn secondary_pattern(self) -> Option<&'static str> {
        match self {
            Self::TimeDate => Some("%a, %b %d"),
            _ => None,
        }
    }

    /// Whether the single line shows a date rather than a time.
    #[must_use]
    pub const fn is_date(self) -> bool {
        matches!(self, Self::DateOnly | Self::WeekdayDayMonth)
    }

    /// Marker/serde name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TimeOnly => "time_only",
            Self::DateOnly => "date_only",
            Self::WeekdayDayMonth => "weekday_day_month",
            Self::TimeDate => "time_date",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_auto_follows_dark_mode() {
        assert_eq!(
            resolve_color(THEME_AUTO, ColorRole::Fill, true).as_deref(),
            Some("white")
        );
        assert_eq!(
            resolve_color(THEME_AUTO, ColorRole::Foreground, false).as_deref(),
            Some("black")
        );
    }

    #[test]
    fn test_transparent_depends_on_role() {
        assert_eq!(resolve_color("transparent", ColorRole::Fill, false), None);
        assert_eq!(
            resolve_color("transparent", ColorRole::Outline, true).as_deref(),
            Some("white")
        );
    }

    #[test]
    fn test_literal_colors_pass_through() {
        assert_eq!(
            resolve_color("#ff0000", ColorRole::Fill, true).as_deref(),
            Some("#ff0000")
        );
        assert_eq!(
            resolve_color("", ColorRole::Outline, false).as_deref(),
            Some("black")
        );
    }

    #[test]
    fn test_effective_color_ignores_theme_override() {
        assert_eq!(effective_color(Some("theme_auto"), "red"), "red");
        assert_eq!(effective_color(Some("blue"), "red"), "blue");
        assert_eq!(effective_color(None, "red"), "red");
    }

    #[test]
    fn test_color_rgb() {
        assert_eq!(color_rgb("Gray"), Some((128, 128, 128)));
        assert_eq!(color_rgb("#0a0B0c"), Some((10, 11, 12)));
        assert_eq!(color_rgb("#12345"), None);
        assert_eq!(color_rgb("chartreuse"), None);
    }

    #[test]
    fn test_format_opacity() {
        assert_eq!(format_opacity(255), "COVER");
        assert_eq!(format_opacity(0), "TRANSP");
        assert_eq!(format_opacity(128), "50%");
    }

    #[test]
    fn test_font_request_normalization() {
        let font = FontRequest::new("  ", 730, 0, true);
        assert_eq!(font.family, "Roboto");
        assert_eq!(font.weight, 700);
        assert_eq!(font.size, 1);
        assert_eq!(font.id(), "font_roboto_700_1_italic");

        let custom = FontRequest::new("Custom...", 50, 20, false);
        assert_eq!(custom.family, "Roboto");
        assert_eq!(custom.weight, 100);

        let heavy = FontRequest::new("Roboto Mono", 2000, 12, false);
        assert_eq!(heavy.weight, 900);
        assert_eq!(heavy.id(), "font_roboto_mono_900_12");
        assert_eq!(heavy.declarative_file(), "mononoki.ttf");
        assert_eq!(heavy.source(), "gfonts://Roboto Mono@900");
    }

    #[test]
    fn test_time_format_patterns() {
        assert_eq!(TimeFormat::TimeOnly.primary_pattern(), "%H:%M");
        assert_eq!(TimeFormat::DateOnly.primary_pattern(), "%d.%m.%Y");
        assert_eq!(TimeFormat::WeekdayDayMonth.primary_pattern(), "%A %d %B");
        assert_eq!(TimeFormat::TimeDate.secondary_pattern(), Some("%a, %b %d"));
        assert_eq!(TimeFormat::TimeOnly.secondary_pattern(), None);
        assert_eq!(TimeFormat::default(), TimeFormat::TimeDate);
    }
}
