//! Output targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four output forms a layout compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Target {
    /// Drawing calls inside a firmware display lambda.
    #[serde(rename = "direct")]
    Procedural,
    /// Retained-mode GUI widget tree.
    #[serde(rename = "lvgl")]
    RetainedGui,
    /// OpenEPaperLink JSON draw list.
    #[serde(rename = "oepl")]
    DeclarativeOepl,
    /// OpenDisplay JSON draw list.
    #[serde(rename = "opendisplay")]
    DeclarativeOpenDisplay,
}

impl Target {
    /// Every target, in a fixed order.
    pub const ALL: [Self; 4] = [
        Self::Procedural,
        Self::RetainedGui,
        Self::DeclarativeOepl,
        Self::DeclarativeOpenDisplay,
    ];

    /// Short mode name (`direct`, `lvgl`, `oepl`, `opendisplay`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Procedural => "direct",
            Self::RetainedGui => "lvgl",
            Self::DeclarativeOepl => "oepl",
            Self::DeclarativeOpenDisplay => "opendisplay",
        }
    }

    /// The declarative flavor, for the two JSON targets.
    #[must_use]
    pub const fn declarative_flavor(self) -> Option<DeclarativeFlavor> {
        match self {
            Self::DeclarativeOepl => Some(DeclarativeFlavor::Oepl),
            Self::DeclarativeOpenDisplay => Some(DeclarativeFlavor::OpenDisplay),
            Self::Procedural | Self::RetainedGui => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown target name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown target: {0} (expected direct, lvgl, oepl or opendisplay)")]
pub struct ParseTargetError(String);

impl FromStr for Target {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" | "procedural" => Ok(Self::Procedural),
            "lvgl" | "retained" => Ok(Self::RetainedGui),
            "oepl" => Ok(Self::DeclarativeOepl),
            "opendisplay" | "odp" => Ok(Self::DeclarativeOpenDisplay),
            _ => Err(ParseTargetError(s.to_string())),
        }
    }
}

/// Which JSON renderer a declarative draw list is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarativeFlavor {
    /// OpenEPaperLink.
    Oepl,
    /// OpenDisplay.
    OpenDisplay,
}

impl DeclarativeFlavor {
    /// The matching target.
    #[must_use]
    pub const fn target(self) -> Target {
        match self {
            Self::Oepl => Target::DeclarativeOepl,
            Self::OpenDisplay => Target::DeclarativeOpenDisplay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("direct".parse::<Target>(), Ok(Target::Procedural));
        assert_eq!("LVGL".parse::<Target>(), Ok(Target::RetainedGui));
        assert_eq!(" odp ".parse::<Target>(), Ok(Target::DeclarativeOpenDisplay));
        assert!("svg".parse::<Target>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for target in Target::ALL {
            assert_eq!(target.to_string().parse::<Target>(), Ok(target));
        }
    }

    #[test]
    fn test_flavors() {
        assert_eq!(Target::Procedural.declarative_flavor(), None);
        assert_eq!(
            Target::DeclarativeOepl.declarative_flavor().map(DeclarativeFlavor::target),
            Some(Target::DeclarativeOepl)
        );
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Target::RetainedGui).expect("serialize");
        assert_eq!(json, "\"lvgl\"");
    }
}
