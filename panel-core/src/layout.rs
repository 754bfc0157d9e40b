//! Pages and layouts - ordered collections of widgets.

use serde::{Deserialize, Serialize};

use crate::{LayoutError, LayoutResult, PropMap, Widget};

/// Screen orientation of the target device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Wider than tall.
    #[default]
    Landscape,
    /// Taller than wide.
    Portrait,
    /// Landscape rotated by 180 degrees.
    LandscapeInverted,
    /// Portrait rotated by 180 degrees.
    PortraitInverted,
}

/// Layout-wide settings. Opaque to the compiler apart from `dark_mode`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Screen orientation.
    #[serde(default)]
    pub orientation: Orientation,
    /// Resolve `theme_auto` colors for a dark background.
    #[serde(default)]
    pub dark_mode: bool,
    /// Settings owned by other collaborators, kept verbatim.
    #[serde(flatten)]
    pub extra: PropMap,
}

/// An ordered sequence of widgets. Later widgets paint over earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page identifier (`page_N`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Refresh interval in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_s: Option<u32>,
    /// Widgets in paint order.
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

impl Page {
    /// Create an empty page for the given index.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            id: format!("page_{index}"),
            name: format!("Page {}", index.saturating_add(1)),
            refresh_s: None,
            widgets: Vec::new(),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a widget on top of the existing ones.
    ///
    /// # Errors
    ///
    /// Returns an error if a widget with the same ID is already on the page.
    pub fn add_widget(&mut self, widget: Widget) -> LayoutResult<()> {
        if self.widget(&widget.id).is_some() {
            return Err(LayoutError::DuplicateWidget(widget.id));
        }
        self.widgets.push(widget);
        Ok(())
    }

    /// Remove a widget from the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget is not found.
    pub fn remove_widget(&mut self, id: &str) -> LayoutResult<Widget> {
        let index = self
            .widgets
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| LayoutError::WidgetNotFound(id.to_string()))?;
        Ok(self.widgets.remove(index))
    }

    /// Get a widget by ID.
    #[must_use]
    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    /// Get a mutable reference to a widget by ID.
    pub fn widget_mut(&mut self, id: &str) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    /// Check if the page has no widgets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

/// A complete multi-page layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Layout-wide settings.
    #[serde(default)]
    pub settings: LayoutSettings,
    /// Pages in display order.
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Layout {
    /// Create a layout with a single empty page.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: LayoutSettings::default(),
            pages: vec![Page::new(0)],
        }
    }

    /// Set the dark-mode flag.
    #[must_use]
    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        self.settings.dark_mode = dark_mode;
        self
    }

    /// Get a page by index.
    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Get a mutable page by index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn page_mut(&mut self, index: usize) -> LayoutResult<&mut Page> {
        self.pages
            .get_mut(index)
            .ok_or(LayoutError::PageNotFound(index))
    }

    /// Iterate over every widget of every page in paint order.
    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.pages.iter().flat_map(|p| p.widgets.iter())
    }

    /// Total number of widgets across all pages.
    #[must_use]
    pub fn widget_count(&self) -> usize {
        self.pages.iter().map(|p| p.widgets.len()).sum()
    }

    /// Serialize the layout to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> LayoutResult<String> {
        serde_json::to_string_pretty(self).map_err(LayoutError::Serialization)
    }

    /// Deserialize a layout from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> LayoutResult<Self> {
        serde_json::from_str(json).map_err(LayoutError::Serialization)
    }
}
