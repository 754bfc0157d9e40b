//! Per-compile shared state.
//!
//! A fresh [`ExportContext`] is created for every [`Compiler::compile`]
//! call, so tables never leak between compiles and two compiles can run on
//! different threads.
//!
//! [`Compiler::compile`]: crate::Compiler::compile

use std::collections::{BTreeMap, BTreeSet};

use panel_core::{color_rgb, resolve_color, ColorRole, FontRequest};
use serde::{Deserialize, Serialize};

use crate::Target;

/// Compile-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Component ID of the display that owns the drawing lambda.
    pub display_id: String,
    /// Display platform written into the procedural `display:` section.
    pub display_platform: String,
    /// Component ID of the time source used by date/time widgets.
    pub time_id: String,
    /// Global holding the current page index.
    pub page_global: String,
    /// Refresh interval for pages without their own.
    pub default_refresh_s: u32,
    /// Emit `sensor:`/`text_sensor:` declarations for referenced entities.
    pub emit_sensors: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            display_id: "epaper_display".to_string(),
            display_platform: "waveshare_epaper".to_string(),
            time_id: "ha_time".to_string(),
            page_global: "display_page".to_string(),
            default_refresh_s: 60,
            emit_sensors: true,
        }
    }
}

/// Trim an entity reference and give bare names the `sensor.` domain.
#[must_use]
pub fn normalize_entity(entity: &str) -> Option<String> {
    let entity = entity.trim();
    if entity.is_empty() {
        None
    } else if entity.contains('.') {
        Some(entity.to_string())
    } else {
        Some(format!("sensor.{entity}"))
    }
}

/// Whether an entity carries text rather than a number.
#[must_use]
pub fn is_text_entity(entity: &str) -> bool {
    entity.starts_with("text_sensor.") || entity.starts_with("weather.")
}

/// Firmware component ID for an entity (`sensor.living_temp` -> `sensor_living_temp`).
#[must_use]
pub fn sensor_id(entity: &str) -> String {
    entity
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Fonts requested during one compile, keyed by font ID.
#[derive(Debug, Clone, Default)]
pub struct FontRegistry {
    fonts: BTreeMap<String, FontRequest>,
}

impl FontRegistry {
    /// Register a font and return its ID. Duplicate requests collapse.
    pub fn add(&mut self, request: FontRequest) -> String {
        let id = request.id();
        self.fonts.entry(id.clone()).or_insert(request);
        id
    }

    /// Check whether a font ID is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.fonts.contains_key(id)
    }

    /// Iterate over registered fonts in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FontRequest)> {
        self.fonts.iter().map(|(id, font)| (id.as_str(), font))
    }

    /// Number of distinct fonts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Check if no fonts were requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

/// Named color constants for the procedural target.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    colors: BTreeMap<String, (u8, u8, u8)>,
}

impl ColorTable {
    /// Constant name for a literal color, registering it on first use.
    ///
    /// Colors that cannot be decoded fall back to black.
    pub fn constant(&mut self, color: &str) -> String {
        let (name, rgb) = match color_rgb(color) {
            Some(rgb) => (Self::constant_name(color), rgb),
            None => {
                tracing::warn!(color, "unknown color, using black");
                (Self::constant_name("black"), (0, 0, 0))
            }
        };
        self.colors.entry(name.clone()).or_insert(rgb);
        name
    }

    fn constant_name(color: &str) -> String {
        let slug: String = color
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        format!("color_{slug}")
    }

    /// Iterate over `(name, rgb)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, (u8, u8, u8))> {
        self.colors.iter().map(|(name, rgb)| (name.as_str(), *rgb))
    }

    /// Check if no colors were used.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Entity refresh triggers, partitioned by value kind.
#[derive(Debug, Clone, Default)]
pub struct TriggerRegistry {
    numeric: BTreeMap<String, BTreeSet<String>>,
    text: BTreeMap<String, BTreeSet<String>>,
}

impl TriggerRegistry {
    /// Register `action` to run whenever `entity` changes.
    ///
    /// Blank entities are ignored.
    pub fn register(&mut self, entity: &str, action: impl Into<String>) {
        let Some(entity) = normalize_entity(entity) else {
            return;
        };
        let table = if is_text_entity(&entity) {
            &mut self.text
        } else {
            &mut self.numeric
        };
        table.entry(entity).or_default().insert(action.into());
    }

    /// Register an entity without any action, so it is still declared.
    pub fn declare(&mut self, entity: &str) {
        let Some(entity) = normalize_entity(entity) else {
            return;
        };
        let table = if is_text_entity(&entity) {
            &mut self.text
        } else {
            &mut self.numeric
        };
        table.entry(entity).or_default();
    }

    /// Numeric entities and their actions.
    #[must_use]
    pub fn numeric(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.numeric
    }

    /// Text entities and their actions.
    #[must_use]
    pub fn text(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.text
    }

    /// Check if no entity was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.text.is_empty()
    }
}

/// A history graph component backing a chart widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSpec {
    /// Component ID (`graph_<widget id>`).
    pub id: String,
    /// Sensor component ID feeding the graph.
    pub sensor: String,
    /// History window, e.g. `1h`.
    pub duration: String,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Trace line thickness.
    pub line_thickness: u32,
}

/// Graph components requested during one compile.
#[derive(Debug, Clone, Default)]
pub struct GraphRegistry {
    graphs: BTreeMap<String, GraphSpec>,
}

impl GraphRegistry {
    /// Register a graph and return its ID.
    pub fn add(&mut self, graph: GraphSpec) -> String {
        let id = graph.id.clone();
        self.graphs.insert(id.clone(), graph);
        id
    }

    /// Iterate over graphs in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &GraphSpec> {
        self.graphs.values()
    }

    /// Check if no graphs were requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

/// Saved resource tables, restored when a widget fails part way.
#[derive(Debug, Clone)]
pub struct ResourceCheckpoint {
    fonts: FontRegistry,
    colors: ColorTable,
    triggers: TriggerRegistry,
    graphs: GraphRegistry,
}

/// State shared by all plugins during one compile.
#[derive(Debug, Clone)]
pub struct ExportContext {
    target: Target,
    dark_mode: bool,
    options: CompileOptions,
    /// Font table.
    pub fonts: FontRegistry,
    /// Procedural color constants.
    pub colors: ColorTable,
    /// Entity refresh triggers.
    pub triggers: TriggerRegistry,
    /// Graph components.
    pub graphs: GraphRegistry,
}

impl ExportContext {
    /// Create an empty context for one compile.
    #[must_use]
    pub fn new(target: Target, dark_mode: bool, options: CompileOptions) -> Self {
        Self {
            target,
            dark_mode,
            options,
            fonts: FontRegistry::default(),
            colors: ColorTable::default(),
            triggers: TriggerRegistry::default(),
            graphs: GraphRegistry::default(),
        }
    }

    /// Capture the resource tables before a widget is emitted.
    #[must_use]
    pub fn checkpoint(&self) -> ResourceCheckpoint {
        ResourceCheckpoint {
            fonts: self.fonts.clone(),
            colors: self.colors.clone(),
            triggers: self.triggers.clone(),
            graphs: self.graphs.clone(),
        }
    }

    /// Drop everything registered since `checkpoint` was taken.
    pub fn rollback(&mut self, checkpoint: ResourceCheckpoint) {
        self.fonts = checkpoint.fonts;
        self.colors = checkpoint.colors;
        self.triggers = checkpoint.triggers;
        self.graphs = checkpoint.graphs;
    }

    /// Target being compiled.
    #[must_use]
    pub const fn target(&self) -> Target {
        self.target
    }

    /// Whether `theme_auto` resolves for a dark background.
    #[must_use]
    pub const fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Compile options.
    #[must_use]
    pub const fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Resolve a color property for this compile's theme.
    #[must_use]
    pub fn color(&self, value: &str, role: ColorRole) -> Option<String> {
        resolve_color(value, role, self.dark_mode)
    }

    /// Resolve a color and return its procedural constant name.
    pub fn color_const(&mut self, value: &str, role: ColorRole) -> Option<String> {
        let color = self.color(value, role)?;
        Some(self.colors.constant(&color))
    }

    /// Resolve a color to the retained GUI's `0xRRGGBB` form.
    ///
    /// Colors without a known RGB value pass through unchanged.
    #[must_use]
    pub fn gui_color(&self, value: &str, role: ColorRole) -> Option<String> {
        let color = self.color(value, role)?;
        Some(match color_rgb(&color) {
            Some((r, g, b)) => format!("0x{r:02X}{g:02X}{b:02X}"),
            None => color,
        })
    }

    /// Register a font and return its ID.
    pub fn add_font(&mut self, request: FontRequest) -> String {
        self.fonts.add(request)
    }

    /// Action that refreshes a widget when one of its entities changes.
    ///
    /// Declarative targets are rendered remotely and have no triggers.
    #[must_use]
    pub fn refresh_action(&self, widget_id: &str) -> Option<String> {
        match self.target {
            Target::Procedural => Some(format!("component.update: {}", self.options.display_id)),
            Target::RetainedGui => Some(format!("lvgl.widget.refresh: {widget_id}")),
            Target::DeclarativeOepl | Target::DeclarativeOpenDisplay => None,
        }
    }

    /// Register a refresh trigger for `widget_id` on `entity`.
    pub fn register_refresh(&mut self, entity: &str, widget_id: &str) {
        if let Some(action) = self.refresh_action(widget_id) {
            self.triggers.register(entity, action);
        }
    }
}
