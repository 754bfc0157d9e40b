//! Widget plugins and the plugin registry.
//!
//! ## Capabilities
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              WidgetPlugin trait              │
//! ├───────────────┬──────────────┬───────────────┤
//! │ collect       │ export_*     │ resolve       │
//! │ resources     │ (per target) │ entities      │
//! └───────────────┴──────────────┴───────────────┘
//! ```
//!
//! Every method has a no-op default. A plugin lists what it implements in
//! [`PluginDescriptor::capabilities`] and the dispatcher only calls methods
//! for listed capabilities.

use std::collections::BTreeMap;
use std::sync::Arc;

use panel_core::{FlexAnchor, PropMap, Widget};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::targets::{DrawInstruction, RetainedNode};
use crate::{plugins, DeclarativeFlavor, Target};

/// Something a plugin can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Provide a preview hint for the editing surface.
    RenderHint,
    /// Emit procedural drawing statements.
    ExportProcedural,
    /// Emit retained GUI nodes.
    ExportRetainedGui,
    /// Emit declarative draw instructions.
    ExportDeclarative,
    /// Register fonts and components before emission.
    CollectResources,
    /// Register entity refresh triggers after emission.
    ResolveEntities,
}

impl Capability {
    /// The export capability that serves a target.
    #[must_use]
    pub const fn for_target(target: Target) -> Self {
        match target {
            Target::Procedural => Self::ExportProcedural,
            Target::RetainedGui => Self::ExportRetainedGui,
            Target::DeclarativeOepl | Target::DeclarativeOpenDisplay => Self::ExportDeclarative,
        }
    }
}

/// Immutable description of a widget type.
#[derive(Debug, Clone, Serialize)]
pub struct PluginDescriptor {
    /// Widget type key.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Palette category.
    pub category: &'static str,
    /// Targets this type can be compiled to.
    pub supported_modes: &'static [Target],
    /// Implemented capabilities.
    pub capabilities: &'static [Capability],
    /// Default properties, the serialized typed defaults.
    pub defaults: PropMap,
}

impl PluginDescriptor {
    /// Build a descriptor whose defaults are `P::default()`.
    #[must_use]
    pub fn new<P>(
        id: &'static str,
        name: &'static str,
        category: &'static str,
        supported_modes: &'static [Target],
        capabilities: &'static [Capability],
    ) -> Self
    where
        P: Serialize + Default,
    {
        let defaults = match serde_json::to_value(P::default()) {
            Ok(Value::Object(map)) => map,
            _ => PropMap::new(),
        };
        Self {
            id,
            name,
            category,
            supported_modes,
            capabilities,
            defaults,
        }
    }

    /// Check whether a capability is implemented.
    #[must_use]
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Check whether the type compiles to `target`.
    #[must_use]
    pub fn supports_target(&self, target: Target) -> bool {
        self.supported_modes.contains(&target)
    }

    /// The widget's property bag overlaid on the defaults.
    #[must_use]
    pub fn merged_props(&self, widget: &Widget) -> PropMap {
        let mut merged = self.defaults.clone();
        for (key, value) in &widget.props {
            if !value.is_null() {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}

/// Preview hint for an editing surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderHint {
    /// Content anchor as flex axis alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex: Option<FlexAnchor>,
    /// Resolved foreground color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Resolved fill color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Primary font size in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    /// Placeholder text to display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A widget type's behavior across all targets.
pub trait WidgetPlugin: Send + Sync {
    /// Descriptor for this widget type.
    fn descriptor(&self) -> &PluginDescriptor;

    /// Short marker key names as `(property, marker key)` pairs.
    ///
    /// Used by both the marker encoder and the reparser.
    fn marker_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Preview hint for the editing surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget's properties do not decode.
    fn render_hint(&self, _widget: &Widget, _dark_mode: bool) -> ExportResult<RenderHint> {
        Ok(RenderHint::default())
    }

    /// Register fonts and components the widget needs.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget's properties do not decode.
    fn collect_resources(&self, _widget: &Widget, _ctx: &mut ExportContext) -> ExportResult<()> {
        Ok(())
    }

    /// Write one marker line followed by the drawing statements.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget cannot be rendered. Anything already
    /// written to `out` is discarded by the caller.
    fn export_procedural(
        &self,
        _widget: &Widget,
        _ctx: &mut ExportContext,
        _out: &mut String,
    ) -> ExportResult<()> {
        Ok(())
    }

    /// Build retained GUI nodes for the widget.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget cannot be rendered.
    fn export_retained(
        &self,
        _widget: &Widget,
        _ctx: &ExportContext,
    ) -> ExportResult<Vec<RetainedNode>> {
        Ok(Vec::new())
    }

    /// Build declarative draw instructions for the widget.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget cannot be rendered.
    fn export_declarative(
        &self,
        _widget: &Widget,
        _flavor: DeclarativeFlavor,
        _ctx: &ExportContext,
    ) -> ExportResult<Vec<DrawInstruction>> {
        Ok(Vec::new())
    }

    /// Register refresh triggers for every widget of this type in the layout.
    ///
    /// # Errors
    ///
    /// Returns an error if a widget's properties do not decode.
    fn resolve_entities(&self, _widgets: &[&Widget], _ctx: &mut ExportContext) -> ExportResult<()> {
        Ok(())
    }
}

/// Registry of widget plugins keyed by widget type.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<&'static str, Arc<dyn WidgetPlugin>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in plugin.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(plugins::DatetimePlugin::new());
        registry.register(plugins::TextPlugin::new());
        registry.register(plugins::ShapeRectPlugin::new());
        registry.register(plugins::ShapeCirclePlugin::new());
        registry.register(plugins::LinePlugin::new());
        registry.register(plugins::ChartPlugin::new());
        registry.register(plugins::LvglLabelPlugin::new());
        registry.register(plugins::LvglImgPlugin::new());
        registry.register(plugins::OdpEllipsePlugin::new());
        registry
    }

    /// Register a plugin, replacing any plugin with the same type key.
    pub fn register(&mut self, plugin: impl WidgetPlugin + 'static) {
        let id = plugin.descriptor().id;
        if self.plugins.insert(id, Arc::new(plugin)).is_some() {
            tracing::warn!(widget_type = id, "replaced existing plugin");
        } else {
            tracing::debug!(widget_type = id, "registered plugin");
        }
    }

    /// Look up a plugin by widget type.
    #[must_use]
    pub fn get(&self, widget_type: &str) -> Option<&dyn WidgetPlugin> {
        self.plugins.get(widget_type).map(AsRef::as_ref)
    }

    /// Registered widget types in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.plugins.keys().copied()
    }

    /// Descriptors in widget type order.
    pub fn descriptors(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.plugins.values().map(|p| p.descriptor())
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Serialize for PluginRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.descriptors())
    }
}
