//! Export dispatcher: walks a layout and drives plugins into a target emitter.

use std::collections::BTreeMap;
use std::sync::Arc;

use panel_core::{Layout, Widget};
use serde::Serialize;

use crate::context::{normalize_entity, CompileOptions, ExportContext};
use crate::error::ExportResult;
use crate::plugin::{Capability, PluginRegistry, RenderHint};
use crate::targets::{emitter_for, CompiledOutput};
use crate::Target;

/// A non-fatal problem found while compiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// No plugin is registered for the widget's type.
    UnknownWidgetType {
        /// Page index.
        page: usize,
        /// Widget ID.
        widget: String,
        /// The unregistered type.
        widget_type: String,
    },
    /// A plugin returned an error for one widget.
    PluginFailed {
        /// Page index.
        page: usize,
        /// Widget ID.
        widget: String,
        /// Widget type.
        widget_type: String,
        /// Error message.
        message: String,
    },
    /// A plugin failed to register entity triggers.
    EntityResolutionFailed {
        /// Widget type.
        widget_type: String,
        /// Error message.
        message: String,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownWidgetType {
                page,
                widget,
                widget_type,
            } => write!(f, "page {page}: widget {widget} has unknown type {widget_type}"),
            Self::PluginFailed {
                page,
                widget,
                widget_type,
                message,
            } => write!(f, "page {page}: {widget_type} widget {widget} skipped: {message}"),
            Self::EntityResolutionFailed {
                widget_type,
                message,
            } => write!(f, "{widget_type} entities not resolved: {message}"),
        }
    }
}

/// Result of compiling a layout for one target.
#[derive(Debug, Clone, Serialize)]
pub struct CompileReport {
    /// Target compiled.
    pub target: Target,
    /// The compiled document.
    pub output: CompiledOutput,
    /// Problems found; none of them stopped the compile.
    pub diagnostics: Vec<Diagnostic>,
    /// Widgets that produced output.
    pub widgets_emitted: usize,
}

impl CompileReport {
    /// Check if the compile produced no diagnostics.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Compiles layouts into target outputs.
///
/// Holds no per-compile state, so one compiler can serve many layouts
/// concurrently.
#[derive(Debug, Clone)]
pub struct Compiler {
    registry: Arc<PluginRegistry>,
    options: CompileOptions,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(Arc::new(PluginRegistry::with_builtin()), CompileOptions::default())
    }
}

impl Compiler {
    /// Create a compiler over a plugin registry.
    #[must_use]
    pub fn new(registry: Arc<PluginRegistry>, options: CompileOptions) -> Self {
        Self { registry, options }
    }

    /// The plugin registry.
    #[must_use]
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Shared handle to the plugin registry.
    #[must_use]
    pub fn registry_handle(&self) -> Arc<PluginRegistry> {
        Arc::clone(&self.registry)
    }

    /// Compile options.
    #[must_use]
    pub const fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a layout for one target.
    ///
    /// Never fails: unknown widget types and plugin errors are reported as
    /// diagnostics and the affected widgets are left out.
    #[must_use]
    pub fn compile(&self, layout: &Layout, target: Target) -> CompileReport {
        let mut ctx = ExportContext::new(target, layout.settings.dark_mode, self.options.clone());
        let mut emitter = emitter_for(target);
        let mut diagnostics = Vec::new();
        let mut widgets_emitted = 0;
        let capability = Capability::for_target(target);

        tracing::debug!(
            target_name = %target,
            pages = layout.pages.len(),
            widgets = layout.widget_count(),
            "compiling layout"
        );

        for (index, page) in layout.pages.iter().enumerate() {
            emitter.begin_page(index, page);
            for widget in &page.widgets {
                let Some(plugin) = self.registry.get(&widget.kind) else {
                    tracing::warn!(
                        page = index,
                        widget = %widget.id,
                        widget_type = %widget.kind,
                        "unknown widget type, skipping"
                    );
                    diagnostics.push(Diagnostic::UnknownWidgetType {
                        page: index,
                        widget: widget.id.clone(),
                        widget_type: widget.kind.clone(),
                    });
                    continue;
                };
                let descriptor = plugin.descriptor();
                if !descriptor.supports_target(target) || !descriptor.supports(capability) {
                    tracing::debug!(widget = %widget.id, widget_type = %widget.kind, "not supported by target");
                    continue;
                }

                let checkpoint = ctx.checkpoint();
                let result = if descriptor.supports(Capability::CollectResources) {
                    plugin.collect_resources(widget, &mut ctx)
                } else {
                    Ok(())
                }
                .and_then(|()| emitter.emit_widget(plugin, widget, &mut ctx));

                match result {
                    Ok(()) => widgets_emitted += 1,
                    Err(err) => {
                        ctx.rollback(checkpoint);
                        tracing::warn!(
                            page = index,
                            widget = %widget.id,
                            widget_type = %widget.kind,
                            error = %err,
                            "widget skipped"
                        );
                        diagnostics.push(Diagnostic::PluginFailed {
                            page: index,
                            widget: widget.id.clone(),
                            widget_type: widget.kind.clone(),
                            message: err.to_string(),
                        });
                    }
                }
            }
        }

        self.resolve_entities(layout, &mut ctx, &mut diagnostics);
        if target == Target::Procedural {
            register_condition_entities(layout, &mut ctx);
        }

        let output = emitter.finish(layout, &ctx);
        tracing::info!(
            target_name = %target,
            widgets_emitted,
            diagnostics = diagnostics.len(),
            "compile finished"
        );
        CompileReport {
            target,
            output,
            diagnostics,
            widgets_emitted,
        }
    }

    /// Compile a layout for every target.
    #[must_use]
    pub fn compile_all(&self, layout: &Layout) -> Vec<CompileReport> {
        Target::ALL
            .iter()
            .map(|target| self.compile(layout, *target))
            .collect()
    }

    /// Preview hint for a widget, or `None` for unknown types and plugins
    /// without hints.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget's properties do not decode.
    pub fn render_hint(&self, widget: &Widget, dark_mode: bool) -> ExportResult<Option<RenderHint>> {
        match self.registry.get(&widget.kind) {
            Some(plugin) if plugin.descriptor().supports(Capability::RenderHint) => {
                plugin.render_hint(widget, dark_mode).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Call `resolve_entities` once per widget type, in order of first
    /// appearance, with every widget of that type.
    fn resolve_entities(
        &self,
        layout: &Layout,
        ctx: &mut ExportContext,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let mut order: Vec<&str> = Vec::new();
        let mut by_type: BTreeMap<&str, Vec<&Widget>> = BTreeMap::new();
        for widget in layout.widgets() {
            let group = by_type.entry(widget.kind.as_str()).or_default();
            if group.is_empty() {
                order.push(widget.kind.as_str());
            }
            group.push(widget);
        }

        for widget_type in order {
            let Some(plugin) = self.registry.get(widget_type) else {
                continue;
            };
            let descriptor = plugin.descriptor();
            if !descriptor.supports(Capability::ResolveEntities)
                || !descriptor.supports_target(ctx.target())
            {
                continue;
            }
            let widgets = by_type.get(widget_type).map_or(&[][..], Vec::as_slice);
            if let Err(err) = plugin.resolve_entities(widgets, ctx) {
                tracing::warn!(widget_type, error = %err, "entity resolution failed");
                diagnostics.push(Diagnostic::EntityResolutionFailed {
                    widget_type: widget_type.to_string(),
                    message: err.to_string(),
                });
            }
        }
    }
}

/// Declare every visibility-condition entity so its guard can read it.
fn register_condition_entities(layout: &Layout, ctx: &mut ExportContext) {
    for widget in layout.widgets() {
        if let Some(entity) = widget.condition.entity().and_then(normalize_entity) {
            ctx.register_refresh(&entity, &widget.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_core::Page;

    fn layout(widgets: Vec<Widget>) -> Layout {
        let mut layout = Layout::new();
        let page = layout.page_mut(0).expect("page");
        for widget in widgets {
            page.add_widget(widget).expect("add");
        }
        layout
    }

    #[test]
    fn test_unknown_type_is_reported() {
        let layout = layout(vec![
            Widget::with_id("a", "gauge"),
            Widget::with_id("b", "text"),
        ]);
        let report = Compiler::default().compile(&layout, Target::DeclarativeOepl);
        assert_eq!(report.widgets_emitted, 1);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::UnknownWidgetType {
                page: 0,
                widget: "a".into(),
                widget_type: "gauge".into(),
            }]
        );
        let doc = report.output.as_declarative().expect("declarative");
        assert_eq!(doc.pages[0].instructions.len(), 1);
    }

    #[test]
    fn test_unsupported_target_is_silent() {
        let layout = layout(vec![Widget::with_id("l", "lvgl_label")]);
        let report = Compiler::default().compile(&layout, Target::Procedural);
        assert!(report.is_clean());
        assert_eq!(report.widgets_emitted, 0);
    }

    #[test]
    fn test_plugin_failure_discards_partial_output() {
        let layout = layout(vec![
            Widget::with_id("c", "chart"),
            Widget::with_id("t", "text").with_prop("text", "kept"),
        ]);
        let report = Compiler::default().compile(&layout, Target::Procedural);
        assert!(matches!(
            &report.diagnostics[..],
            [Diagnostic::PluginFailed { widget, .. }] if widget == "c"
        ));
        let text = report.output.as_procedural().expect("procedural");
        assert!(!text.contains("widget:chart"));
        assert!(text.contains("widget:text id:t"));
    }

    #[test]
    fn test_condition_entities_are_declared() {
        let mut widget = Widget::with_id("t", "text");
        widget.condition.condition_entity = Some("binary_sensor.door".into());
        widget.condition.condition_operator = Some("==".into());
        widget.condition.condition_state = Some("on".into());
        let report = Compiler::default().compile(&layout(vec![widget]), Target::Procedural);
        let text = report.output.as_procedural().expect("procedural");
        assert!(text.contains("binary_sensor:\n  - platform: homeassistant\n    id: binary_sensor_door\n"));
        assert!(text.contains("if (id(binary_sensor_door).state) {"));
    }

    #[test]
    fn test_resolve_runs_per_type_once() {
        let layout = layout(vec![
            Widget::with_id("a", "lvgl_label").with_entity("temp"),
            Widget::with_id("b", "lvgl_label").with_entity("temp"),
        ]);
        let report = Compiler::default().compile(&layout, Target::RetainedGui);
        let doc = report.output.as_retained().expect("retained");
        let sensor = &doc.sensors[0];
        assert_eq!(sensor.entity_id, "sensor.temp");
        assert_eq!(
            sensor.actions,
            vec!["lvgl.widget.refresh: a", "lvgl.widget.refresh: b"]
        );
    }

    #[test]
    fn test_pages_keep_order() {
        let mut layout = layout(vec![Widget::with_id("a", "text")]);
        let mut second = Page::new(1);
        second.name = "Second".into();
        second
            .add_widget(Widget::with_id("b", "shape_rect"))
            .expect("add");
        layout.pages.push(second);
        let report = Compiler::default().compile(&layout, Target::RetainedGui);
        let doc = report.output.as_retained().expect("retained");
        let ids: Vec<_> = doc.pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["page_0", "page_1"]);
    }

    #[test]
    fn test_render_hint_lookup() {
        let compiler = Compiler::default();
        let hint = compiler
            .render_hint(&Widget::with_id("d", "datetime"), false)
            .expect("hint")
            .expect("some");
        assert_eq!(hint.font_size, Some(28));
        assert!(compiler
            .render_hint(&Widget::with_id("x", "gauge"), false)
            .expect("hint")
            .is_none());
    }

    /// Registers a font and a graph, then fails to render.
    struct Brittle {
        descriptor: crate::plugin::PluginDescriptor,
    }

    impl crate::plugin::WidgetPlugin for Brittle {
        fn descriptor(&self) -> &crate::plugin::PluginDescriptor {
            &self.descriptor
        }

        fn collect_resources(&self, widget: &Widget, ctx: &mut ExportContext) -> ExportResult<()> {
            ctx.add_font(panel_core::FontRequest::new("Roboto", 700, 99, false));
            ctx.graphs.add(crate::context::GraphSpec {
                id: format!("graph_{}", widget.id),
                sensor: "sensor_x".into(),
                duration: "1h".into(),
                width: 10,
                height: 10,
                line_thickness: 1,
            });
            Ok(())
        }

        fn export_procedural(
            &self,
            widget: &Widget,
            _ctx: &mut ExportContext,
            _out: &mut String,
        ) -> ExportResult<()> {
            Err(crate::error::ExportError::MissingEntity(widget.id.clone()))
        }
    }

    #[test]
    fn test_failed_widget_leaves_no_resources() {
        let mut registry = PluginRegistry::with_builtin();
        registry.register(Brittle {
            descriptor: crate::plugin::PluginDescriptor::new::<serde_json::Value>(
                "brittle",
                "Brittle",
                "Test",
                &[Target::Procedural],
                &[Capability::CollectResources, Capability::ExportProcedural],
            ),
        });
        let compiler = Compiler::new(Arc::new(registry), CompileOptions::default());
        let layout = layout(vec![
            Widget::with_id("b", "brittle"),
            Widget::with_id("t", "text"),
        ]);
        let report = compiler.compile(&layout, Target::Procedural);
        assert_eq!(report.widgets_emitted, 1);
        assert_eq!(report.diagnostics.len(), 1);
        let text = report.output.as_procedural().expect("procedural");
        assert!(!text.contains("font_roboto_700_99"));
        assert!(!text.contains("graph_b"));
        assert!(!text.contains("graph:"));
        assert!(text.contains("widget:text id:t"));
    }
}
