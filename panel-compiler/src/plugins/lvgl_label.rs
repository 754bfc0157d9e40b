//! Native retained GUI label.

use panel_core::{format_opacity, Alignment, ColorRole, FontRequest, Widget};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode, gui_color, register_widget_entities, EntityRead};
use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::plugin::{Capability, PluginDescriptor, RenderHint, WidgetPlugin};
use crate::targets::RetainedNode;
use crate::Target;

/// Properties of an `lvgl_label` widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LvglLabelProps {
    /// Static text, replaced by the entity state when one is bound.
    pub text: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Font family.
    pub font_family: String,
    /// Text color.
    pub color: String,
    /// CSS font weight.
    pub font_weight: u32,
    /// Italic style.
    pub italic: bool,
    /// Alignment keyword; only the horizontal part is used.
    pub text_align: String,
    /// Background color.
    pub bg_color: String,
    /// Opacity (0-255).
    pub opa: u8,
    /// Border width.
    pub border_width: u32,
    /// Border color.
    pub border_color: String,
    /// Corner radius.
    pub border_radius: u32,
}

impl Default for LvglLabelProps {
    fn default() -> Self {
        Self {
            text: "Label".to_string(),
            font_size: 20,
            font_family: "Roboto".to_string(),
            color: "black".to_string(),
            font_weight: 400,
            italic: false,
            text_align: "CENTER".to_string(),
            bg_color: "transparent".to_string(),
            opa: 255,
            border_width: 0,
            border_color: "black".to_string(),
            border_radius: 0,
        }
    }
}

impl LvglLabelProps {
    fn font(&self) -> FontRequest {
        FontRequest::new(&self.font_family, self.font_weight, self.font_size, self.italic)
    }
}

/// Plugin for the `lvgl_label` widget.
pub struct LvglLabelPlugin {
    descriptor: PluginDescriptor,
}

impl LvglLabelPlugin {
    /// Create the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new::<LvglLabelProps>(
                "lvgl_label",
                "Label",
                "LVGL",
                &[Target::RetainedGui],
                &[
                    Capability::RenderHint,
                    Capability::CollectResources,
                    Capability::ExportRetainedGui,
                    Capability::ResolveEntities,
                ],
            ),
        }
    }
}

impl Default for LvglLabelPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetPlugin for LvglLabelPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn render_hint(&self, widget: &Widget, dark_mode: bool) -> ExportResult<RenderHint> {
        let props: LvglLabelProps = decode(widget)?;
        let align = Alignment::parse(&props.text_align).with_vertical(panel_core::VAlign::Center);
        Ok(RenderHint {
            flex: Some(align.flex()),
            color: panel_core::resolve_color(&props.color, ColorRole::Foreground, dark_mode),
            fill: panel_core::resolve_color(&props.bg_color, ColorRole::Fill, dark_mode),
            font_size: Some(props.font_size),
            text: Some(props.text),
        })
    }

    fn collect_resources(&self, widget: &Widget, ctx: &mut ExportContext) -> ExportResult<()> {
        let props: LvglLabelProps = decode(widget)?;
        ctx.add_font(props.font());
        Ok(())
    }

    fn export_retained(
        &self,
        widget: &Widget,
        ctx: &ExportContext,
    ) -> ExportResult<Vec<RetainedNode>> {
        let props: LvglLabelProps = decode(widget)?;
        let text = match widget.entity().and_then(EntityRead::new) {
            Some(read) => Value::String(format!("!lambda {:?}", read.lambda_return(1))),
            None => Value::String(props.text.clone()),
        };
        let side = if props.border_width > 0 { "full" } else { "none" };
        Ok(vec![RetainedNode::for_widget("label", widget)
            .with("text", text)
            .with("text_font", props.font().id())
            .with("text_color", gui_color(ctx, &props.color))
            .with(
                "text_align",
                Alignment::parse(&props.text_align).gui_text_align(),
            )
            .with_opt("bg_color", ctx.gui_color(&props.bg_color, ColorRole::Fill))
            .with("opa", format_opacity(props.opa))
            .with("border_width", props.border_width)
            .with("border_color", gui_color(ctx, &props.border_color))
            .with("border_side", side)
            .with("radius", props.border_radius)])
    }

    fn resolve_entities(&self, widgets: &[&Widget], ctx: &mut ExportContext) -> ExportResult<()> {
        register_widget_entities(widgets, ctx);
        Ok(())
    }
}
