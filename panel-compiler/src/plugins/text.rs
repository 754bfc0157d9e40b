//! Static or entity-bound text.

use panel_core::{format_opacity, Alignment, ColorRole, FontRequest, Widget};
use serde::{Deserialize, Serialize};

use super::{
    color_const, decode, gui_color, literal_color, register_widget_entities, EntityRead,
};
use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::plugin::{Capability, PluginDescriptor, RenderHint, WidgetPlugin};
use crate::targets::procedural::{c_string, ProceduralBlock};
use crate::targets::retained::lambda;
use crate::targets::{DrawInstruction, RetainedNode};
use crate::{DeclarativeFlavor, Target};

/// Properties of a `text` widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextProps {
    /// Static text, or the prefix shown before an entity value.
    pub text: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Font family.
    pub font_family: String,
    /// CSS font weight.
    pub font_weight: u32,
    /// Italic style.
    pub italic: bool,
    /// Text color.
    pub color: String,
    /// Alignment keyword.
    pub text_align: String,
    /// Decimal places for numeric entity values.
    pub precision: u8,
    /// Opacity (0-255).
    pub opa: u8,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: "Text".to_string(),
            font_size: 20,
            font_family: "Roboto".to_string(),
            font_weight: 400,
            italic: false,
            color: "theme_auto".to_string(),
            text_align: "TOP_LEFT".to_string(),
            precision: 1,
            opa: 255,
        }
    }
}

impl TextProps {
    fn font(&self) -> FontRequest {
        FontRequest::new(&self.font_family, self.font_weight, self.font_size, self.italic)
    }
}

/// Plugin for the `text` widget.
pub struct TextPlugin {
    descriptor: PluginDescriptor,
}

impl TextPlugin {
    /// Create the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new::<TextProps>(
                "text",
                "Text",
                "Core",
                &Target::ALL,
                &[
                    Capability::RenderHint,
                    Capability::CollectResources,
                    Capability::ExportProcedural,
                    Capability::ExportRetainedGui,
                    Capability::ExportDeclarative,
                    Capability::ResolveEntities,
                ],
            ),
        }
    }
}

impl Default for TextPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetPlugin for TextPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn marker_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[("text_align", "align"), ("font_size", "size")]
    }

    fn render_hint(&self, widget: &Widget, dark_mode: bool) -> ExportResult<RenderHint> {
        let props: TextProps = decode(widget)?;
        let text = match widget.entity() {
            Some(entity) => format!("{}{{{entity}}}", props.text),
            None => props.text.clone(),
        };
        Ok(RenderHint {
            flex: Some(Alignment::parse(&props.text_align).flex()),
            color: panel_core::resolve_color(&props.color, ColorRole::Foreground, dark_mode),
            fill: None,
            font_size: Some(props.font_size),
            text: Some(text),
        })
    }

    fn collect_resources(&self, widget: &Widget, ctx: &mut ExportContext) -> ExportResult<()> {
        let props: TextProps = decode(widget)?;
        ctx.add_font(props.font());
        Ok(())
    }

    fn export_procedural(
        &self,
        widget: &Widget,
        ctx: &mut ExportContext,
        out: &mut String,
    ) -> ExportResult<()> {
        let props: TextProps = decode(widget)?;
        let font = ctx.add_font(props.font());
        let color = color_const(ctx, &props.color, ColorRole::Foreground);
        let align = Alignment::parse(&props.text_align);
        let (x, y) = align.anchor_point(widget.rect());
        let constant = align.text_align_constant();

        let mut block = ProceduralBlock::open(out, widget, &props, self.marker_aliases())?;
        match widget.entity().and_then(EntityRead::new) {
            Some(read) => {
                let (format, arg) = read.printf_args(props.precision);
                let format = c_string(&format!("{}{format}", props.text.replace('%', "%%")));
                block.line(format_args!(
                    "it.printf({x}, {y}, id({font}), {color}, {constant}, {format}, {arg});"
                ));
            }
            None => {
                block.line(format_args!(
                    "it.print({x}, {y}, id({font}), {color}, {constant}, {});",
                    c_string(&props.text)
                ));
            }
        }
        block.close();
        Ok(())
    }

    fn export_retained(
        &self,
        widget: &Widget,
        ctx: &ExportContext,
    ) -> ExportResult<Vec<RetainedNode>> {
        let props: TextProps = decode(widget)?;
        let text = match widget.entity().and_then(EntityRead::new) {
            Some(read) => lambda(&[read.lambda_return(props.precision)]),
            None => props.text.clone().into(),
        };
        Ok(vec![RetainedNode::for_widget("label", widget)
            .with("text", text)
            .with("text_font", props.font().id())
            .with("text_color", gui_color(ctx, &props.color))
            .with(
                "text_align",
                Alignment::parse(&props.text_align).gui_text_align(),
            )
            .with("opa", format_opacity(props.opa))])
    }

    fn export_declarative(
        &self,
        widget: &Widget,
        flavor: DeclarativeFlavor,
        ctx: &ExportContext,
    ) -> ExportResult<Vec<DrawInstruction>> {
        let props: TextProps = decode(widget)?;
        let rect = widget.rect();
        let align = Alignment::parse(&props.text_align);
        let (x, y) = align.anchor_point(rect);
        let value = match widget.entity().and_then(EntityRead::new) {
            Some(read) => format!("{}{}", props.text, read.template()),
            None => props.text.clone(),
        };
        let wrap = flavor == DeclarativeFlavor::Oepl && rect.width > 0;
        let font = props.font();
        Ok(vec![DrawInstruction::Text {
            value,
            x,
            y,
            size: font.size,
            color: literal_color(ctx, &props.color),
            anchor: align.anchor_code(),
            font: font.declarative_file().to_string(),
            align: wrap.then(|| align.gui_text_align().to_ascii_lowercase()),
            max_width: wrap.then_some(rect.width),
            spacing: None,
        }])
    }

    fn resolve_entities(&self, widgets: &[&Widget], ctx: &mut ExportContext) -> ExportResult<()> {
        register_widget_entities(widgets, ctx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{body, context};
    use super::*;

    #[test]
    fn test_static_text() {
        let plugin = TextPlugin::new();
        let mut ctx = context(Target::Procedural, true);
        let widget = Widget::with_id("t1", "text")
            .with_geometry(5.0, 5.0, 100.0, 20.0)
            .with_prop("text", "Hello \"you\"");
        let mut out = String::new();
        plugin.export_procedural(&widget, &mut ctx, &mut out).expect("export");
        assert!(out.lines().next().unwrap_or_default().contains("text:\"Hello \\\"you\\\"\""));
        assert_eq!(
            body(&out),
            vec![
                "it.print(5, 5, id(font_roboto_400_20), color_white, TextAlign::TOP_LEFT, \"Hello \\\"you\\\"\");"
            ]
        );
    }

    #[test]
    fn test_entity_text_uses_printf() {
        let plugin = TextPlugin::new();
        let mut ctx = context(Target::Procedural, false);
        let widget = Widget::with_id("t1", "text")
            .with_entity("sensor.temp")
            .with_prop("text", "Temp: ")
            .with_prop("precision", 0);
        let mut out = String::new();
        plugin.export_procedural(&widget, &mut ctx, &mut out).expect("export");
        assert!(body(&out)[0].ends_with("\"Temp: %.0f\", id(sensor_temp).state);"));
    }

    #[test]
    fn test_entity_text_everywhere() {
        let plugin = TextPlugin::new();
        let widget = Widget::with_id("t1", "text")
            .with_entity("text_sensor.status")
            .with_prop("text", "");

        let ctx = context(Target::RetainedGui, false);
        let nodes = plugin.export_retained(&widget, &ctx).expect("export");
        let text = nodes[0].get("text").and_then(|v| v.as_str()).expect("text");
        assert!(text.ends_with("return id(text_sensor_status).state.c_str();"));

        let out = plugin
            .export_declarative(&widget, DeclarativeFlavor::OpenDisplay, &ctx)
            .expect("export");
        match &out[..] {
            [DrawInstruction::Text { value, .. }] => {
                assert_eq!(value, "{{ states('text_sensor.status') }}");
            }
            other => panic!("unexpected instructions: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_entities_registers_refresh() {
        let plugin = TextPlugin::new();
        let mut ctx = context(Target::RetainedGui, false);
        let widget = Widget::with_id("t1", "text").with_entity("temp");
        plugin.resolve_entities(&[&widget], &mut ctx).expect("resolve");
        let actions = ctx.triggers.numeric().get("sensor.temp").expect("entity");
        assert!(actions.contains("lvgl.widget.refresh: t1"));
    }
}
