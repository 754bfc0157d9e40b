//! Rectangle shape.

use panel_core::{effective_color, format_opacity, ColorRole, Widget};
use serde::{Deserialize, Serialize};

use super::{color_const, decode, gui_color, literal_color};
use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::plugin::{Capability, PluginDescriptor, RenderHint, WidgetPlugin};
use crate::targets::procedural::ProceduralBlock;
use crate::targets::{DrawInstruction, RetainedNode};
use crate::{DeclarativeFlavor, Target};

/// Properties of a `shape_rect` widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeRectProps {
    /// Whether the interior is painted.
    pub fill: bool,
    /// Outline width in pixels; 0 draws no outline.
    pub border_width: u32,
    /// Base color for fill and outline.
    pub color: String,
    /// Fill color override.
    pub bg_color: String,
    /// Outline color override.
    pub border_color: String,
    /// Corner radius.
    pub radius: u32,
    /// Opacity (0-255).
    pub opa: u8,
}

impl Default for ShapeRectProps {
    fn default() -> Self {
        Self {
            fill: false,
            border_width: 1,
            color: "theme_auto".to_string(),
            bg_color: String::new(),
            border_color: String::new(),
            radius: 0,
            opa: 255,
        }
    }
}

impl ShapeRectProps {
    pub(crate) fn fill_color(&self) -> &str {
        effective_color(Some(self.bg_color.as_str()), &self.color)
    }

    pub(crate) fn outline_color(&self) -> &str {
        effective_color(Some(self.border_color.as_str()), &self.color)
    }
}

/// Plugin for the `shape_rect` widget.
pub struct ShapeRectPlugin {
    descriptor: PluginDescriptor,
}

impl ShapeRectPlugin {
    /// Create the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new::<ShapeRectProps>(
                "shape_rect",
                "Rectangle",
                "Shapes",
                &Target::ALL,
                &[
                    Capability::RenderHint,
                    Capability::ExportProcedural,
                    Capability::ExportRetainedGui,
                    Capability::ExportDeclarative,
                ],
            ),
        }
    }
}

impl Default for ShapeRectPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetPlugin for ShapeRectPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn marker_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[("border_width", "border")]
    }

    fn render_hint(&self, widget: &Widget, dark_mode: bool) -> ExportResult<RenderHint> {
        let props: ShapeRectProps = decode(widget)?;
        let resolve = |c: &str, role| panel_core::resolve_color(c, role, dark_mode);
        Ok(RenderHint {
            color: resolve(props.outline_color(), ColorRole::Outline),
            fill: if props.fill {
                resolve(props.fill_color(), ColorRole::Fill)
            } else {
                None
            },
            ..RenderHint::default()
        })
    }

    fn export_procedural(
        &self,
        widget: &Widget,
        ctx: &mut ExportContext,
        out: &mut String,
    ) -> ExportResult<()> {
        let props: ShapeRectProps = decode(widget)?;
        let rect = widget.rect();
        let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
        let fill = if props.fill {
            ctx.color_const(props.fill_color(), ColorRole::Fill)
        } else {
            None
        };
        let outline = color_const(ctx, props.outline_color(), ColorRole::Outline);

        let mut block = ProceduralBlock::open(out, widget, &props, self.marker_aliases())?;
        if let Some(fill) = fill {
            block.line(format_args!("it.filled_rectangle({x}, {y}, {w}, {h}, {fill});"));
        }
        match props.border_width {
            0 => {}
            1 => block.line(format_args!("it.rectangle({x}, {y}, {w}, {h}, {outline});")),
            n => block.repeat(
                n,
                format_args!(
                    "it.rectangle({x} + i, {y} + i, {w} - 2 * i, {h} - 2 * i, {outline});"
                ),
            ),
        }
        block.close();
        Ok(())
    }

    fn export_retained(
        &self,
        widget: &Widget,
        ctx: &ExportContext,
    ) -> ExportResult<Vec<RetainedNode>> {
        let props: ShapeRectProps = decode(widget)?;
        let fill = ctx.gui_color(props.fill_color(), ColorRole::Fill);
        let (bg_color, bg_opa) = match fill {
            Some(color) if props.fill => (Some(color), format_opacity(props.opa)),
            _ => (None, format_opacity(0)),
        };
        Ok(vec![RetainedNode::for_widget("obj", widget)
            .with_opt("bg_color", bg_color)
            .with("bg_opa", bg_opa)
            .with("border_width", props.border_width)
            .with("border_color", gui_color(ctx, props.outline_color()))
            .with("radius", props.radius)])
    }

    fn export_declarative(
        &self,
        widget: &Widget,
        flavor: DeclarativeFlavor,
        ctx: &ExportContext,
    ) -> ExportResult<Vec<DrawInstruction>> {
        let props: ShapeRectProps = decode(widget)?;
        let rect = widget.rect();
        let fill = if props.fill {
            ctx.color(props.fill_color(), ColorRole::Fill)
        } else {
            None
        };
        Ok(vec![DrawInstruction::Rectangle {
            x_start: rect.x,
            y_start: rect.y,
            x_end: rect.right(),
            y_end: rect.bottom(),
            fill,
            outline: literal_color(ctx, props.outline_color()),
            width: props.border_width,
            radius: (props.radius > 0).then_some(props.radius),
            visible: (flavor == DeclarativeFlavor::OpenDisplay).then_some(true),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{body, context};
    use super::*;

    fn rect() -> Widget {
        Widget::with_id("r1", "shape_rect").with_geometry(10.0, 20.0, 50.0, 30.0)
    }

    #[test]
    fn test_thick_border_loops() {
        let plugin = ShapeRectPlugin::new();
        let mut ctx = context(Target::Procedural, false);
        let widget = rect().with_prop("border_width", 3).with_prop("fill", true);
        let mut out = String::new();
        plugin.export_procedural(&widget, &mut ctx, &mut out).expect("export");
        assert!(out.lines().next().unwrap_or_default().contains(" border:3 "));
        assert_eq!(
            body(&out),
            vec![
                "it.filled_rectangle(10, 20, 50, 30, color_black);",
                "for (int i = 0; i < 3; i++) {",
                "it.rectangle(10 + i, 20 + i, 50 - 2 * i, 30 - 2 * i, color_black);",
                "}",
            ]
        );
    }

    #[test]
    fn test_transparent_fill_is_skipped() {
        let plugin = ShapeRectPlugin::new();
        let mut ctx = context(Target::Procedural, false);
        let widget = rect()
            .with_prop("fill", true)
            .with_prop("bg_color", "transparent");
        let mut out = String::new();
        plugin.export_procedural(&widget, &mut ctx, &mut out).expect("export");
        assert_eq!(body(&out), vec!["it.rectangle(10, 20, 50, 30, color_black);"]);
    }

    #[test]
    fn test_retained_obj() {
        let plugin = ShapeRectPlugin::new();
        let ctx = context(Target::RetainedGui, true);
        let nodes = plugin.export_retained(&rect(), &ctx).expect("export");
        let node = &nodes[0];
        assert_eq!(node.tag, "obj");
        assert_eq!(node.get("bg_opa").and_then(|v| v.as_str()), Some("TRANSP"));
        assert_eq!(
            node.get("border_color").and_then(|v| v.as_str()),
            Some("0xFFFFFF")
        );
        assert!(node.get("bg_color").is_none());
    }

    #[test]
    fn test_declarative_rectangle() {
        let plugin = ShapeRectPlugin::new();
        let ctx = context(Target::DeclarativeOpenDisplay, false);
        let widget = rect().with_prop("fill", true).with_prop("bg_color", "red");
        let out = plugin
            .export_declarative(&widget, DeclarativeFlavor::OpenDisplay, &ctx)
            .expect("export");
        assert_eq!(
            out,
            vec![DrawInstruction::Rectangle {
                x_start: 10,
                y_start: 20,
                x_end: 60,
                y_end: 50,
                fill: Some("red".into()),
                outline: "black".into(),
                width: 1,
                radius: None,
                visible: Some(true),
            }]
        );
    }
}
