//! Circle shape inscribed in the widget box.

use panel_core::{effective_color, format_opacity, ColorRole, Widget};
use serde::{Deserialize, Serialize};

use super::{color_const, decode, gui_color, literal_color};
use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::plugin::{Capability, PluginDescriptor, RenderHint, WidgetPlugin};
use crate::targets::procedural::ProceduralBlock;
use crate::targets::{DrawInstruction, RetainedNode};
use crate::{DeclarativeFlavor, Target};

/// Properties of a `shape_circle` widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeCircleProps {
    /// Whether the interior is painted.
    pub fill: bool,
    /// Outline width in pixels.
    pub border_width: u32,
    /// Base color for fill and outline.
    pub color: String,
    /// Fill color override.
    pub bg_color: String,
    /// Outline color override.
    pub border_color: String,
    /// Opacity (0-255).
    pub opa: u8,
}

impl Default for ShapeCircleProps {
    fn default() -> Self {
        Self {
            fill: false,
            border_width: 1,
            color: "theme_auto".to_string(),
            bg_color: String::new(),
            border_color: String::new(),
            opa: 255,
        }
    }
}

impl ShapeCircleProps {
    fn fill_color(&self) -> &str {
        effective_color(Some(self.bg_color.as_str()), &self.color)
    }

    fn outline_color(&self) -> &str {
        effective_color(Some(self.border_color.as_str()), &self.color)
    }
}

/// Plugin for the `shape_circle` widget.
pub struct ShapeCirclePlugin {
    descriptor: PluginDescriptor,
}

impl ShapeCirclePlugin {
    /// Create the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new::<ShapeCircleProps>(
                "shape_circle",
                "Circle",
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

impl Default for ShapeCirclePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetPlugin for ShapeCirclePlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn marker_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[("border_width", "border")]
    }

    fn render_hint(&self, widget: &Widget, dark_mode: bool) -> ExportResult<RenderHint> {
        let props: ShapeCircleProps = decode(widget)?;
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
        let props: ShapeCircleProps = decode(widget)?;
        let rect = widget.rect();
        let (cx, cy) = rect.center();
        let r = rect.inner_radius();
        let fill = if props.fill {
            ctx.color_const(props.fill_color(), ColorRole::Fill)
        } else {
            None
        };
        let outline = color_const(ctx, props.outline_color(), ColorRole::Outline);

        let mut block = ProceduralBlock::open(out, widget, &props, self.marker_aliases())?;
        if let Some(fill) = fill {
            block.line(format_args!("it.filled_circle({cx}, {cy}, {r}, {fill});"));
        }
        match props.border_width {
            0 => {}
            1 => block.line(format_args!("it.circle({cx}, {cy}, {r}, {outline});")),
            n => block.repeat(n, format_args!("it.circle({cx}, {cy}, {r} - i, {outline});")),
        }
        block.close();
        Ok(())
    }

    fn export_retained(
        &self,
        widget: &Widget,
        ctx: &ExportContext,
    ) -> ExportResult<Vec<RetainedNode>> {
        let props: ShapeCircleProps = decode(widget)?;
        let fill = ctx.gui_color(props.fill_color(), ColorRole::Fill);
        let (bg_color, bg_opa) = match fill {
            Some(color) if props.fill => (Some(color), format_opacity(props.opa)),
            _ => (None, format_opacity(0)),
        };
        let diameter = rect_diameter(widget);
        Ok(vec![RetainedNode::for_widget("obj", widget)
            .with("width", diameter)
            .with("height", diameter)
            .with("radius", "LV_RADIUS_CIRCLE")
            .with_opt("bg_color", bg_color)
            .with("bg_opa", bg_opa)
            .with("border_width", props.border_width)
            .with("border_color", gui_color(ctx, props.outline_color()))])
    }

    fn export_declarative(
        &self,
        widget: &Widget,
        _flavor: DeclarativeFlavor,
        ctx: &ExportContext,
    ) -> ExportResult<Vec<DrawInstruction>> {
        let props: ShapeCircleProps = decode(widget)?;
        let rect = widget.rect();
        let (x, y) = rect.center();
        let fill = if props.fill {
            ctx.color(props.fill_color(), ColorRole::Fill)
        } else {
            None
        };
        Ok(vec![DrawInstruction::Circle {
            x,
            y,
            radius: rect.inner_radius(),
            fill,
            outline: literal_color(ctx, props.outline_color()),
            width: props.border_width.max(1),
        }])
    }
}

fn rect_diameter(widget: &Widget) -> i32 {
    widget.rect().inner_radius() * 2
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{body, context};
    use super::*;

    fn circle() -> Widget {
        Widget::with_id("c1", "shape_circle")
            .with_geometry(20.0, 20.0, 60.0, 60.0)
            .with_prop("fill", true)
            .with_prop("color", "theme_auto")
    }

    #[test]
    fn test_filled_circle_dark_mode_declarative() {
        let plugin = ShapeCirclePlugin::new();
        for flavor in [DeclarativeFlavor::Oepl, DeclarativeFlavor::OpenDisplay] {
            let ctx = context(flavor.target(), true);
            let out = plugin
                .export_declarative(&circle(), flavor, &ctx)
                .expect("export");
            assert_eq!(
                out,
                vec![DrawInstruction::Circle {
                    x: 50,
                    y: 50,
                    radius: 30,
                    fill: Some("white".into()),
                    outline: "white".into(),
                    width: 1,
                }]
            );
        }
    }

    #[test]
    fn test_procedural_fill_and_border() {
        let plugin = ShapeCirclePlugin::new();
        let mut ctx = context(Target::Procedural, false);
        let widget = circle().with_prop("border_width", 2);
        let mut out = String::new();
        plugin.export_procedural(&widget, &mut ctx, &mut out).expect("export");
        let marker = out.lines().next().unwrap_or_default();
        assert!(marker.contains("x:20 y:20 w:60 h:60"));
        assert_eq!(
            body(&out),
            vec![
                "it.filled_circle(50, 50, 30, color_black);",
                "for (int i = 0; i < 2; i++) {",
                "it.circle(50, 50, 30 - i, color_black);",
                "}",
            ]
        );
    }

    #[test]
    fn test_retained_circle() {
        let plugin = ShapeCirclePlugin::new();
        let ctx = context(Target::RetainedGui, false);
        let widget = circle().with_geometry(0.0, 0.0, 40.0, 30.0);
        let nodes = plugin.export_retained(&widget, &ctx).expect("export");
        let node = &nodes[0];
        assert_eq!(node.get("width").and_then(|v| v.as_i64()), Some(30));
        assert_eq!(node.get("bg_color").and_then(|v| v.as_str()), Some("0x000000"));
        assert_eq!(node.get("bg_opa").and_then(|v| v.as_str()), Some("COVER"));
    }
}
