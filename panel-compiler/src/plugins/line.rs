//! Horizontal or vertical line spanning the widget box.

use panel_core::{ColorRole, Rect, Widget};
use serde::{Deserialize, Serialize};

use super::{color_const, decode, gui_color, literal_color};
use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::plugin::{Capability, PluginDescriptor, RenderHint, WidgetPlugin};
use crate::targets::procedural::ProceduralBlock;
use crate::targets::{DrawInstruction, RetainedNode};
use crate::{DeclarativeFlavor, Target};

/// Direction of a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineOrientation {
    /// Left to right along the top edge.
    #[default]
    Horizontal,
    /// Top to bottom along the left edge.
    Vertical,
}

/// Properties of a `line` widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineProps {
    /// Stroke thickness in pixels.
    pub stroke_width: u32,
    /// Stroke color.
    pub color: String,
    /// Direction.
    pub orientation: LineOrientation,
}

impl Default for LineProps {
    fn default() -> Self {
        Self {
            stroke_width: 3,
            color: "theme_auto".to_string(),
            orientation: LineOrientation::Horizontal,
        }
    }
}

impl LineProps {
    /// Start and end points of the stroke's center line.
    fn endpoints(&self, rect: Rect) -> ((i32, i32), (i32, i32)) {
        let half = i32::try_from(self.stroke_width / 2).unwrap_or(0);
        match self.orientation {
            LineOrientation::Horizontal => {
                let y = rect.y + half;
                ((rect.x, y), (rect.right(), y))
            }
            LineOrientation::Vertical => {
                let x = rect.x + half;
                ((x, rect.y), (x, rect.bottom()))
            }
        }
    }
}

/// Plugin for the `line` widget.
pub struct LinePlugin {
    descriptor: PluginDescriptor,
}

impl LinePlugin {
    /// Create the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new::<LineProps>(
                "line",
                "Line",
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

impl Default for LinePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetPlugin for LinePlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn marker_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[("stroke_width", "stroke")]
    }

    fn render_hint(&self, widget: &Widget, dark_mode: bool) -> ExportResult<RenderHint> {
        let props: LineProps = decode(widget)?;
        Ok(RenderHint {
            color: panel_core::resolve_color(&props.color, ColorRole::Foreground, dark_mode),
            ..RenderHint::default()
        })
    }

    fn export_procedural(
        &self,
        widget: &Widget,
        ctx: &mut ExportContext,
        out: &mut String,
    ) -> ExportResult<()> {
        let props: LineProps = decode(widget)?;
        let rect = widget.rect();
        let (x, y) = (rect.x, rect.y);
        let color = color_const(ctx, &props.color, ColorRole::Foreground);
        let stroke = props.stroke_width.max(1);

        let mut block = ProceduralBlock::open(out, widget, &props, self.marker_aliases())?;
        match (props.orientation, stroke) {
            (LineOrientation::Horizontal, 1) => {
                block.line(format_args!("it.line({x}, {y}, {}, {y}, {color});", rect.right()));
            }
            (LineOrientation::Vertical, 1) => {
                block.line(format_args!("it.line({x}, {y}, {x}, {}, {color});", rect.bottom()));
            }
            (LineOrientation::Horizontal, _) => {
                block.line(format_args!(
                    "it.filled_rectangle({x}, {y}, {}, {stroke}, {color});",
                    rect.width
                ));
            }
            (LineOrientation::Vertical, _) => {
                block.line(format_args!(
                    "it.filled_rectangle({x}, {y}, {stroke}, {}, {color});",
                    rect.height
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
        let props: LineProps = decode(widget)?;
        let rect = widget.rect();
        let end = match props.orientation {
            LineOrientation::Horizontal => format!("{}, 0", rect.width),
            LineOrientation::Vertical => format!("0, {}", rect.height),
        };
        Ok(vec![RetainedNode::new("line")
            .with("id", widget.id.as_str())
            .with("x", rect.x)
            .with("y", rect.y)
            .with("points", vec!["0, 0".to_string(), end])
            .with("line_width", props.stroke_width)
            .with("line_color", gui_color(ctx, &props.color))])
    }

    fn export_declarative(
        &self,
        widget: &Widget,
        _flavor: DeclarativeFlavor,
        ctx: &ExportContext,
    ) -> ExportResult<Vec<DrawInstruction>> {
        let props: LineProps = decode(widget)?;
        let ((x_start, y_start), (x_end, y_end)) = props.endpoints(widget.rect());
        Ok(vec![DrawInstruction::Line {
            x_start,
            y_start,
            x_end,
            y_end,
            fill: literal_color(ctx, &props.color),
            width: props.stroke_width.max(1),
        }])
    }
}
