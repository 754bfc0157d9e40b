//! History chart of one numeric entity.

use std::fmt;
use std::str::FromStr;

use panel_core::{ColorRole, FontRequest, Widget};
use serde::{Deserialize, Serialize};

use super::{color_const, decode, gui_color, register_widget_entities, EntityRead};
use crate::context::{ExportContext, GraphSpec};
use crate::error::{ExportError, ExportResult};
use crate::plugin::{Capability, PluginDescriptor, RenderHint, WidgetPlugin};
use crate::targets::procedural::{c_string, ProceduralBlock};
use crate::targets::RetainedNode;
use crate::Target;

const TITLE_FONT_SIZE: u32 = 12;

/// Chart types supported by the retained GUI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartKind {
    /// Line chart.
    #[default]
    Line,
    /// Vertical bar chart.
    Bar,
    /// Scatter plot.
    Scatter,
}

impl ChartKind {
    /// Uppercase name used in output and markers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Line => "LINE",
            Self::Bar => "BAR",
            Self::Scatter => "SCATTER",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(Self::Line),
            "bar" => Ok(Self::Bar),
            "scatter" => Ok(Self::Scatter),
            _ => Err(format!("Unknown chart type: {s}")),
        }
    }
}

/// Properties of a `chart` widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartProps {
    /// Chart type name (`LINE`, `BAR`, `SCATTER`).
    #[serde(rename = "type")]
    pub chart_type: String,
    /// History window, e.g. `1h`.
    pub duration: String,
    /// Series and frame color.
    pub color: String,
    /// Series line thickness.
    pub line_thickness: u32,
    /// Whether a frame is drawn around the chart.
    pub border: bool,
}

impl Default for ChartProps {
    fn default() -> Self {
        Self {
            chart_type: ChartKind::Line.as_str().to_string(),
            duration: "1h".to_string(),
            color: "theme_auto".to_string(),
            line_thickness: 2,
            border: true,
        }
    }
}

impl ChartProps {
    fn kind(&self, widget: &Widget) -> ExportResult<ChartKind> {
        self.chart_type
            .parse()
            .map_err(|message| ExportError::InvalidValue {
                widget: widget.id.clone(),
                field: "type",
                message,
            })
    }
}

fn title_font() -> FontRequest {
    FontRequest::new("Roboto", 400, TITLE_FONT_SIZE, false)
}

fn graph_id(widget: &Widget) -> String {
    format!("graph_{}", crate::context::sensor_id(&widget.id))
}

fn title(widget: &Widget) -> Option<&str> {
    widget
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn entity(widget: &Widget) -> ExportResult<EntityRead> {
    widget
        .entity()
        .and_then(EntityRead::new)
        .ok_or_else(|| ExportError::MissingEntity(widget.id.clone()))
}

/// Plugin for the `chart` widget.
pub struct ChartPlugin {
    descriptor: PluginDescriptor,
}

impl ChartPlugin {
    /// Create the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new::<ChartProps>(
                "chart",
                "Chart",
                "Sensors",
                &[Target::Procedural, Target::RetainedGui],
                &[
                    Capability::RenderHint,
                    Capability::CollectResources,
                    Capability::ExportProcedural,
                    Capability::ExportRetainedGui,
                    Capability::ResolveEntities,
                ],
            ),
        }
    }
}

impl Default for ChartPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetPlugin for ChartPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn render_hint(&self, widget: &Widget, dark_mode: bool) -> ExportResult<RenderHint> {
        let props: ChartProps = decode(widget)?;
        Ok(RenderHint {
            color: panel_core::resolve_color(&props.color, ColorRole::Foreground, dark_mode),
            text: title(widget).map(str::to_string),
            font_size: title(widget).map(|_| TITLE_FONT_SIZE),
            ..RenderHint::default()
        })
    }

    fn collect_resources(&self, widget: &Widget, ctx: &mut ExportContext) -> ExportResult<()> {
        let props: ChartProps = decode(widget)?;
        props.kind(widget)?;
        let read = entity(widget)?;
        if title(widget).is_some() {
            ctx.add_font(title_font());
        }
        if ctx.target() == Target::Procedural {
            let rect = widget.rect();
            ctx.graphs.add(GraphSpec {
                id: graph_id(widget),
                sensor: read.id,
                duration: props.duration,
                width: rect.width,
                height: rect.height,
                line_thickness: props.line_thickness,
            });
        }
        Ok(())
    }

    fn export_procedural(
        &self,
        widget: &Widget,
        ctx: &mut ExportContext,
        out: &mut String,
    ) -> ExportResult<()> {
        let props: ChartProps = decode(widget)?;
        entity(widget)?;
        let rect = widget.rect();
        let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
        let color = color_const(ctx, &props.color, ColorRole::Foreground);
        let font = title(widget).map(|_| ctx.add_font(title_font()));

        let mut block = ProceduralBlock::open(out, widget, &props, self.marker_aliases())?;
        if props.border {
            block.line(format_args!("it.rectangle({x}, {y}, {w}, {h}, {color});"));
        }
        if let (Some(text), Some(font)) = (title(widget), font) {
            block.line(format_args!(
                "it.print({}, {}, id({font}), {color}, TextAlign::TOP_LEFT, {});",
                x + 4,
                y + 2,
                c_string(text)
            ));
        }
        block.line(format_args!(
            "it.graph({x}, {y}, id({}), {color});",
            graph_id(widget)
        ));
        block.close();
        Ok(())
    }

    fn export_retained(
        &self,
        widget: &Widget,
        ctx: &ExportContext,
    ) -> ExportResult<Vec<RetainedNode>> {
        let props: ChartProps = decode(widget)?;
        let kind = props.kind(widget)?;
        entity(widget)?;
        let color = gui_color(ctx, &props.color);
        let series = serde_json::json!([{
            "color": color.clone(),
            "width": props.line_thickness,
        }]);
        Ok(vec![RetainedNode::for_widget("chart", widget)
            .with("type", kind.as_str())
            .with("border_width", u32::from(props.border))
            .with("border_color", color)
            .with("series", series)])
    }

    fn resolve_entities(&self, widgets: &[&Widget], ctx: &mut ExportContext) -> ExportResult<()> {
        register_widget_entities(widgets, ctx);
        Ok(())
    }
}
