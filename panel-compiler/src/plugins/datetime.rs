//! Clock and calendar widget.

use panel_core::{
    format_opacity, stack_lines, Alignment, ColorRole, FontRequest, TimeFormat, VAlign, Widget,
};
use serde::{Deserialize, Serialize};

use super::{color_const, decode, gui_color, literal_color, now_template};
use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::plugin::{Capability, PluginDescriptor, RenderHint, WidgetPlugin};
use crate::targets::procedural::{c_string, ProceduralBlock};
use crate::targets::retained::lambda;
use crate::targets::{DrawInstruction, RetainedNode};
use crate::{DeclarativeFlavor, Target};

const LINE_SPACING: i32 = 5;

/// Properties of a `datetime` widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatetimeProps {
    /// Which parts of the date/time to show.
    pub format: TimeFormat,
    /// Size of the time line.
    pub time_font_size: u32,
    /// Size of the date line.
    pub date_font_size: u32,
    /// Text color.
    pub color: String,
    /// Italic style.
    pub italic: bool,
    /// Font family.
    pub font_family: String,
    /// Alignment keyword.
    pub text_align: String,
    /// Opacity (0-255).
    pub opa: u8,
}

impl Default for DatetimeProps {
    fn default() -> Self {
        Self {
            format: TimeFormat::TimeDate,
            time_font_size: 28,
            date_font_size: 16,
            color: "black".to_string(),
            italic: false,
            font_family: "Roboto".to_string(),
            text_align: "CENTER".to_string(),
            opa: 255,
        }
    }
}

impl DatetimeProps {
    fn time_font(&self) -> FontRequest {
        FontRequest::new(&self.font_family, 700, self.time_font_size, self.italic)
    }

    fn date_font(&self) -> FontRequest {
        FontRequest::new(&self.font_family, 400, self.date_font_size, self.italic)
    }

    /// Font of the single line of a one-line format.
    fn single_font(&self) -> FontRequest {
        if self.format.is_date() {
            self.date_font()
        } else {
            self.time_font()
        }
    }

    fn fonts(&self) -> Vec<FontRequest> {
        match self.format {
            TimeFormat::TimeDate => vec![self.time_font(), self.date_font()],
            _ => vec![self.single_font()],
        }
    }
}

/// Plugin for the `datetime` widget.
pub struct DatetimePlugin {
    descriptor: PluginDescriptor,
}

impl DatetimePlugin {
    /// Create the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new::<DatetimeProps>(
                "datetime",
                "Date & Time",
                "Core",
                &Target::ALL,
                &[
                    Capability::RenderHint,
                    Capability::CollectResources,
                    Capability::ExportProcedural,
                    Capability::ExportRetainedGui,
                    Capability::ExportDeclarative,
                ],
            ),
        }
    }
}

impl Default for DatetimePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetPlugin for DatetimePlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn marker_aliases(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("format", "fmt"),
            ("time_font_size", "time_font"),
            ("date_font_size", "date_font"),
            ("text_align", "align"),
        ]
    }

    fn render_hint(&self, widget: &Widget, dark_mode: bool) -> ExportResult<RenderHint> {
        let props: DatetimeProps = decode(widget)?;
        Ok(RenderHint {
            flex: Some(Alignment::parse(&props.text_align).flex()),
            color: panel_core::resolve_color(&props.color, ColorRole::Foreground, dark_mode),
            fill: None,
            font_size: Some(props.time_font_size),
            text: Some(props.format.primary_pattern().to_string()),
        })
    }

    fn collect_resources(&self, widget: &Widget, ctx: &mut ExportContext) -> ExportResult<()> {
        let props: DatetimeProps = decode(widget)?;
        for font in props.fonts() {
            ctx.add_font(font);
        }
        Ok(())
    }

    fn export_procedural(
        &self,
        widget: &Widget,
        ctx: &mut ExportContext,
        out: &mut String,
    ) -> ExportResult<()> {
        let props: DatetimeProps = decode(widget)?;
        let color = color_const(ctx, &props.color, ColorRole::Foreground);
        let rect = widget.rect();
        let align = Alignment::parse(&props.text_align);
        let time_id = ctx.options().time_id.clone();

        let mut block = ProceduralBlock::open(out, widget, &props, self.marker_aliases())?;
        block.open_scope();
        block.line(format_args!("auto now = id({time_id}).now();"));

        if let Some(second) = props.format.secondary_pattern() {
            let time_font = ctx.add_font(props.time_font());
            let date_font = ctx.add_font(props.date_font());
            let size = |s: u32| i32::try_from(s).unwrap_or(i32::MAX);
            let lines = stack_lines(
                rect,
                align.vertical,
                size(props.time_font_size),
                size(props.date_font_size),
            );
            let (x, _) = align.anchor_point(rect);
            let top = align.with_vertical(VAlign::Top).text_align_constant();
            block.line(format_args!(
                "it.strftime({x}, {}, id({time_font}), {color}, {top}, {}, now);",
                lines.first_y,
                c_string(props.format.primary_pattern()),
            ));
            block.line(format_args!(
                "it.strftime({x}, {}, id({date_font}), {color}, {top}, {}, now);",
                lines.second_y,
                c_string(second),
            ));
        } else {
            let font = ctx.add_font(props.single_font());
            let (x, y) = align.anchor_point(rect);
            block.line(format_args!(
                "it.strftime({x}, {y}, id({font}), {color}, {}, {}, now);",
                align.text_align_constant(),
                c_string(props.format.primary_pattern()),
            ));
        }

        block.close_scope();
        block.close();
        Ok(())
    }

    fn export_retained(
        &self,
        widget: &Widget,
        ctx: &ExportContext,
    ) -> ExportResult<Vec<RetainedNode>> {
        let props: DatetimeProps = decode(widget)?;
        let pattern = match props.format.secondary_pattern() {
            Some(second) => format!("{}\\n{second}", props.format.primary_pattern()),
            None => props.format.primary_pattern().to_string(),
        };
        let font = match props.format {
            TimeFormat::TimeDate => props.time_font(),
            _ => props.single_font(),
        };
        let text = lambda(&[
            format!("auto now = id({}).now();", ctx.options().time_id),
            format!("return now.strftime(\"{pattern}\").c_str();"),
        ]);

        Ok(vec![RetainedNode::for_widget("label", widget)
            .with("text", text)
            .with("text_font", font.id())
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
        let props: DatetimeProps = decode(widget)?;
        let rect = widget.rect();
        let align = Alignment::parse(&props.text_align);
        let color = literal_color(ctx, &props.color);
        let wrap = flavor == DeclarativeFlavor::Oepl && rect.width > 0;
        let text = |value: String, x: i32, y: i32, anchor: Alignment, font: FontRequest| {
            DrawInstruction::Text {
                value,
                x,
                y,
                size: font.size,
                color: color.clone(),
                anchor: anchor.anchor_code(),
                font: font.declarative_file().to_string(),
                align: wrap.then(|| anchor.gui_text_align().to_ascii_lowercase()),
                max_width: wrap.then_some(rect.width),
                spacing: wrap.then_some(LINE_SPACING),
            }
        };

        let Some(second) = props.format.secondary_pattern() else {
            let (x, y) = align.anchor_point(rect);
            return Ok(vec![text(
                now_template(props.format.primary_pattern()),
                x,
                y,
                align,
                props.single_font(),
            )]);
        };

        let time_font = props.time_font();
        let date_font = props.date_font();
        let size = |s: u32| i32::try_from(s).unwrap_or(i32::MAX);
        let lines = stack_lines(
            rect,
            align.vertical,
            size(time_font.size),
            size(date_font.size),
        );
        let (x, _) = align.anchor_point(rect);
        let top = align.with_vertical(VAlign::Top);
        Ok(vec![
            text(
                now_template(props.format.primary_pattern()),
                x,
                lines.first_y,
                top,
                time_font,
            ),
            text(now_template(second), x, lines.second_y, top, date_font),
        ])
    }
}
