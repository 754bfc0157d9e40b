//! Built-in widget plugins.

mod chart;
mod datetime;
mod line;
mod lvgl_img;
mod lvgl_label;
mod odp_ellipse;
mod shape_circle;
mod shape_rect;
mod text;

pub use chart::{ChartKind, ChartPlugin, ChartProps};
pub use datetime::{DatetimePlugin, DatetimeProps};
pub use line::{LineOrientation, LinePlugin, LineProps};
pub use lvgl_img::{LvglImgPlugin, LvglImgProps};
pub use lvgl_label::{LvglLabelPlugin, LvglLabelProps};
pub use odp_ellipse::{OdpEllipsePlugin, OdpEllipseProps};
pub use shape_circle::{ShapeCirclePlugin, ShapeCircleProps};
pub use shape_rect::{ShapeRectPlugin, ShapeRectProps};
pub use text::{TextPlugin, TextProps};

use panel_core::{theme_default, ColorRole, Widget};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::{is_text_entity, normalize_entity, sensor_id, ExportContext};
use crate::error::ExportResult;

/// Decode a widget's typed properties.
pub(crate) fn decode<P>(widget: &Widget) -> ExportResult<P>
where
    P: Serialize + DeserializeOwned + Default,
{
    Ok(widget.props_as::<P>()?)
}

/// Procedural color constant; a missing color falls back to the theme.
pub(crate) fn color_const(ctx: &mut ExportContext, value: &str, role: ColorRole) -> String {
    let fallback = theme_default(ctx.dark_mode());
    ctx.color_const(value, role)
        .unwrap_or_else(|| ctx.colors.constant(fallback))
}

/// Literal color for declarative output, never transparent.
pub(crate) fn literal_color(ctx: &ExportContext, value: &str) -> String {
    ctx.color(value, ColorRole::Outline)
        .unwrap_or_else(|| theme_default(ctx.dark_mode()).to_string())
}

/// Retained GUI color, never transparent.
pub(crate) fn gui_color(ctx: &ExportContext, value: &str) -> String {
    ctx.gui_color(value, ColorRole::Outline)
        .unwrap_or_else(|| theme_default(ctx.dark_mode()).to_string())
}

/// Declarative template for a strftime pattern.
pub(crate) fn now_template(pattern: &str) -> String {
    format!("{{{{ now().strftime('{pattern}') }}}}")
}

/// How an entity's current state is read in firmware code.
pub(crate) struct EntityRead {
    /// Normalized entity reference.
    pub entity: String,
    /// Component ID.
    pub id: String,
    /// Whether the state is a string.
    pub text: bool,
}

impl EntityRead {
    pub(crate) fn new(raw: &str) -> Option<Self> {
        let entity = normalize_entity(raw)?;
        Some(Self {
            id: sensor_id(&entity),
            text: is_text_entity(&entity),
            entity,
        })
    }

    /// `printf`-style format and argument for the procedural target.
    pub(crate) fn printf_args(&self, precision: u8) -> (String, String) {
        if self.text {
            ("%s".to_string(), format!("id({}).state.c_str()", self.id))
        } else {
            (format!("%.{precision}f"), format!("id({}).state", self.id))
        }
    }

    /// Lambda body returning the state as a C string.
    pub(crate) fn lambda_return(&self, precision: u8) -> String {
        if self.text {
            format!("return id({}).state.c_str();", self.id)
        } else {
            format!(
                "return str_sprintf(\"%.{precision}f\", id({}).state).c_str();",
                self.id
            )
        }
    }

    /// Template expression for declarative renderers.
    pub(crate) fn template(&self) -> String {
        format!("{{{{ states('{}') }}}}", self.entity)
    }
}

/// Register refresh triggers for each widget's primary and secondary entity.
pub(crate) fn register_widget_entities(widgets: &[&Widget], ctx: &mut ExportContext) {
    for widget in widgets {
        let entities = [widget.entity(), widget.entity_id_2.as_deref()];
        for raw in entities.into_iter().flatten() {
            if let Some(entity) = normalize_entity(raw) {
                ctx.register_refresh(&entity, &widget.id);
            }
        }
    }
}
