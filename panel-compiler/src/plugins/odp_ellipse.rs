//! Ellipse for the declarative renderers.

use panel_core::{ColorRole, Widget};
use serde::{Deserialize, Serialize};

use super::{decode, literal_color};
use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::plugin::{Capability, PluginDescriptor, RenderHint, WidgetPlugin};
use crate::targets::DrawInstruction;
use crate::{DeclarativeFlavor, Target};

/// Properties of an `odp_ellipse` widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OdpEllipseProps {
    /// Fill color; unset or `transparent` leaves the interior empty.
    pub fill: Option<String>,
    /// Outline color.
    pub outline: String,
    /// Outline width.
    pub border_width: u32,
}

impl Default for OdpEllipseProps {
    fn default() -> Self {
        Self {
            fill: None,
            outline: "black".to_string(),
            border_width: 1,
        }
    }
}

/// Plugin for the `odp_ellipse` widget.
pub struct OdpEllipsePlugin {
    descriptor: PluginDescriptor,
}

impl OdpEllipsePlugin {
    /// Create the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new::<OdpEllipseProps>(
                "odp_ellipse",
                "Ellipse",
                "OpenDisplay",
                &[Target::DeclarativeOepl, Target::DeclarativeOpenDisplay],
                &[Capability::RenderHint, Capability::ExportDeclarative],
            ),
        }
    }
}

impl Default for OdpEllipsePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetPlugin for OdpEllipsePlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn render_hint(&self, widget: &Widget, dark_mode: bool) -> ExportResult<RenderHint> {
        let props: OdpEllipseProps = decode(widget)?;
        Ok(RenderHint {
            color: panel_core::resolve_color(&props.outline, ColorRole::Outline, dark_mode),
            fill: props
                .fill
                .as_deref()
                .filter(|f| !f.trim().is_empty())
                .and_then(|f| panel_core::resolve_color(f, ColorRole::Fill, dark_mode)),
            ..RenderHint::default()
        })
    }

    fn export_declarative(
        &self,
        widget: &Widget,
        flavor: DeclarativeFlavor,
        ctx: &ExportContext,
    ) -> ExportResult<Vec<DrawInstruction>> {
        let props: OdpEllipseProps = decode(widget)?;
        let rect = widget.rect();
        let fill = props
            .fill
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .and_then(|f| ctx.color(f, ColorRole::Fill));
        Ok(vec![DrawInstruction::Ellipse {
            x_start: rect.x,
            y_start: rect.y,
            x_end: rect.right(),
            y_end: rect.bottom(),
            fill,
            outline: literal_color(ctx, &props.outline),
            width: props.border_width.max(1),
            visible: (flavor == DeclarativeFlavor::OpenDisplay).then_some(true),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::context;
    use super::*;

    fn ellipse() -> Widget {
        Widget::with_id("e1", "odp_ellipse").with_geometry(10.0, 10.0, 150.0, 80.0)
    }

    #[test]
    fn test_opendisplay_ellipse() {
        let plugin = OdpEllipsePlugin::new();
        let ctx = context(Target::DeclarativeOpenDisplay, true);
        let widget = ellipse()
            .with_prop("fill", "theme_auto")
            .with_prop("outline", "transparent");
        let out = plugin
            .export_declarative(&widget, DeclarativeFlavor::OpenDisplay, &ctx)
            .expect("export");
        assert_eq!(
            out,
            vec![DrawInstruction::Ellipse {
                x_start: 10,
                y_start: 10,
                x_end: 160,
                y_end: 90,
                fill: Some("white".into()),
                outline: "white".into(),
                width: 1,
                visible: Some(true),
            }]
        );
    }

    #[test]
    fn test_oepl_transparent_fill() {
        let plugin = OdpEllipsePlugin::new();
        let ctx = context(Target::DeclarativeOepl, false);
        let widget = ellipse().with_prop("fill", "transparent");
        match &plugin
            .export_declarative(&widget, DeclarativeFlavor::Oepl, &ctx)
            .expect("export")[..]
        {
            [DrawInstruction::Ellipse { fill, outline, visible, .. }] => {
                assert_eq!(*fill, None);
                assert_eq!(outline, "black");
                assert_eq!(*visible, None);
            }
            other => panic!("unexpected instructions: {other:?}"),
        }
    }
}
