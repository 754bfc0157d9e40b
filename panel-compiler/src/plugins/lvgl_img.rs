//! Native retained GUI image.

use panel_core::Widget;
use serde::{Deserialize, Serialize};

use super::{decode, gui_color};
use crate::context::ExportContext;
use crate::error::{ExportError, ExportResult};
use crate::plugin::{Capability, PluginDescriptor, RenderHint, WidgetPlugin};
use crate::targets::RetainedNode;
use crate::Target;

/// Properties of an `lvgl_img` widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LvglImgProps {
    /// Image source ID or symbol.
    pub src: String,
    /// Rotation in 0.1 degree steps.
    pub rotation: i32,
    /// Recolor tint.
    pub color: String,
    /// Rotation pivot X.
    pub pivot_x: i32,
    /// Rotation pivot Y.
    pub pivot_y: i32,
    /// Zoom, 256 = 100%.
    pub scale: u32,
}

impl Default for LvglImgProps {
    fn default() -> Self {
        Self {
            src: "symbol_image".to_string(),
            rotation: 0,
            color: "black".to_string(),
            pivot_x: 0,
            pivot_y: 0,
            scale: 256,
        }
    }
}

/// Plugin for the `lvgl_img` widget.
pub struct LvglImgPlugin {
    descriptor: PluginDescriptor,
}

impl LvglImgPlugin {
    /// Create the plugin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new::<LvglImgProps>(
                "lvgl_img",
                "Image (lv)",
                "LVGL",
                &[Target::RetainedGui],
                &[Capability::RenderHint, Capability::ExportRetainedGui],
            ),
        }
    }
}

impl Default for LvglImgPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetPlugin for LvglImgPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn render_hint(&self, widget: &Widget, _dark_mode: bool) -> ExportResult<RenderHint> {
        let props: LvglImgProps = decode(widget)?;
        Ok(RenderHint {
            text: Some(format!("Symbol: {}", props.src)),
            font_size: Some(12),
            ..RenderHint::default()
        })
    }

    fn export_retained(
        &self,
        widget: &Widget,
        ctx: &ExportContext,
    ) -> ExportResult<Vec<RetainedNode>> {
        let props: LvglImgProps = decode(widget)?;
        let src = props.src.trim();
        if src.is_empty() {
            return Err(ExportError::InvalidValue {
                widget: widget.id.clone(),
                field: "src",
                message: "image source is empty".to_string(),
            });
        }
        Ok(vec![RetainedNode::for_widget("image", widget)
            .with("src", src)
            .with("angle", props.rotation)
            .with("pivot_x", props.pivot_x)
            .with("pivot_y", props.pivot_y)
            .with("zoom", props.scale)
            .with("image_recolor", gui_color(ctx, &props.color))
            .with("image_recolor_opa", "cover")])
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::context;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_node() {
        let plugin = LvglImgPlugin::new();
        let ctx = context(Target::RetainedGui, false);
        let widget = Widget::with_id("i1", "lvgl_img")
            .with_prop("src", "weather_icon")
            .with_prop("rotation", 900);
        let nodes = plugin.export_retained(&widget, &ctx).expect("export");
        let node = &nodes[0];
        assert_eq!(node.tag, "image");
        assert_eq!(node.get("src"), Some(&json!("weather_icon")));
        assert_eq!(node.get("angle"), Some(&json!(900)));
        assert_eq!(node.get("image_recolor"), Some(&json!("0x000000")));
    }

    #[test]
    fn test_empty_source_fails() {
        let plugin = LvglImgPlugin::new();
        let ctx = context(Target::RetainedGui, false);
        let widget = Widget::with_id("i1", "lvgl_img").with_prop("src", " ");
        assert!(plugin.export_retained(&widget, &ctx).is_err());
    }
}
