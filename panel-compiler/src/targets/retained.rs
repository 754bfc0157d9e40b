//! Retained GUI target: an LVGL-style widget tree.

use std::fmt::Write;

use panel_core::{FontRequest, Layout, Page, PropMap, Widget};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::{font_list, sensor_decls, write_font_section, write_sensor_sections};
use super::{CompiledOutput, SensorDecl, TargetEmitter};
use crate::context::ExportContext;
use crate::error::ExportResult;
use crate::WidgetPlugin;

/// One retained GUI node: a tag and its properties.
///
/// Serializes as `{ "<tag>": { props } }`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetainedNode {
    /// Node kind (`label`, `obj`, `image`, ...).
    pub tag: String,
    /// Node properties.
    pub props: PropMap,
}

impl RetainedNode {
    /// Create an empty node.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            props: PropMap::new(),
        }
    }

    /// Create a node with the widget's ID and rounded geometry.
    #[must_use]
    pub fn for_widget(tag: impl Into<String>, widget: &Widget) -> Self {
        let rect = widget.rect();
        Self::new(tag)
            .with("id", widget.id.as_str())
            .with("x", rect.x)
            .with("y", rect.y)
            .with("width", rect.width)
            .with("height", rect.height)
    }

    /// Set a property.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    /// Set a property if a value is present.
    #[must_use]
    pub fn with_opt(self, key: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Get a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }
}

impl Serialize for RetainedNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.tag, &self.props)?;
        map.end()
    }
}

/// Build a multi-line lambda property value.
#[must_use]
pub fn lambda(lines: &[String]) -> Value {
    let mut value = String::from("!lambda |-");
    for line in lines {
        value.push('\n');
        value.push_str(line);
    }
    Value::String(value)
}

/// One page of retained nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetainedPage {
    /// Page ID (`page_N`).
    pub id: String,
    /// Nodes in paint order.
    pub widgets: Vec<RetainedNode>,
}

/// Complete retained GUI output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetainedDocument {
    /// Fonts referenced by nodes.
    pub fonts: Vec<FontRequest>,
    /// Entity declarations with widget refresh triggers.
    pub sensors: Vec<SensorDecl>,
    /// Pages in display order.
    pub pages: Vec<RetainedPage>,
}

impl RetainedDocument {
    /// Render as firmware YAML.
    #[must_use]
    pub fn to_yaml(&self) -> String {
        let mut out = String::with_capacity(4096);
        write_font_section(&mut out, &self.fonts);
        write_sensor_sections(&mut out, &self.sensors);
        out.push_str("lvgl:\n  pages:\n");
        for page in &self.pages {
            let _ = writeln!(out, "    - id: {}", page.id);
            if page.widgets.is_empty() {
                out.push_str("      widgets: []\n");
                continue;
            }
            out.push_str("      widgets:\n");
            for node in &page.widgets {
                let _ = writeln!(out, "        - {}:", node.tag);
                write_map(&mut out, &node.props, 12);
            }
        }
        out
    }

    /// Total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.pages.iter().map(|p| p.widgets.len()).sum()
    }
}

fn write_map(out: &mut String, map: &PropMap, indent: usize) {
    for (key, value) in map {
        write_entry(out, key, value, indent);
    }
}

fn write_entry(out: &mut String, key: &str, value: &Value, indent: usize) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            let _ = writeln!(out, "{:indent$}{key}:", "");
            write_map(out, map, indent + 2);
        }
        Value::Array(items) if items.iter().any(Value::is_object) => {
            let _ = writeln!(out, "{:indent$}{key}:", "");
            for item in items {
                match item {
                    Value::Object(map) => {
                        let mut nested = String::new();
                        write_map(&mut nested, map, indent + 4);
                        let item_pad = " ".repeat(indent + 4);
                        let dash = format!("{:width$}- ", "", width = indent + 2);
                        out.push_str(&nested.replacen(&item_pad, &dash, 1));
                    }
                    other => {
                        let _ = writeln!(out, "{:width$}- {}", "", scalar(other), width = indent + 2);
                    }
                }
            }
        }
        Value::String(text) if text.starts_with("!lambda") && text.contains('\n') => {
            let mut lines = text.lines();
            let head = lines.next().unwrap_or_default();
            let _ = writeln!(out, "{:indent$}{key}: {head}", "");
            for line in lines {
                let _ = writeln!(out, "{:width$}{line}", "", width = indent + 2);
            }
        }
        _ => {
            let _ = writeln!(out, "{:indent$}{key}: {}", "", scalar(value));
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => yaml_string(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(scalar).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(_) => "{}".to_string(),
    }
}

fn yaml_string(text: &str) -> String {
    if text.starts_with("!lambda") || is_plain(text) {
        return text.to_string();
    }
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

fn is_plain(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if matches!(
        text.to_ascii_lowercase().as_str(),
        "true" | "false" | "yes" | "no" | "on" | "off" | "null" | "~"
    ) {
        return false;
    }
    let hex = text
        .strip_prefix("0x")
        .is_some_and(|h| !h.is_empty() && h.chars().all(|c| c.is_ascii_hexdigit()));
    let percent = text
        .strip_suffix('%')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));
    hex || percent
        || ((first.is_ascii_alphabetic() || first == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/')))
}

/// Collects nodes per page.
#[derive(Default)]
pub(crate) struct RetainedEmitter {
    pages: Vec<RetainedPage>,
}

impl TargetEmitter for RetainedEmitter {
    fn begin_page(&mut self, index: usize, _page: &Page) {
        self.pages.push(RetainedPage {
            id: format!("page_{index}"),
            widgets: Vec::new(),
        });
    }

    fn emit_widget(
        &mut self,
        plugin: &dyn WidgetPlugin,
        widget: &Widget,
        ctx: &mut ExportContext,
    ) -> ExportResult<()> {
        let nodes = plugin.export_retained(widget, ctx)?;
        if let Some(page) = self.pages.last_mut() {
            page.widgets.extend(nodes);
        }
        Ok(())
    }

    fn finish(self: Box<Self>, _layout: &Layout, ctx: &ExportContext) -> CompiledOutput {
        let sensors = if ctx.options().emit_sensors {
            sensor_decls(&ctx.triggers)
        } else {
            Vec::new()
        };
        CompiledOutput::Retained(RetainedDocument {
            fonts: font_list(ctx),
            sensors,
            pages: self.pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_serializes_as_single_key() {
        let node = RetainedNode::new("label").with("text", "Hi");
        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json, json!({ "label": { "text": "Hi" } }));
    }

    #[test]
    fn test_for_widget_sets_common_props() {
        let widget = Widget::with_id("w1", "lvgl_label").with_geometry(1.4, 2.6, 50.0, 20.0);
        let node = RetainedNode::for_widget("label", &widget);
        assert_eq!(node.get("x"), Some(&json!(1)));
        assert_eq!(node.get("y"), Some(&json!(3)));
        assert_eq!(node.get("id"), Some(&json!("w1")));
    }

    #[test]
    fn test_yaml_rendering() {
        let node = RetainedNode::new("label")
            .with("text", "Hello World")
            .with("text_align", "CENTER")
            .with("opa", "COVER")
            .with("text_color", "0x000000")
            .with("series", json!([{ "color": "0xFF0000", "width": 2 }]))
            .with("value", lambda(&["return \"x\";".to_string()]));
        let doc = RetainedDocument {
            fonts: Vec::new(),
            sensors: Vec::new(),
            pages: vec![
                RetainedPage {
                    id: "page_0".into(),
                    widgets: vec![node],
                },
                RetainedPage {
                    id: "page_1".into(),
                    widgets: Vec::new(),
                },
            ],
        };

        let yaml = doc.to_yaml();
        let expected = "lvgl:\n  pages:\n    - id: page_0\n      widgets:\n        - label:\n\
            \x20           opa: COVER\n\
            \x20           series:\n\
            \x20             - color: 0xFF0000\n\
            \x20               width: 2\n\
            \x20           text: \"Hello World\"\n\
            \x20           text_align: CENTER\n\
            \x20           text_color: 0x000000\n\
            \x20           value: !lambda |-\n\
            \x20             return \"x\";\n\
            \x20   - id: page_1\n      widgets: []\n";
        assert_eq!(yaml, expected);
    }

    #[test]
    fn test_plain_strings() {
        assert!(is_plain("CENTER"));
        assert!(is_plain("50%"));
        assert!(is_plain("symbol_image"));
        assert!(!is_plain("on"));
        assert!(!is_plain("#ff0000"));
        assert!(!is_plain(""));
        assert!(!is_plain("12"));
    }
}
