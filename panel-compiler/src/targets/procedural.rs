//! Procedural target: a firmware display lambda.
//!
//! Layout of the emitted YAML:
//!
//! ```text
//! globals:        current page index
//! font:           every requested font
//! graph:          chart history components
//! sensor: ...     entity declarations with refresh triggers
//! script:         per-page refresh intervals
//! display:
//!   - lambda: |-
//!       int page = id(display_page);
//!       const auto color_black = Color(0, 0, 0);
//!       if (page == 0) {
//!         // page:name "Main"
//!         // widget:datetime id:w1 type:datetime x:10 y:10 w:100 h:30 ...
//!         it.strftime(...);
//!       }
//! ```

use std::fmt::{self, Write};

use panel_core::{Layout, Page, VisibilityCondition, Widget};
use serde::Serialize;
use serde_json::Value;

use super::{font_list, sensor_decls, write_font_section, write_sensor_sections};
use super::{CompiledOutput, TargetEmitter};
use crate::context::{is_text_entity, normalize_entity, sensor_id, ExportContext};
use crate::error::ExportResult;
use crate::{marker, WidgetPlugin};

/// Indentation of top-level lambda statements.
pub const LAMBDA_INDENT: usize = 6;

/// Indentation of statements inside a page block.
pub const PAGE_INDENT: usize = LAMBDA_INDENT + 2;

/// Escape text for a C string literal.
#[must_use]
pub fn c_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('"');
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped.push('"');
    escaped
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Build the `if (...)` expression for a visibility condition.
///
/// Returns `None` when the condition is inactive or cannot be expressed.
#[must_use]
pub fn condition_guard(condition: &VisibilityCondition) -> Option<String> {
    let entity = normalize_entity(condition.entity()?)?;
    let state = format!("id({}).state", sensor_id(&entity));
    let op = condition
        .condition_operator
        .as_deref()
        .map(str::trim)
        .filter(|op| !op.is_empty())
        .unwrap_or("==");
    let expected = condition.condition_state.as_deref().map(str::trim);

    if op == "range" {
        let lower = condition
            .condition_min
            .map(|min| format!("{state} >= {}", format_number(min)));
        let upper = condition
            .condition_max
            .map(|max| format!("{state} <= {}", format_number(max)));
        return match (lower, upper) {
            (Some(l), Some(u)) => Some(format!("{l} && {u}")),
            (Some(bound), None) | (None, Some(bound)) => Some(bound),
            (None, None) => None,
        };
    }

    if !matches!(op, "==" | "!=" | ">" | "<" | ">=" | "<=") {
        tracing::warn!(op, entity = %entity, "unsupported condition operator");
        return None;
    }

    let equality = matches!(op, "==" | "!=");

    if entity.starts_with("binary_sensor.") {
        if !equality {
            tracing::warn!(op, entity = %entity, "binary condition needs == or !=");
            return None;
        }
        let on = match expected?.to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => true,
            "off" | "false" | "0" => false,
            other => {
                tracing::warn!(state = other, entity = %entity, "binary condition state is not on/off");
                return None;
            }
        };
        let positive = on == (op == "==");
        return Some(if positive { state } else { format!("!{state}") });
    }

    if is_text_entity(&entity) {
        if !equality {
            tracing::warn!(op, entity = %entity, "text condition needs == or !=");
            return None;
        }
        let expected = c_string(expected.unwrap_or_default());
        return Some(format!("{state} {op} {expected}"));
    }

    let bound = expected
        .and_then(|s| s.parse::<f64>().ok())
        .or(match op {
            ">" | ">=" => condition.condition_min,
            "<" | "<=" => condition.condition_max,
            _ => None,
        });
    match bound {
        Some(value) => Some(format!("{state} {op} {}", format_number(value))),
        None => {
            tracing::warn!(entity = %entity, "numeric condition without a comparable value");
            None
        }
    }
}

/// Writer for one widget's procedural block.
///
/// Opening the block writes the marker and the visibility guard; closing it
/// writes the guard's closing brace.
pub struct ProceduralBlock<'a> {
    out: &'a mut String,
    indent: usize,
    guarded: bool,
}

impl<'a> ProceduralBlock<'a> {
    /// Write the marker line and, if the widget is conditional, the guard.
    ///
    /// # Errors
    ///
    /// Returns an error if `props` does not serialize to a JSON object.
    pub fn open<P: Serialize>(
        out: &'a mut String,
        widget: &Widget,
        props: &P,
        aliases: &[(&'static str, &'static str)],
    ) -> ExportResult<Self> {
        let props = match serde_json::to_value(props)? {
            Value::Object(map) => map,
            _ => panel_core::PropMap::new(),
        };
        let _ = writeln!(
            out,
            "{:PAGE_INDENT$}{}",
            "",
            marker::encode(widget, &props, aliases)
        );

        let guard = condition_guard(&widget.condition);
        if let Some(expr) = &guard {
            let _ = writeln!(out, "{:PAGE_INDENT$}if ({expr}) {{", "");
        }
        Ok(Self {
            out,
            indent: if guard.is_some() { PAGE_INDENT + 2 } else { PAGE_INDENT },
            guarded: guard.is_some(),
        })
    }

    /// Write one statement at the block's indentation.
    pub fn line(&mut self, statement: impl fmt::Display) {
        let _ = writeln!(self.out, "{:width$}{statement}", "", width = self.indent);
    }

    /// Write a `for` loop repeating `statement` with `i` from 0 to `count`.
    pub fn repeat(&mut self, count: u32, statement: impl fmt::Display) {
        self.line(format_args!("for (int i = 0; i < {count}; i++) {{"));
        self.line(format_args!("  {statement}"));
        self.line("}");
    }

    /// Open a nested `{` scope for block-local declarations.
    pub fn open_scope(&mut self) {
        self.line("{");
        self.indent += 2;
    }

    /// Close a scope opened with [`Self::open_scope`].
    pub fn close_scope(&mut self) {
        self.indent = self.indent.saturating_sub(2);
        self.line("}");
    }

    /// Close the guard, if any.
    pub fn close(self) {
        if self.guarded {
            let _ = writeln!(self.out, "{:PAGE_INDENT$}}}", "");
        }
    }
}

struct PageBlock {
    index: usize,
    name: String,
    refresh_s: Option<u32>,
    body: String,
}

/// Collects page bodies and assembles the YAML document.
#[derive(Default)]
pub(crate) struct ProceduralEmitter {
    pages: Vec<PageBlock>,
}

impl TargetEmitter for ProceduralEmitter {
    fn begin_page(&mut self, index: usize, page: &Page) {
        self.pages.push(PageBlock {
            index,
            name: page.name.clone(),
            refresh_s: page.refresh_s,
            body: String::new(),
        });
    }

    fn emit_widget(
        &mut self,
        plugin: &dyn WidgetPlugin,
        widget: &Widget,
        ctx: &mut ExportContext,
    ) -> ExportResult<()> {
        let mut buffer = String::new();
        plugin.export_procedural(widget, ctx, &mut buffer)?;
        if let Some(page) = self.pages.last_mut() {
            page.body.push_str(&buffer);
        }
        Ok(())
    }

    fn finish(self: Box<Self>, _layout: &Layout, ctx: &ExportContext) -> CompiledOutput {
        let options = ctx.options();
        let mut out = String::with_capacity(4096);
        let refresh: Vec<(usize, u32)> = self
            .pages
            .iter()
            .filter_map(|p| p.refresh_s.map(|s| (p.index, s)))
            .collect();

        out.push_str("globals:\n");
        let _ = writeln!(out, "  - id: {}", options.page_global);
        out.push_str("    type: int\n    restore_value: true\n    initial_value: '0'\n");
        if !refresh.is_empty() {
            out.push_str("  - id: page_refresh_interval\n    type: int\n");
            let _ = writeln!(out, "    initial_value: '{}'", options.default_refresh_s);
        }
        out.push('\n');

        write_font_section(&mut out, &font_list(ctx));

        if !ctx.graphs.is_empty() {
            out.push_str("graph:\n");
            for graph in ctx.graphs.iter() {
                let _ = writeln!(out, "  - id: {}", graph.id);
                let _ = writeln!(out, "    sensor: {}", graph.sensor);
                let _ = writeln!(out, "    duration: {}", graph.duration);
                let _ = writeln!(out, "    width: {}", graph.width);
                let _ = writeln!(out, "    height: {}", graph.height);
                let _ = writeln!(out, "    line_thickness: {}", graph.line_thickness);
            }
            out.push('\n');
        }

        if options.emit_sensors {
            write_sensor_sections(&mut out, &sensor_decls(&ctx.triggers));
        }

        if !refresh.is_empty() {
            out.push_str("script:\n  - id: page_refresh\n    then:\n      - lambda: |-\n");
            let _ = writeln!(out, "          int interval = {};", options.default_refresh_s);
            let _ = writeln!(out, "          switch (id({})) {{", options.page_global);
            for (index, seconds) in &refresh {
                let _ = writeln!(out, "            case {index}: interval = {seconds}; break;");
            }
            out.push_str("          }\n          id(page_refresh_interval) = interval;\n\n");
        }

        out.push_str("display:\n");
        let _ = writeln!(out, "  - platform: {}", options.display_platform);
        let _ = writeln!(out, "    id: {}", options.display_id);
        out.push_str("    update_interval: never\n    lambda: |-\n");
        let _ = writeln!(
            out,
            "{:LAMBDA_INDENT$}int page = id({});",
            "", options.page_global
        );
        for (name, (r, g, b)) in ctx.colors.iter() {
            let _ = writeln!(
                out,
                "{:LAMBDA_INDENT$}const auto {name} = Color({r}, {g}, {b});",
                ""
            );
        }
        for page in &self.pages {
            let _ = writeln!(out, "{:LAMBDA_INDENT$}if (page == {}) {{", "", page.index);
            let _ = writeln!(
                out,
                "{:PAGE_INDENT$}// page:name {}",
                "",
                c_string(&page.name)
            );
            out.push_str(&page.body);
            let _ = writeln!(out, "{:LAMBDA_INDENT$}}}", "");
        }
        CompiledOutput::Procedural(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(entity: &str, op: &str, state: Option<&str>) -> VisibilityCondition {
        VisibilityCondition {
            condition_entity: Some(entity.to_string()),
            condition_operator: Some(op.to_string()),
            condition_state: state.map(str::to_string),
            ..VisibilityCondition::default()
        }
    }

    #[test]
    fn test_numeric_guard() {
        let guard = condition_guard(&condition("sensor.temp", ">", Some("20")));
        assert_eq!(guard.as_deref(), Some("id(sensor_temp).state > 20"));
    }

    #[test]
    fn test_binary_guard() {
        let on = condition_guard(&condition("binary_sensor.door", "==", Some("on")));
        assert_eq!(on.as_deref(), Some("id(binary_sensor_door).state"));
        let off = condition_guard(&condition("binary_sensor.door", "==", Some("off")));
        assert_eq!(off.as_deref(), Some("!id(binary_sensor_door).state"));
        let not_on = condition_guard(&condition("binary_sensor.door", "!=", Some("on")));
        assert_eq!(not_on.as_deref(), Some("!id(binary_sensor_door).state"));
    }

    #[test]
    fn test_text_guard() {
        let guard = condition_guard(&condition("text_sensor.mode", "==", Some("away")));
        assert_eq!(guard.as_deref(), Some("id(text_sensor_mode).state == \"away\""));
        assert_eq!(
            condition_guard(&condition("text_sensor.mode", ">", Some("away"))),
            None
        );
    }

    #[test]
    fn test_range_guard() {
        let mut cond = condition("temp", "range", None);
        cond.condition_min = Some(18.0);
        cond.condition_max = Some(24.5);
        assert_eq!(
            condition_guard(&cond).as_deref(),
            Some("id(sensor_temp).state >= 18 && id(sensor_temp).state <= 24.5")
        );
    }

    #[test]
    fn test_inactive_condition() {
        assert_eq!(condition_guard(&VisibilityCondition::default()), None);
    }

    #[test]
    fn test_block_writes_marker_and_guard() {
        let mut widget = Widget::with_id("w1", "text");
        widget.condition = condition("binary_sensor.door", "==", Some("on"));
        let mut out = String::new();
        let mut block = ProceduralBlock::open(&mut out, &widget, &serde_json::json!({}), &[])
            .expect("open");
        block.line("it.print(0, 0, id(f), \"x\");");
        block.close();

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("        // widget:text id:w1 type:text"));
        assert_eq!(lines[1], "        if (id(binary_sensor_door).state) {");
        assert_eq!(lines[2], "          it.print(0, 0, id(f), \"x\");");
        assert_eq!(lines[3], "        }");
    }

    #[test]
    fn test_c_string_escapes() {
        assert_eq!(c_string("a\"b\\c\nd"), "\"a\\\"b\\\\c\\nd\"");
    }
}
