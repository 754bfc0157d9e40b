//! Widget marker comments.
//!
//! Every widget in procedural output is preceded by one comment line that
//! carries everything needed to rebuild it:
//!
//! ```text
//! // widget:datetime id:w1 type:datetime x:10 y:10 w:100 h:30 align:CENTER fmt:time_only
//! ```
//!
//! Values containing whitespace, `:`, `"` or `\`, and empty values, are
//! double-quoted with `\"`, `\\`, `\n` and `\r` escapes. Plugins may shorten property
//! names through [`WidgetPlugin::marker_aliases`](crate::WidgetPlugin::marker_aliases).

use std::collections::BTreeMap;

use panel_core::{PropMap, Widget};
use serde_json::{Number, Value};

/// Start of every marker comment.
pub const MARKER_PREFIX: &str = "// widget:";

/// Marker keys that describe the widget itself rather than its properties.
pub const RESERVED_KEYS: &[&str] = &[
    "id", "x", "y", "w", "h", "title", "label", "ent", "entity", "ent2", "entity_2", "cond_ent",
    "cond_op", "cond_state", "cond_min", "cond_max",
];

/// Marker key for a property name.
#[must_use]
pub fn marker_key<'a>(aliases: &[(&'static str, &'static str)], property: &'a str) -> &'a str {
    aliases
        .iter()
        .find(|(name, _)| *name == property)
        .map_or(property, |(_, key)| *key)
}

/// Property name for a marker key. Accepts both short and long names.
#[must_use]
pub fn property_name<'a>(aliases: &[(&'static str, &'static str)], key: &'a str) -> &'a str {
    aliases
        .iter()
        .find(|(_, short)| *short == key)
        .map_or(key, |(name, _)| *name)
}

/// Encode a text value, quoting it when needed.
#[must_use]
pub fn encode_text(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ':' | '"' | '\\'));
    if !needs_quotes {
        return value.to_string();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Encode a property value. `null` is omitted.
#[must_use]
pub fn encode_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(encode_text(s)),
        Value::Array(_) | Value::Object(_) => Some(encode_text(&value.to_string())),
    }
}

/// Build the marker line for a widget and its merged properties.
#[must_use]
pub fn encode(widget: &Widget, props: &PropMap, aliases: &[(&'static str, &'static str)]) -> String {
    let rect = widget.rect();
    let mut line = format!(
        "{MARKER_PREFIX}{} id:{} type:{} x:{} y:{} w:{} h:{}",
        widget.kind,
        encode_text(&widget.id),
        encode_text(&widget.kind),
        rect.x,
        rect.y,
        rect.width,
        rect.height,
    );
    let mut push = |key: &str, value: String| {
        line.push(' ');
        line.push_str(key);
        line.push(':');
        line.push_str(&value);
    };

    let non_blank = |s: &&String| !s.trim().is_empty();
    if let Some(title) = widget.title.as_ref().filter(non_blank) {
        push("title", encode_text(title));
    }
    if let Some(entity) = widget.entity_id.as_ref().filter(non_blank) {
        push("ent", encode_text(entity));
    }
    if let Some(entity) = widget.entity_id_2.as_ref().filter(non_blank) {
        push("ent2", encode_text(entity));
    }

    let condition = &widget.condition;
    if let Some(entity) = condition.entity() {
        push("cond_ent", encode_text(entity));
        if let Some(op) = condition.condition_operator.as_ref().filter(non_blank) {
            push("cond_op", encode_text(op));
        }
        if let Some(state) = condition.condition_state.as_ref() {
            push("cond_state", encode_text(state));
        }
        let bounds = [
            ("cond_min", condition.condition_min),
            ("cond_max", condition.condition_max),
        ];
        for (key, bound) in bounds {
            if let Some(n) = bound.and_then(Number::from_f64) {
                push(key, n.to_string());
            }
        }
    }

    for (name, value) in props {
        if let Some(encoded) = encode_value(value) {
            push(marker_key(aliases, name), encoded);
        }
    }
    line
}

/// A parsed marker comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Widget type from the `widget:` tag.
    pub widget_type: String,
    /// Raw key/value pairs. A repeated key keeps its last value.
    pub fields: BTreeMap<String, String>,
}

impl Marker {
    /// Parse a marker comment. Returns `None` for any other line.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix("//")?.trim_start();
        let rest = rest.strip_prefix("widget:")?;
        let type_len = rest
            .find(|c: char| !is_key_char(c))
            .unwrap_or(rest.len());
        if type_len == 0 {
            return None;
        }
        let (widget_type, fields) = rest.split_at(type_len);
        Some(Self {
            widget_type: widget_type.to_string(),
            fields: tokenize(fields).into_iter().collect(),
        })
    }

    /// Raw value of a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// First present value among several key spellings.
    #[must_use]
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split `key:value key:"quoted value"` text into pairs.
///
/// An unquoted value runs until whitespace followed by another `key:`, so
/// hand-written markers like `text:Hello World align:LEFT` still parse.
/// Text that does not start with a key is skipped.
#[must_use]
pub fn tokenize(text: &str) -> Vec<(String, String)> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut pairs = Vec::new();
    let mut i = 0;

    while i < len {
        while i < len && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= len {
            break;
        }

        let key_start = i;
        while i < len && is_key_char(chars[i]) {
            i += 1;
        }
        if i == key_start || i >= len || chars[i] != ':' {
            while i < len && !chars[i].is_whitespace() {
                i += 1;
            }
            continue;
        }
        let key: String = chars[key_start..i].iter().collect();
        i += 1;

        let value = if i < len && chars[i] == '"' {
            i += 1;
            let mut value = String::new();
            while i < len {
                match chars[i] {
                    '\\' if i + 1 < len => {
                        value.push(match chars[i + 1] {
                            'n' => '\n',
                            'r' => '\r',
                            c => c,
                        });
                        i += 2;
                    }
                    '"' => {
                        i += 1;
                        break;
                    }
                    c => {
                        value.push(c);
                        i += 1;
                    }
                }
            }
            value
        } else {
            let value_start = i;
            while i < len && !(chars[i].is_whitespace() && key_follows(&chars, i)) {
                i += 1;
            }
            chars[value_start..i]
                .iter()
                .collect::<String>()
                .trim()
                .to_string()
        };
        pairs.push((key, value));
    }
    pairs
}

fn key_follows(chars: &[char], mut i: usize) -> bool {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    let start = i;
    while i < chars.len() && is_key_char(chars[i]) {
        i += 1;
    }
    i > start && i < chars.len() && chars[i] == ':'
}

/// Decode a raw marker value using the kind of the default value.
///
/// Returns `None` when the raw text cannot be read as the expected kind.
#[must_use]
pub fn decode_value(raw: &str, template: Option<&Value>) -> Option<Value> {
    match template {
        Some(Value::Bool(_)) => parse_bool(raw).map(Value::Bool),
        Some(Value::Number(_)) => parse_number(raw),
        Some(Value::String(_)) => Some(Value::String(raw.to_string())),
        Some(Value::Array(_) | Value::Object(_)) => serde_json::from_str(raw).ok(),
        Some(Value::Null) | None => Some(infer_value(raw)),
    }
}

/// Best-effort typing for values without a known default.
#[must_use]
pub fn infer_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => parse_number(raw).unwrap_or_else(|| Value::String(raw.to_string())),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::from(n));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}
