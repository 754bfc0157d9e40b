//! Offline reparser: rebuild a layout from compiled output.
//!
//! ```text
//! ┌──────────────┐   scan    ┌──────────────┐  markers   ┌──────────┐
//! │ config text  │ ────────► │ tagged lines │ ─────────► │  Layout  │
//! └──────────────┘           └──────────────┘ primitives └──────────┘
//! ```
//!
//! Procedural output is recovered widget by widget from its marker
//! comments; drawing calls without a marker fall back to plain shapes.
//! Statements directly after a marker belong to that widget until the
//! next comment or non-drawing line.
//! Retained output carries no markers, so only its page structure is
//! recovered. Reparsing never fails: anything unreadable becomes a warning.

mod primitives;
pub mod scanner;

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use panel_core::{Layout, Page, Widget};
use regex::Regex;

use crate::marker::{decode_value, infer_value, property_name, Marker, RESERVED_KEYS};
use crate::plugin::PluginRegistry;
use scanner::{scan, BlockKind};

pub use primitives::recover as recover_primitive;

/// Most empty pages inserted to close a gap between page indices.
const MAX_PAGE_GAP: usize = 16;

static PAGE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:\}\s*else\s+)?if\s*\(\s*(?:id\s*\(\s*display_page\s*\)|page)\s*==\s*(\d+)\s*\)\s*\{?\s*$",
    )
    .expect("BUG: invalid PAGE_OPEN regex literal")
});

static PAGE_INTERVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*case\s+(\d+)\s*:\s*interval\s*=\s*(\d+)\s*;(?:\s*break\s*;)?\s*$")
        .expect("BUG: invalid PAGE_INTERVAL regex literal")
});

static PAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*//\s*page:name\s+"(.*)"\s*$"#)
        .expect("BUG: invalid PAGE_NAME regex literal")
});

static RETAINED_PAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*-\s*id:\s*page_(\d+)").expect("BUG: invalid RETAINED_PAGE regex literal")
});

static WIDGET_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:it\.\w+\s*\(|[{}]|for\s*\(|if\s*\(|else\b|auto\s)")
        .expect("BUG: invalid WIDGET_BODY regex literal")
});

/// Result of a reparse.
#[derive(Debug, Clone)]
pub struct ReparseResult {
    /// The recovered layout. Always has at least one page.
    pub layout: Layout,
    /// Human-readable notes about anything skipped or guessed.
    pub warnings: Vec<String>,
}

/// Rebuilds layouts from compiled configuration text.
#[derive(Clone)]
pub struct Reparser {
    registry: Arc<PluginRegistry>,
}

impl Default for Reparser {
    fn default() -> Self {
        Self::new(Arc::new(PluginRegistry::with_builtin()))
    }
}

impl Reparser {
    /// Create a reparser that types properties using `registry`.
    #[must_use]
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// Rebuild a layout from `text`.
    #[must_use]
    pub fn reparse(&self, text: &str) -> ReparseResult {
        let mut state = State::default();

        for line in scan(text) {
            match line.kind {
                BlockKind::Procedural => self.procedural_line(&mut state, &line.text, line.line_no),
                BlockKind::RetainedGui => {
                    if let Some(index) = capture_index(&RETAINED_PAGE, &line.text) {
                        state.page(index);
                    }
                }
                BlockKind::Normal => {}
            }
        }

        let layout = state.layout();
        tracing::info!(
            pages = layout.pages.len(),
            widgets = layout.widget_count(),
            warnings = state.warnings.len(),
            "reparsed layout"
        );
        ReparseResult {
            layout,
            warnings: state.warnings,
        }
    }

    fn procedural_line(&self, state: &mut State, text: &str, line_no: usize) {
        if let Some(marker) = Marker::parse(text) {
            let ordinal = state.current_page().widgets.len();
            let widget = self.widget_from_marker(&marker, ordinal, line_no, &mut state.warnings);
            state.add(widget, line_no);
            state.skipping = true;
            return;
        }
        if let Some(index) = capture_index(&PAGE_OPEN, text) {
            state.current = index;
            state.page(index);
            state.skipping = false;
            return;
        }
        if let Some(caps) = PAGE_INTERVAL.captures(text) {
            let index = caps[1].parse::<usize>();
            let seconds = caps[2].parse::<u32>();
            if let (Ok(index), Ok(seconds)) = (index, seconds) {
                state.page(index).refresh_s = Some(seconds);
            }
            return;
        }
        if let Some(caps) = PAGE_NAME.captures(text) {
            let name = unescape(&caps[1]);
            let current = state.current;
            state.page(current).name = name;
            return;
        }
        if state.skipping {
            if WIDGET_BODY.is_match(text) {
                return;
            }
            state.skipping = false;
        }
        let ordinal = state.current_page().widgets.len();
        if let Some(widget) = primitives::recover(text, ordinal) {
            state.add(widget, line_no);
        }
    }

    fn widget_from_marker(
        &self,
        marker: &Marker,
        ordinal: usize,
        line_no: usize,
        warnings: &mut Vec<String>,
    ) -> Widget {
        let kind = marker.widget_type.as_str();
        let id = match marker.get("id").map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let id = format!("w_{kind}_{ordinal}");
                warnings.push(format!("line {line_no}: marker without id, using {id}"));
                id
            }
        };

        let mut widget = Widget::with_id(id, kind);
        let number = |key: &str| marker.get(key).and_then(|v| v.trim().parse::<f64>().ok());
        widget.set_geometry(
            number("x").unwrap_or(widget.x),
            number("y").unwrap_or(widget.y),
            number("w").unwrap_or(widget.width),
            number("h").unwrap_or(widget.height),
        );
        let owned = |value: Option<&str>| value.map(str::to_string);
        widget.title = owned(marker.get_any(&["title", "label"]));
        widget.entity_id = owned(marker.get_any(&["ent", "entity"]));
        widget.entity_id_2 = owned(marker.get_any(&["ent2", "entity_2"]));
        widget.condition.condition_entity = owned(marker.get("cond_ent"));
        widget.condition.condition_operator = owned(marker.get("cond_op"));
        widget.condition.condition_state = owned(marker.get("cond_state"));
        widget.condition.condition_min = number("cond_min");
        widget.condition.condition_max = number("cond_max");

        let plugin = self.registry.get(kind);
        if plugin.is_none() {
            warnings.push(format!("line {line_no}: unknown widget type '{kind}'"));
        }
        for (key, raw) in &marker.fields {
            if RESERVED_KEYS.contains(&key.as_str()) || (key == "type" && raw == kind) {
                continue;
            }
            let value = match plugin {
                Some(plugin) => {
                    let name = property_name(plugin.marker_aliases(), key);
                    let template = plugin.descriptor().defaults.get(name);
                    match decode_value(raw, template) {
                        Some(value) => (name, value),
                        None => {
                            warnings.push(format!(
                                "line {line_no}: {}: cannot read '{raw}' for {name}",
                                widget.id
                            ));
                            continue;
                        }
                    }
                }
                None => (key.as_str(), infer_value(raw)),
            };
            widget.set_prop(value.0, value.1);
        }
        widget
    }
}

#[derive(Default)]
struct State {
    pages: BTreeMap<usize, Page>,
    current: usize,
    skipping: bool,
    warnings: Vec<String>,
}

impl State {
    fn page(&mut self, index: usize) -> &mut Page {
        self.pages.entry(index).or_insert_with(|| Page::new(index))
    }

    fn current_page(&mut self) -> &mut Page {
        let current = self.current;
        self.page(current)
    }

    fn add(&mut self, widget: Widget, line_no: usize) {
        let id = widget.id.clone();
        if self.current_page().add_widget(widget).is_err() {
            self.warnings
                .push(format!("line {line_no}: duplicate widget id '{id}' skipped"));
        }
    }

    /// Pages in index order. Short gaps are filled with empty pages; a
    /// page further out is moved up to the next free position.
    fn layout(&mut self) -> Layout {
        let mut layout = Layout::new();
        if self.pages.is_empty() {
            return layout;
        }
        layout.pages.clear();
        for (index, mut page) in std::mem::take(&mut self.pages) {
            let next = layout.pages.len();
            if index - next > MAX_PAGE_GAP {
                self.warnings.push(format!(
                    "page index {index} is too far past the last page, placed at {next}"
                ));
                let default_name = Page::new(index).name;
                let renumbered = Page::new(next);
                page.id = renumbered.id;
                if page.name == default_name {
                    page.name = renumbered.name;
                }
            } else {
                layout.pages.extend((next..index).map(Page::new));
            }
            layout.pages.push(page);
        }
        layout
    }
}

fn capture_index(re: &Regex, text: &str) -> Option<usize> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
