//! Target emitters.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  TargetEmitter trait                    │
//! ├──────────────┬──────────────┬───────────────────────────┤
//! │ Procedural   │ Retained GUI │ Declarative (OEPL / ODP)  │
//! │ lambda text  │ node tree    │ JSON draw list            │
//! └──────────────┴──────────────┴───────────────────────────┘
//! ```

pub mod declarative;
pub mod procedural;
pub mod retained;

use std::fmt::Write;

use panel_core::{FontRequest, Layout, Page, Widget};
use serde::Serialize;

use crate::context::{is_text_entity, sensor_id, ExportContext, TriggerRegistry};
use crate::error::ExportResult;
use crate::{Target, WidgetPlugin};

pub use declarative::{DeclarativeDocument, DeclarativePage, DrawInstruction};
pub use retained::{RetainedDocument, RetainedNode, RetainedPage};

/// The result of compiling a layout for one target.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "document", rename_all = "snake_case")]
pub enum CompiledOutput {
    /// YAML text with the display lambda.
    Procedural(String),
    /// Retained GUI widget tree.
    Retained(RetainedDocument),
    /// Declarative draw lists.
    Declarative(DeclarativeDocument),
}

impl CompiledOutput {
    /// Render the output as text: YAML for the firmware targets, JSON for
    /// the declarative ones.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_text(&self) -> ExportResult<String> {
        match self {
            Self::Procedural(text) => Ok(text.clone()),
            Self::Retained(doc) => Ok(doc.to_yaml()),
            Self::Declarative(doc) => doc.to_json(),
        }
    }

    /// Procedural text, if this is procedural output.
    #[must_use]
    pub fn as_procedural(&self) -> Option<&str> {
        match self {
            Self::Procedural(text) => Some(text),
            _ => None,
        }
    }

    /// Retained document, if this is retained GUI output.
    #[must_use]
    pub fn as_retained(&self) -> Option<&RetainedDocument> {
        match self {
            Self::Retained(doc) => Some(doc),
            _ => None,
        }
    }

    /// Declarative document, if this is declarative output.
    #[must_use]
    pub fn as_declarative(&self) -> Option<&DeclarativeDocument> {
        match self {
            Self::Declarative(doc) => Some(doc),
            _ => None,
        }
    }
}

/// Collects per-widget output for one target.
pub(crate) trait TargetEmitter {
    /// Start a new page.
    fn begin_page(&mut self, index: usize, page: &Page);

    /// Emit one widget onto the current page.
    ///
    /// On error nothing from this widget is kept.
    fn emit_widget(
        &mut self,
        plugin: &dyn WidgetPlugin,
        widget: &Widget,
        ctx: &mut ExportContext,
    ) -> ExportResult<()>;

    /// Assemble the final document.
    fn finish(self: Box<Self>, layout: &Layout, ctx: &ExportContext) -> CompiledOutput;
}

/// Create the emitter for a target.
pub(crate) fn emitter_for(target: Target) -> Box<dyn TargetEmitter> {
    match target {
        Target::Procedural => Box::new(procedural::ProceduralEmitter::default()),
        Target::RetainedGui => Box::new(retained::RetainedEmitter::default()),
        Target::DeclarativeOepl | Target::DeclarativeOpenDisplay => {
            Box::new(declarative::DeclarativeEmitter::new(target))
        }
    }
}

/// Which firmware section declares an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// `sensor:`
    Sensor,
    /// `binary_sensor:`
    BinarySensor,
    /// `text_sensor:`
    TextSensor,
}

impl SensorKind {
    /// Section key.
    #[must_use]
    pub const fn section(self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::BinarySensor => "binary_sensor",
            Self::TextSensor => "text_sensor",
        }
    }

    /// Section for an entity.
    #[must_use]
    pub fn of(entity: &str) -> Self {
        if is_text_entity(entity) {
            Self::TextSensor
        } else if entity.starts_with("binary_sensor.") {
            Self::BinarySensor
        } else {
            Self::Sensor
        }
    }
}

/// A firmware entity declaration with its refresh actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorDecl {
    /// Section the declaration belongs to.
    pub kind: SensorKind,
    /// Component ID.
    pub id: String,
    /// External entity reference.
    pub entity_id: String,
    /// Actions run on every new value.
    pub actions: Vec<String>,
}

/// Build declarations for every registered entity, grouped by section.
pub(crate) fn sensor_decls(triggers: &TriggerRegistry) -> Vec<SensorDecl> {
    let mut decls: Vec<SensorDecl> = triggers
        .numeric()
        .iter()
        .chain(triggers.text())
        .map(|(entity, actions)| SensorDecl {
            kind: SensorKind::of(entity),
            id: sensor_id(entity),
            entity_id: entity.clone(),
            actions: actions.iter().cloned().collect(),
        })
        .collect();
    decls.sort_by(|a, b| (a.kind, &a.id).cmp(&(b.kind, &b.id)));
    decls
}

pub(crate) fn write_font_section(out: &mut String, fonts: &[FontRequest]) {
    if fonts.is_empty() {
        return;
    }
    out.push_str("font:\n");
    for font in fonts {
        let _ = writeln!(out, "  - file: \"{}\"", font.source());
        let _ = writeln!(out, "    id: {}", font.id());
        let _ = writeln!(out, "    size: {}", font.size);
    }
    out.push('\n');
}

pub(crate) fn write_sensor_sections(out: &mut String, sensors: &[SensorDecl]) {
    let mut current = None;
    for sensor in sensors {
        if current != Some(sensor.kind) {
            if current.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "{}:", sensor.kind.section());
            current = Some(sensor.kind);
        }
        out.push_str("  - platform: homeassistant\n");
        let _ = writeln!(out, "    id: {}", sensor.id);
        let _ = writeln!(out, "    entity_id: {}", sensor.entity_id);
        out.push_str("    internal: true\n");
        if !sensor.actions.is_empty() {
            out.push_str("    on_value:\n      then:\n");
            for action in &sensor.actions {
                let _ = writeln!(out, "        - {action}");
            }
        }
    }
    if current.is_some() {
        out.push('\n');
    }
}

/// Fonts of a context in ID order.
pub(crate) fn font_list(ctx: &ExportContext) -> Vec<FontRequest> {
    ctx.fonts.iter().map(|(_, font)| font.clone()).collect()
}
