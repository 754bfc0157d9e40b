//! Widgets - the placed elements of a page.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::geometry::{round_px, Rect};
use crate::{LayoutError, LayoutResult};

/// Open property bag attached to every widget.
///
/// Keys are kept sorted so that anything derived from the bag iterates
/// deterministically.
pub type PropMap = serde_json::Map<String, Value>;

/// Optional visibility gate evaluated by emitters that support conditional
/// rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilityCondition {
    /// Entity whose state gates the widget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_entity: Option<String>,
    /// Comparison operator (`==`, `!=`, `>`, `<`, `>=`, `<=`, `range`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_operator: Option<String>,
    /// State to compare against for equality operators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_state: Option<String>,
    /// Lower bound for ordering and `range` operators.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_number"
    )]
    pub condition_min: Option<f64>,
    /// Upper bound for ordering and `range` operators.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_number"
    )]
    pub condition_max: Option<f64>,
}

impl VisibilityCondition {
    /// The gating entity, if one is set and non-blank.
    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        self.condition_entity
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Whether this condition gates rendering at all.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.entity().is_some()
    }
}

/// Accepts a number, a numeric string, an empty string or null.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// One placed element of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    /// Identifier, unique within its page.
    pub id: String,
    /// Widget type, the key into the plugin registry.
    #[serde(rename = "type")]
    pub kind: String,
    /// Left edge in device pixels.
    pub x: f64,
    /// Top edge in device pixels.
    pub y: f64,
    /// Width in device pixels.
    pub width: f64,
    /// Height in device pixels.
    pub height: f64,
    /// Optional display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Primary external data source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// Secondary external data source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id_2: Option<String>,
    /// Visibility gate.
    #[serde(flatten)]
    pub condition: VisibilityCondition,
    /// Property bag, merged with the plugin defaults before use.
    #[serde(default)]
    pub props: PropMap,
}

impl Widget {
    /// Create a widget of the given type with a fresh ID.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self::with_id(format!("w_{}", &uuid[..8]), kind)
    }

    /// Create a widget with an explicit ID.
    #[must_use]
    pub fn with_id(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 30.0,
            title: None,
            entity_id: None,
            entity_id_2: None,
            condition: VisibilityCondition::default(),
            props: PropMap::new(),
        }
    }

    /// Set the bounding box.
    #[must_use]
    pub fn with_geometry(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.set_geometry(x, y, width, height);
        self
    }

    /// Set a single property.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_prop(key, value);
        self
    }

    /// Set the primary entity.
    #[must_use]
    pub fn with_entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Apply a live geometry update from a move/resize collaborator.
    pub fn set_geometry(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
    }

    /// Set a single property, replacing any previous value.
    pub fn set_prop(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.props.insert(key.into(), value.into());
    }

    /// The bounding box rounded to whole pixels.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(
            round_px(self.x),
            round_px(self.y),
            round_px(self.width),
            round_px(self.height),
        )
    }

    /// The primary entity, falling back to an `entity_id` property.
    #[must_use]
    pub fn entity(&self) -> Option<&str> {
        self.entity_id
            .as_deref()
            .or_else(|| self.props.get("entity_id").and_then(Value::as_str))
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Decode the property bag into a typed structure.
    ///
    /// The bag is overlaid on `P::default()`; keys that are absent or `null`
    /// keep the default value.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidProps`] if a present value has the wrong
    /// type for its field.
    pub fn props_as<P>(&self) -> LayoutResult<P>
    where
        P: Serialize + DeserializeOwned + Default,
    {
        let invalid = |source| LayoutError::InvalidProps {
            widget: self.id.clone(),
            source,
        };

        let mut merged = match serde_json::to_value(P::default()).map_err(invalid)? {
            Value::Object(map) => map,
            _ => PropMap::new(),
        };
        for (key, value) in &self.props {
            if !value.is_null() {
                merged.insert(key.clone(), value.clone());
            }
        }

        serde_json::from_value(Value::Object(merged)).map_err(invalid)
    }
}
