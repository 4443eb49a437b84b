// ── Typed domain entities ──
//
// Classification from raw hub state records into a closed set of
// entity kinds. Domains outside the set are dropped upstream; adding
// a kind here is a compile-time-checked change at every match site.

use hearth_api::EntityState;

/// A classified, typed representation of one hub entity.
///
/// All variants carry the namespaced id, a display name derived from
/// the id's slug, and the raw state string echoed from the hub.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Light {
        id: String,
        name: String,
        state: String,
        is_on: bool,
    },
    Switch {
        id: String,
        name: String,
        state: String,
        is_on: bool,
    },
    Sensor {
        id: String,
        name: String,
        state: String,
        unit: Option<String>,
    },
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Self::Light { id, .. } | Self::Switch { id, .. } | Self::Sensor { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Light { name, .. } | Self::Switch { name, .. } | Self::Sensor { name, .. } => {
                name
            }
        }
    }

    pub fn state(&self) -> &str {
        match self {
            Self::Light { state, .. }
            | Self::Switch { state, .. }
            | Self::Sensor { state, .. } => state,
        }
    }

    /// On/off flag for switchable kinds; `None` for sensors.
    pub fn is_on(&self) -> Option<bool> {
        match self {
            Self::Light { is_on, .. } | Self::Switch { is_on, .. } => Some(*is_on),
            Self::Sensor { .. } => None,
        }
    }

    /// The domain this entity was classified from.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Light { .. } => "light",
            Self::Switch { .. } => "switch",
            Self::Sensor { .. } => "sensor",
        }
    }
}

/// Classify a raw hub state record into a typed entity.
///
/// Pure and total: entities outside the `light` / `switch` / `sensor`
/// domains yield `None` and are filtered out by the repository. This
/// narrowing is intentional — the consumer surface only renders these
/// three kinds.
pub fn classify(raw: &EntityState) -> Option<Entity> {
    let (domain, slug) = raw.entity_id.split_once('.')?;

    match domain {
        "light" => Some(Entity::Light {
            id: raw.entity_id.clone(),
            name: display_name(slug),
            state: raw.state.clone(),
            is_on: raw.state == "on",
        }),
        "switch" => Some(Entity::Switch {
            id: raw.entity_id.clone(),
            name: display_name(slug),
            state: raw.state.clone(),
            is_on: raw.state == "on",
        }),
        "sensor" => Some(Entity::Sensor {
            id: raw.entity_id.clone(),
            name: display_name(slug),
            state: raw.state.clone(),
            unit: raw.attributes.get("unit_of_measurement").map(attr_text),
        }),
        _ => None,
    }
}

/// Derive a display name from an id slug: underscores become spaces,
/// first character uppercased, rest untouched.
fn display_name(slug: &str) -> String {
    let spaced = slug.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

/// Render an attribute value as plain text, without JSON quoting.
fn attr_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
