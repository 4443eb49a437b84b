// Wire models for the hub's REST API.
//
// These mirror the hub's JSON shapes exactly; domain typing happens a
// layer up, in hearth-core. Unknown fields are ignored, optional fields
// default, timestamps stay opaque strings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One entity state record as returned by `GET /api/states`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityState {
    /// Namespaced id: `"<domain>.<slug>"`, e.g. `"light.living_room"`.
    pub entity_id: String,

    /// Raw state string (`"on"`, `"off"`, `"21.5"`, ...).
    pub state: String,

    /// Free-form attribute map; values are arbitrary JSON.
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,

    /// Opaque hub timestamps — never parsed by this client.
    #[serde(default)]
    pub last_changed: String,
    #[serde(default)]
    pub last_updated: String,
}

impl EntityState {
    /// The entity-type prefix of the id (`"light"` for `"light.porch"`).
    pub fn domain(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map_or(self.entity_id.as_str(), |(domain, _)| domain)
    }
}

/// Body for `POST /api/services/{domain}/{service}`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceRequest {
    pub entity_id: String,
}

/// The state-changing services the hub exposes per switchable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    TurnOn,
    TurnOff,
    Toggle,
}

impl ServiceAction {
    /// Wire name of the service endpoint segment.
    pub fn service_name(self) -> &'static str {
        match self {
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
            Self::Toggle => "toggle",
        }
    }
}

impl std::fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.service_name())
    }
}
