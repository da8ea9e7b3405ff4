//! Event and ticketing listing models

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// The currently loaded event
///
/// The raw API object is kept verbatim so a session snapshot writes back
/// exactly what the ticketing platform returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub start_local: String,
    pub organization_id: String,
    raw: Value,
}

impl Event {
    /// Parse an event object (`id`, `name.text`, `start.local`, `organization_id`)
    pub fn from_value(raw: Value) -> Result<Self> {
        let id = id_string(raw.get("id")).ok_or(Error::MalformedEvent("id"))?;
        let name = raw
            .get("name")
            .and_then(|n| n.get("text"))
            .and_then(Value::as_str)
            .ok_or(Error::MalformedEvent("name.text"))?
            .to_string();
        let start_local = raw
            .get("start")
            .and_then(|s| s.get("local"))
            .and_then(Value::as_str)
            .ok_or(Error::MalformedEvent("start.local"))?
            .to_string();
        let organization_id =
            id_string(raw.get("organization_id")).ok_or(Error::MalformedEvent("organization_id"))?;

        Ok(Self {
            id,
            name,
            start_local,
            organization_id,
            raw,
        })
    }

    /// The original API object
    pub fn to_value(&self) -> Value {
        self.raw.clone()
    }
}

/// Read an identifier that may arrive as a string or a number
pub(crate) fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Authenticated ticketing account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUser {
    pub id: String,
    pub name: String,
}

/// Organization the account can see
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

/// Entry of an organization's event listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: String,
    pub name: String,
    pub start_local: String,
    pub organization_id: String,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            name: event.name.clone(),
            start_local: event.start_local.clone(),
            organization_id: event.organization_id.clone(),
        }
    }
}
