//! Persisted session document
//!
//! A [`SessionRecord`] is the JSON shape written to session files. Every
//! key is required on read; a document missing any of them is rejected
//! instead of being filled with defaults.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Attendee, Event, PrintStatus};
use crate::registry::AttendeeRegistry;
use crate::render::StepRegistry;
use crate::template::ContextBinder;

use super::{NametagSettings, Session};

/// Serialized attendee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendeeRecord {
    pub attendee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub company: String,
    pub barcode: String,
    /// [`PrintStatus`] ordinal
    pub printing_status: i64,
    pub raw_data: Value,
}

/// Serialized session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub api_key: String,
    /// Raw event object, `null` when no event is loaded
    pub event: Value,
    pub attendees: BTreeMap<String, AttendeeRecord>,
    /// Template path, empty when none is selected
    pub nametag_template: String,
    /// Variable name to `(is_field_reference, value)`
    pub template_context: BTreeMap<String, (bool, String)>,
    /// Index into the built-in render steps, `-1` for none
    pub custom_nametag_step: i64,
}

impl SessionRecord {
    /// Parse a session document
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::CorruptSession(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<&Attendee> for AttendeeRecord {
    fn from(attendee: &Attendee) -> Self {
        Self {
            attendee_id: attendee.id().to_string(),
            first_name: attendee.first_name.clone(),
            last_name: attendee.last_name.clone(),
            email: attendee.email.clone(),
            position: attendee.position.clone(),
            company: attendee.company.clone(),
            barcode: attendee.barcode.clone(),
            printing_status: attendee.printing_status.ordinal() as i64,
            raw_data: attendee.raw_data.clone(),
        }
    }
}

impl TryFrom<AttendeeRecord> for Attendee {
    type Error = Error;

    fn try_from(record: AttendeeRecord) -> Result<Self> {
        let status = PrintStatus::from_ordinal(record.printing_status).ok_or_else(|| {
            Error::CorruptSession(format!(
                "attendee {} has printing status {} out of range",
                record.attendee_id, record.printing_status
            ))
        })?;

        let mut attendee = Attendee::new(record.attendee_id);
        attendee.first_name = record.first_name;
        attendee.last_name = record.last_name;
        attendee.email = record.email;
        attendee.position = record.position;
        attendee.company = record.company;
        attendee.barcode = record.barcode;
        attendee.printing_status = status;
        attendee.raw_data = record.raw_data;
        Ok(attendee)
    }
}

/// Capture a session as a persistable record
pub fn snapshot(session: &Session) -> SessionRecord {
    let registry = &session.registry;
    let settings = &session.nametag;

    SessionRecord {
        api_key: session.api_key.clone(),
        event: registry
            .active_event()
            .map(Event::to_value)
            .unwrap_or(Value::Null),
        attendees: registry
            .iter()
            .map(|a| (a.id().to_string(), AttendeeRecord::from(a)))
            .collect(),
        nametag_template: settings
            .template_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default(),
        template_context: settings
            .binder
            .iter()
            .map(|(name, b)| (name.clone(), (b.is_field_reference, b.value.clone())))
            .collect(),
        custom_nametag_step: settings.custom_step.map(|i| i as i64).unwrap_or(-1),
    }
}

/// Rebuild a session from a record
///
/// Nothing is returned unless the whole record validates.
pub fn restore(record: SessionRecord) -> Result<Session> {
    let event = match record.event {
        Value::Null => None,
        raw => Some(
            Event::from_value(raw).map_err(|e| Error::CorruptSession(format!("event: {}", e)))?,
        ),
    };

    let mut attendees = BTreeMap::new();
    for (key, attendee_record) in record.attendees {
        if attendee_record.attendee_id.trim().is_empty() {
            return Err(Error::CorruptSession("attendee with a blank id".into()));
        }
        if key != attendee_record.attendee_id {
            return Err(Error::CorruptSession(format!(
                "attendee stored under key {} has id {}",
                key, attendee_record.attendee_id
            )));
        }
        attendees.insert(key, Attendee::try_from(attendee_record)?);
    }

    let custom_step = match record.custom_nametag_step {
        -1 => None,
        index => {
            let valid = usize::try_from(index)
                .ok()
                .filter(|i| StepRegistry::builtin().by_index(*i).is_some());
            Some(valid.ok_or_else(|| {
                Error::CorruptSession(format!("render step index {} out of range", index))
            })?)
        }
    };

    let mut binder = ContextBinder::new();
    for (name, (is_field_reference, value)) in record.template_context {
        binder
            .bind(name, is_field_reference, value)
            .map_err(|e| Error::CorruptSession(format!("template_context: {}", e)))?;
    }

    let template_path = if record.nametag_template.is_empty() {
        None
    } else {
        Some(PathBuf::from(record.nametag_template))
    };

    Ok(Session {
        api_key: record.api_key,
        registry: AttendeeRegistry::from_parts(event, attendees),
        nametag: NametagSettings {
            template_path,
            binder,
            custom_step,
        },
    })
}
