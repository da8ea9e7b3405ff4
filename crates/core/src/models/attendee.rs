//! Attendee model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Print state of a nametag, in persisted ordinal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PrintStatus {
    /// Nametag has been produced
    Printed = 0,
    /// Waiting for the next generation run
    Unprinted = 1,
    /// Operator chose never to print this attendee
    Excluded = 2,
}

impl PrintStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            PrintStatus::Printed => "Printed",
            PrintStatus::Unprinted => "Unprinted",
            PrintStatus::Excluded => "Excluded",
        }
    }

    /// Persisted ordinal
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Inverse of [`PrintStatus::ordinal`], `None` when out of range
    pub fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            0 => Some(PrintStatus::Printed),
            1 => Some(PrintStatus::Unprinted),
            2 => Some(PrintStatus::Excluded),
            _ => None,
        }
    }

    pub fn all() -> &'static [PrintStatus] {
        &[
            PrintStatus::Printed,
            PrintStatus::Unprinted,
            PrintStatus::Excluded,
        ]
    }
}

impl std::fmt::Display for PrintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// String fields of an [`Attendee`] addressable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttendeeField {
    AttendeeId,
    FirstName,
    LastName,
    Email,
    Position,
    Company,
    Barcode,
}

impl AttendeeField {
    /// Look up a field by its persisted name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|f| f.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AttendeeField::AttendeeId => "attendee_id",
            AttendeeField::FirstName => "first_name",
            AttendeeField::LastName => "last_name",
            AttendeeField::Email => "email",
            AttendeeField::Position => "position",
            AttendeeField::Company => "company",
            AttendeeField::Barcode => "barcode",
        }
    }

    /// Like [`AttendeeField::from_name`], failing with `UnknownField`
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_name(name).ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    pub fn all() -> &'static [AttendeeField] {
        &[
            AttendeeField::AttendeeId,
            AttendeeField::FirstName,
            AttendeeField::LastName,
            AttendeeField::Email,
            AttendeeField::Position,
            AttendeeField::Company,
            AttendeeField::Barcode,
        ]
    }
}

impl std::fmt::Display for AttendeeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One ticket holder of the active event
#[derive(Debug, Clone, PartialEq)]
pub struct Attendee {
    id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub company: String,
    pub barcode: String,
    pub printing_status: PrintStatus,
    /// Original ticketing record, kept for fields not modeled here
    pub raw_data: Value,
}

impl Attendee {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            position: String::new(),
            company: String::new(),
            barcode: String::new(),
            printing_status: PrintStatus::Unprinted,
            raw_data: Value::Null,
        }
    }

    /// Build an attendee from a raw ticketing record
    ///
    /// Requires `id`, `profile.email` and `barcodes[0].barcode`. Every
    /// string is trimmed and the status starts as `Unprinted`.
    pub fn from_record(record: &Value) -> Result<Self> {
        let id = match record.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(Error::MalformedRecord {
                    record: "<unknown>".to_string(),
                    field: "id",
                })
            }
        };

        let missing = |field: &'static str| Error::MalformedRecord {
            record: id.clone(),
            field,
        };

        let profile = record.get("profile").ok_or_else(|| missing("profile"))?;
        let email = profile
            .get("email")
            .and_then(Value::as_str)
            .ok_or_else(|| missing("profile.email"))?;
        let barcode = record
            .get("barcodes")
            .and_then(|b| b.get(0))
            .and_then(|b| b.get("barcode"))
            .and_then(Value::as_str)
            .ok_or_else(|| missing("barcodes[0].barcode"))?;

        let optional = |key: &str| {
            profile
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        Ok(Self {
            first_name: optional("first_name"),
            last_name: optional("last_name"),
            email: email.trim().to_string(),
            position: optional("job_title"),
            company: optional("company"),
            barcode: barcode.trim().to_string(),
            printing_status: PrintStatus::Unprinted,
            raw_data: record.clone(),
            id,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Read a string field by name
    pub fn field(&self, field: AttendeeField) -> &str {
        match field {
            AttendeeField::AttendeeId => &self.id,
            AttendeeField::FirstName => &self.first_name,
            AttendeeField::LastName => &self.last_name,
            AttendeeField::Email => &self.email,
            AttendeeField::Position => &self.position,
            AttendeeField::Company => &self.company,
            AttendeeField::Barcode => &self.barcode,
        }
    }

    /// Overwrite a string field; the id is read-only
    pub fn set_field(&mut self, field: AttendeeField, value: String) -> Result<()> {
        let slot = match field {
            AttendeeField::AttendeeId => {
                return Err(Error::InvalidOperation(format!(
                    "attendee id of {} cannot be edited",
                    self.id
                )))
            }
            AttendeeField::FirstName => &mut self.first_name,
            AttendeeField::LastName => &mut self.last_name,
            AttendeeField::Email => &mut self.email,
            AttendeeField::Position => &mut self.position,
            AttendeeField::Company => &mut self.company,
            AttendeeField::Barcode => &mut self.barcode,
        };
        *slot = value;
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
