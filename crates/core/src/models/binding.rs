//! Template binding model

use serde::{Deserialize, Serialize};

/// One row of the nametag binding table
///
/// A field reference resolves `value` against each attendee; otherwise
/// `value` is a literal shared by every nametag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBinding {
    pub variable_name: String,
    pub is_field_reference: bool,
    pub value: String,
}

impl TemplateBinding {
    pub fn literal(variable_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            variable_name: variable_name.into(),
            is_field_reference: false,
            value: value.into(),
        }
    }

    pub fn field(variable_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            variable_name: variable_name.into(),
            is_field_reference: true,
            value: field_name.into(),
        }
    }
}
