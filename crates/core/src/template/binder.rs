//! Template context binder
//!
//! Maps each template placeholder to either a literal or an attendee field
//! and resolves the table into a render context per attendee.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::invariants::assert_binder_invariants;
use crate::models::{Attendee, AttendeeField, TemplateBinding};

use super::{RenderContext, TemplateEngine};

/// Binding table keyed by variable name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBinder {
    bindings: BTreeMap<String, TemplateBinding>,
}

impl ContextBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder names the template still expects values for
    pub fn discover_variables(engine: &dyn TemplateEngine) -> Result<BTreeSet<String>> {
        engine.discover_variables()
    }

    /// Insert or replace the binding of `variable_name`
    ///
    /// Returns the binding it replaced, if any. A blank variable name is
    /// an `InvalidOperation`.
    pub fn bind(
        &mut self,
        variable_name: impl Into<String>,
        is_field_reference: bool,
        value: impl Into<String>,
    ) -> Result<Option<TemplateBinding>> {
        let variable_name = variable_name.into();
        if variable_name.trim().is_empty() {
            return Err(Error::InvalidOperation(
                "template variable name cannot be blank".into(),
            ));
        }

        let binding = if is_field_reference {
            TemplateBinding::field(variable_name, value)
        } else {
            TemplateBinding::literal(variable_name, value)
        };
        tracing::debug!(
            variable = %binding.variable_name,
            field = binding.is_field_reference,
            value = %binding.value,
            "Bound template variable"
        );
        let previous = self.bindings.insert(binding.variable_name.clone(), binding);
        assert_binder_invariants(self);
        Ok(previous)
    }

    pub fn unbind(&mut self, variable_name: &str) -> Option<TemplateBinding> {
        self.bindings.remove(variable_name)
    }

    pub fn get(&self, variable_name: &str) -> Option<&TemplateBinding> {
        self.bindings.get(variable_name)
    }

    /// Bindings in variable name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TemplateBinding)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Build the substitution context for one attendee
    pub fn resolve(&self, attendee: &Attendee) -> Result<RenderContext> {
        self.bindings
            .values()
            .map(|binding| {
                let value = if binding.is_field_reference {
                    attendee.field(AttendeeField::parse(&binding.value)?).to_string()
                } else {
                    binding.value.clone()
                };
                Ok((binding.variable_name.clone(), value))
            })
            .collect()
    }

    /// Fail on the first field reference that names no attendee field
    pub fn validate(&self) -> Result<()> {
        match self
            .bindings
            .values()
            .find(|b| b.is_field_reference && AttendeeField::from_name(&b.value).is_none())
        {
            Some(bad) => Err(Error::UnknownField(bad.value.clone())),
            None => Ok(()),
        }
    }

    /// Discovered variables that have no binding yet
    pub fn unbound<'a>(&self, discovered: &'a BTreeSet<String>) -> Vec<&'a str> {
        discovered
            .iter()
            .filter(|name| !self.bindings.contains_key(name.as_str()))
            .map(|name| name.as_str())
            .collect()
    }

    /// Drop bindings for variables the template no longer declares
    pub fn retain(&mut self, discovered: &BTreeSet<String>) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|name, _| discovered.contains(name));
        before - self.bindings.len()
    }
}
