//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use crate::registry::AttendeeRegistry;
use crate::template::ContextBinder;

/// Validate that every registry key matches the attendee stored under it
pub fn assert_registry_invariants(registry: &AttendeeRegistry) {
    for attendee in registry.iter() {
        debug_assert!(
            !attendee.id().is_empty(),
            "Registry holds an attendee with an empty id"
        );
        debug_assert!(
            registry
                .get(attendee.id())
                .is_some_and(|stored| std::ptr::eq(stored, attendee)),
            "Attendee {} is stored under a different key",
            attendee.id()
        );
    }
}

/// Validate that binding rows agree with the keys they are stored under
pub fn assert_binder_invariants(binder: &ContextBinder) {
    for (name, binding) in binder.iter() {
        debug_assert_eq!(
            name.as_str(),
            binding.variable_name.as_str(),
            "Binding for {} is stored under key {}",
            binding.variable_name,
            name
        );
        debug_assert!(
            !name.trim().is_empty(),
            "Binder holds a binding with an empty variable name"
        );
    }
}
