//! Attendee registry - the attendees of the active event
//!
//! The registry owns every attendee known to the session, keyed by
//! attendee id and iterated in ascending id order. Refreshes from the
//! ticketing platform go through [`ingest`] and [`AttendeeRegistry::merge`]
//! so that print state survives a reload.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::invariants::assert_registry_invariants;
use crate::models::{Attendee, AttendeeField, Event, PrintStatus};

/// Result of parsing a batch of raw attendee records
#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// Successfully parsed attendees by id
    pub attendees: BTreeMap<String, Attendee>,
    /// One `MalformedRecord` error per rejected record
    pub rejected: Vec<Error>,
}

/// Parse raw ticketing records into attendees
///
/// A malformed record is rejected on its own; the rest of the batch still
/// ingests.
pub fn ingest(records: &[Value]) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();

    for record in records {
        match Attendee::from_record(record) {
            Ok(attendee) => {
                outcome
                    .attendees
                    .insert(attendee.id().to_string(), attendee);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected attendee record");
                outcome.rejected.push(e);
            }
        }
    }

    outcome
}

/// Counts of what a merge did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub inserted: usize,
    pub replaced: usize,
    pub kept: usize,
}

/// In-memory attendee store for the active event
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AttendeeRegistry {
    event: Option<Event>,
    attendees: BTreeMap<String, Attendee>,
}

impl AttendeeRegistry {
    /// Create an empty registry with no active event
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(event: Option<Event>, attendees: BTreeMap<String, Attendee>) -> Self {
        let registry = Self { event, attendees };
        assert_registry_invariants(&registry);
        registry
    }

    /// Make `event` the active event
    ///
    /// Switching to an event with a different id clears every attendee.
    /// Reloading the same event keeps them. Returns whether a clear happened.
    pub fn set_active_event(&mut self, event: Event) -> bool {
        let cleared = match &self.event {
            Some(current) if current.id != event.id => {
                tracing::info!(
                    from = %current.id,
                    to = %event.id,
                    discarded = self.attendees.len(),
                    "Switching event, clearing attendees"
                );
                self.attendees.clear();
                true
            }
            _ => false,
        };
        tracing::info!(event_id = %event.id, name = %event.name, "Loaded event");
        self.event = Some(event);
        cleared
    }

    pub fn active_event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    /// Merge a freshly ingested batch into the registry
    ///
    /// Unknown ids are inserted. Known ids are left alone unless
    /// `overwrite_profiles` is set, in which case the incoming record
    /// replaces the existing one but keeps its printing status.
    pub fn merge(
        &mut self,
        incoming: BTreeMap<String, Attendee>,
        overwrite_profiles: bool,
    ) -> MergeSummary {
        let mut summary = MergeSummary::default();

        for (id, mut attendee) in incoming {
            match self.attendees.get_mut(&id) {
                None => {
                    self.attendees.insert(id, attendee);
                    summary.inserted += 1;
                }
                Some(existing) if overwrite_profiles => {
                    attendee.printing_status = existing.printing_status;
                    *existing = attendee;
                    summary.replaced += 1;
                }
                Some(_) => summary.kept += 1,
            }
        }

        assert_registry_invariants(self);
        tracing::info!(
            inserted = summary.inserted,
            replaced = summary.replaced,
            kept = summary.kept,
            "Merged attendees"
        );
        summary
    }

    /// Get an attendee by id
    pub fn get(&self, id: &str) -> Option<&Attendee> {
        self.attendees.get(id)
    }

    /// Check if an attendee is registered
    pub fn contains(&self, id: &str) -> bool {
        self.attendees.contains_key(id)
    }

    /// All attendees in id order
    pub fn iter(&self) -> impl Iterator<Item = &Attendee> {
        self.attendees.values()
    }

    pub fn len(&self) -> usize {
        self.attendees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attendees.is_empty()
    }

    /// Drop every attendee, keeping the active event
    pub fn clear(&mut self) {
        self.attendees.clear();
    }

    /// Operator override of a printing status
    pub fn set_printing_status(&mut self, id: &str, status: PrintStatus) -> Result<()> {
        let attendee = self.get_mut(id)?;
        if attendee.printing_status != status {
            tracing::debug!(attendee_id = %id, from = %attendee.printing_status, to = %status, "Printing status changed");
        }
        attendee.printing_status = status;
        Ok(())
    }

    /// Operator edit of one string field
    pub fn update_field(&mut self, id: &str, field: AttendeeField, value: String) -> Result<()> {
        self.get_mut(id)?.set_field(field, value)
    }

    /// Ids of attendees still waiting for a nametag, in registry order
    pub fn unprinted_ids(&self) -> Vec<String> {
        self.attendees
            .values()
            .filter(|a| a.printing_status == PrintStatus::Unprinted)
            .map(|a| a.id().to_string())
            .collect()
    }

    /// Number of attendees per printing status
    pub fn status_counts(&self) -> BTreeMap<PrintStatus, usize> {
        let mut counts: BTreeMap<PrintStatus, usize> = BTreeMap::new();
        for attendee in self.attendees.values() {
            *counts.entry(attendee.printing_status).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct trimmed values of a field with how many attendees carry each
    pub fn value_counts(&self, field: AttendeeField) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for attendee in self.attendees.values() {
            *counts
                .entry(attendee.field(field).trim().to_string())
                .or_insert(0) += 1;
        }
        counts
    }

    /// Rewrite field values in bulk
    ///
    /// Each attendee whose trimmed value equals a key of `replacements` gets
    /// the trimmed replacement. Blank replacements are ignored. Returns the
    /// number of attendees changed.
    pub fn replace_values(
        &mut self,
        field: AttendeeField,
        replacements: &BTreeMap<String, String>,
    ) -> Result<usize> {
        if field == AttendeeField::AttendeeId {
            return Err(Error::InvalidOperation(
                "attendee ids cannot be replaced".into(),
            ));
        }

        let mut changed = 0;
        for attendee in self.attendees.values_mut() {
            let current = attendee.field(field).trim();
            let Some(replacement) = replacements.get(current) else {
                continue;
            };
            let replacement = replacement.trim();
            if replacement.is_empty() {
                continue;
            }
            let replacement = replacement.to_string();
            attendee.set_field(field, replacement)?;
            changed += 1;
        }

        tracing::info!(field = %field, changed, "Applied value replacements");
        Ok(changed)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Attendee> {
        self.attendees
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("attendee {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, first: &str, company: &str, barcode: &str) -> Value {
        json!({
            "id": id,
            "profile": {
                "first_name": first,
                "last_name": "Tester",
                "email": format!("{}@example.com", id),
                "company": company
            },
            "barcodes": [{ "barcode": barcode }]
        })
    }

    fn event(id: &str) -> Event {
        Event::from_value(json!({
            "id": id,
            "name": { "text": format!("Event {}", id) },
            "start": { "local": "2026-05-05T09:00:00" },
            "organization_id": "1"
        }))
        .unwrap()
    }

    fn loaded_registry() -> AttendeeRegistry {
        let mut registry = AttendeeRegistry::new();
        registry.set_active_event(event("100"));
        let outcome = ingest(&[
            record("a", "Alice", "Acme", "111"),
            record("b", "Bob", " acme corp ", "222"),
        ]);
        registry.merge(outcome.attendees, false);
        registry
    }

    #[test]
    fn test_ingest_keeps_good_records() {
        let outcome = ingest(&[
            record("a", " Alice ", "Acme", "111"),
            json!({ "id": "broken", "profile": { "email": "x@y.z" } }),
            record("c", "Carol", "Initech", "333"),
        ]);
        assert_eq!(outcome.attendees.len(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert!(matches!(
            &outcome.rejected[0],
            Error::MalformedRecord { record, .. } if record == "broken"
        ));
        let alice = &outcome.attendees["a"];
        assert_eq!(alice.first_name, "Alice");
        assert_eq!(alice.printing_status, PrintStatus::Unprinted);
    }

    #[test]
    fn test_merge_without_overwrite_keeps_existing() {
        let mut registry = loaded_registry();
        registry.set_printing_status("a", PrintStatus::Printed).unwrap();
        let before = registry.get("a").unwrap().clone();

        let outcome = ingest(&[
            record("a", "Alicia", "Other", "999"),
            record("c", "Carol", "Initech", "333"),
        ]);
        let summary = registry.merge(outcome.attendees, false);

        assert_eq!(
            summary,
            MergeSummary {
                inserted: 1,
                replaced: 0,
                kept: 1
            }
        );
        assert_eq!(registry.get("a").unwrap(), &before);
        assert!(registry.contains("c"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_merge_with_overwrite_preserves_status() {
        let mut registry = loaded_registry();
        registry.set_printing_status("a", PrintStatus::Excluded).unwrap();

        let outcome = ingest(&[record("a", "Alicia", "Other", "999")]);
        let summary = registry.merge(outcome.attendees, true);

        assert_eq!(summary.replaced, 1);
        let alice = registry.get("a").unwrap();
        assert_eq!(alice.first_name, "Alicia");
        assert_eq!(alice.company, "Other");
        assert_eq!(alice.barcode, "999");
        assert_eq!(alice.printing_status, PrintStatus::Excluded);
    }

    #[test]
    fn test_same_event_reload_keeps_attendees() {
        let mut registry = loaded_registry();
        assert!(!registry.set_active_event(event("100")));
        assert!(!registry.set_active_event(event("100")));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_switching_event_clears_attendees() {
        let mut registry = loaded_registry();
        assert!(registry.set_active_event(event("200")));
        assert!(registry.is_empty());
        assert_eq!(registry.active_event().unwrap().id, "200");
    }

    #[test]
    fn test_first_event_does_not_clear() {
        let mut registry = AttendeeRegistry::new();
        registry.merge(ingest(&[record("a", "A", "", "1")]).attendees, false);
        assert!(!registry.set_active_event(event("9")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_status_override_unknown_attendee() {
        let mut registry = loaded_registry();
        assert!(matches!(
            registry.set_printing_status("zzz", PrintStatus::Printed),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_value_counts_and_replacement() {
        let mut registry = loaded_registry();
        registry.merge(ingest(&[record("c", "Carol", "Acme", "3")]).attendees, false);

        let counts = registry.value_counts(AttendeeField::Company);
        assert_eq!(counts.get("Acme"), Some(&2));
        assert_eq!(counts.get("acme corp"), Some(&1));

        let mut replacements = BTreeMap::new();
        replacements.insert("acme corp".to_string(), " Acme ".to_string());
        replacements.insert("Acme".to_string(), "   ".to_string());
        let changed = registry
            .replace_values(AttendeeField::Company, &replacements)
            .unwrap();

        assert_eq!(changed, 1);
        assert_eq!(registry.get("b").unwrap().company, "Acme");
        assert_eq!(registry.value_counts(AttendeeField::Company).get("Acme"), Some(&3));
    }

    #[test]
    fn test_unprinted_ids_in_order() {
        let mut registry = loaded_registry();
        registry.merge(ingest(&[record("0", "Zed", "", "0")]).attendees, false);
        registry.set_printing_status("a", PrintStatus::Printed).unwrap();
        assert_eq!(registry.unprinted_ids(), vec!["0".to_string(), "b".to_string()]);

        let counts = registry.status_counts();
        assert_eq!(counts.get(&PrintStatus::Printed), Some(&1));
        assert_eq!(counts.get(&PrintStatus::Unprinted), Some(&2));
    }
}
