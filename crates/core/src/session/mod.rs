//! Operator session
//!
//! A [`Session`] bundles everything an operator works with: the ticketing
//! credential, the attendee registry of the active event and the nametag
//! settings. It can be captured and restored at any point through
//! [`record`] and persisted with [`SessionStore`].

pub mod record;
mod store;

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::registry::{ingest, AttendeeRegistry, MergeSummary};
use crate::render::{self, GenerateOptions, GenerateReport, StepRegistry};
use crate::template::{ContextBinder, TemplateEngine};
use crate::ticketing::TicketingApi;

pub use record::{restore, snapshot, AttendeeRecord, SessionRecord};
pub use store::{SessionStore, QUICKSAVE_FILE};

/// Nametag generation settings carried by a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NametagSettings {
    pub template_path: Option<PathBuf>,
    pub binder: ContextBinder,
    /// Index of the selected built-in render step
    pub custom_step: Option<usize>,
}

impl NametagSettings {
    /// Names of the steps to run, resolved against `steps`
    pub fn selected_steps(&self, steps: &StepRegistry) -> Result<Vec<String>> {
        match self.custom_step {
            None => Ok(Vec::new()),
            Some(index) => steps
                .by_index(index)
                .map(|s| vec![s.name.to_string()])
                .ok_or_else(|| Error::UnknownRenderStep(format!("#{}", index))),
        }
    }
}

/// Result of reloading the active event from the ticketing platform
#[derive(Debug)]
pub struct RefreshReport {
    /// Whether switching events discarded the previous attendees
    pub cleared: bool,
    pub merge: MergeSummary,
    /// Rejected raw records
    pub rejected: Vec<Error>,
}

/// The operator's working state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub api_key: String,
    pub registry: AttendeeRegistry,
    pub nametag: NametagSettings,
}

impl Session {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> SessionRecord {
        snapshot(self)
    }

    /// Replace this session with `record`, leaving it untouched on failure
    pub fn restore_in_place(&mut self, record: SessionRecord) -> Result<()> {
        *self = restore(record)?;
        Ok(())
    }

    /// Fetch an event and its attendees, then activate and merge them
    ///
    /// Both fetches complete before any state changes, so a connection
    /// failure leaves the session as it was.
    pub fn load_event(
        &mut self,
        api: &dyn TicketingApi,
        event_id: &str,
        overwrite_profiles: bool,
    ) -> Result<RefreshReport> {
        let event = api.fetch_event(event_id)?;
        let records = api.fetch_attendee_records(&event.id)?;
        tracing::info!(event_id = %event.id, records = records.len(), "Downloaded attendees");

        let cleared = self.registry.set_active_event(event);
        let outcome = ingest(&records);
        let merge = self.registry.merge(outcome.attendees, overwrite_profiles);

        Ok(RefreshReport {
            cleared,
            merge,
            rejected: outcome.rejected,
        })
    }

    /// Select a template document, pruning bindings it no longer declares
    pub fn set_template(&mut self, path: &Path, engine: &dyn TemplateEngine) -> Result<usize> {
        let discovered = ContextBinder::discover_variables(engine)?;
        let pruned = self.nametag.binder.retain(&discovered);
        self.nametag.template_path = Some(path.to_path_buf());
        tracing::info!(
            path = %path.display(),
            variables = discovered.len(),
            pruned,
            "Selected nametag template"
        );
        Ok(pruned)
    }

    /// Run the render pipeline with this session's settings
    pub fn generate(
        &mut self,
        engine: &mut dyn TemplateEngine,
        steps: &StepRegistry,
        output_dir: &Path,
        mark_printed: bool,
    ) -> Result<GenerateReport> {
        let selected = self.nametag.selected_steps(steps)?;
        let options = GenerateOptions {
            output_dir,
            steps: &selected,
            mark_printed,
        };
        render::generate(
            &mut self.registry,
            engine,
            &self.nametag.binder,
            steps,
            &options,
        )
    }
}
