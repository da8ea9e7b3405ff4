//! Render step registry
//!
//! Render steps run against the template before the substitution render,
//! once per attendee. The registry is a fixed table built at startup and
//! looked up by step name.

use std::path::Path;

use crate::error::{Error, Result};
use crate::models::Attendee;
use crate::template::TemplateEngine;

use super::qr;

/// Signature of a render step
///
/// A step may write auxiliary files next to `output_path` and change the
/// engine's picture bindings, but never touches the attendee.
pub type StepFn = fn(&mut dyn TemplateEngine, &Attendee, &Path) -> Result<()>;

/// A named per-nametag pre-processing action
#[derive(Clone, Copy)]
pub struct RenderStep {
    /// Stable identifier used in configuration
    pub name: &'static str,
    /// Human-readable label for pickers
    pub label: &'static str,
    run: StepFn,
}

impl RenderStep {
    pub const fn new(name: &'static str, label: &'static str, run: StepFn) -> Self {
        Self { name, label, run }
    }

    pub fn run(
        &self,
        engine: &mut dyn TemplateEngine,
        attendee: &Attendee,
        output_path: &Path,
    ) -> Result<()> {
        (self.run)(engine, attendee, output_path)
    }
}

impl std::fmt::Debug for RenderStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderStep")
            .field("name", &self.name)
            .field("label", &self.label)
            .finish()
    }
}

/// Ordered table of available render steps
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    steps: Vec<RenderStep>,
}

impl StepRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in steps
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(RenderStep::new(
            qr::STEP_NAME,
            "Embed QR from barcode",
            qr::embed_qr_from_barcode,
        ));
        registry
    }

    /// Add a step, replacing any step with the same name in place
    pub fn register(&mut self, step: RenderStep) {
        match self.steps.iter_mut().find(|s| s.name == step.name) {
            Some(existing) => *existing = step,
            None => self.steps.push(step),
        }
    }

    /// Get a step by name
    pub fn get(&self, name: &str) -> Option<&RenderStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Get a step by its position in the table
    pub fn by_index(&self, index: usize) -> Option<&RenderStep> {
        self.steps.get(index)
    }

    /// Position of a step in the table
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name == name)
    }

    /// Resolve an ordered list of step names, failing on the first unknown one
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&RenderStep>> {
        names
            .iter()
            .map(|name| {
                self.get(name.as_ref())
                    .ok_or_else(|| Error::UnknownRenderStep(name.as_ref().to_string()))
            })
            .collect()
    }

    /// All step names in table order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
