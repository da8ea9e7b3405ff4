//! Nametag render pipeline
//!
//! Generates one document per unprinted attendee:
//!
//! 1. Reset the engine's transient state
//! 2. Run the selected render steps in order
//! 3. Resolve the binder against the attendee and render
//! 4. Save to `<output_dir>/nametag_<id>.<ext>`
//! 5. Optionally mark the attendee as printed
//!
//! A failing attendee is recorded in the report and the batch moves on.
//! Printed and excluded attendees are never touched, so re-running a
//! generation only picks up what is left.

pub mod qr;
mod steps;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::{Attendee, PrintStatus};
use crate::registry::AttendeeRegistry;
use crate::template::{ContextBinder, TemplateEngine};

pub use steps::{RenderStep, StepFn, StepRegistry};

/// One attendee whose nametag could not be produced
#[derive(Debug)]
pub struct NametagFailure {
    pub attendee_id: String,
    pub error: Error,
}

/// Outcome of a generation run
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Saved documents, in processing order
    pub generated: Vec<PathBuf>,
    /// Per-attendee failures
    pub failures: Vec<NametagFailure>,
    /// Attendees skipped because they were printed or excluded
    pub skipped: usize,
}

impl GenerateReport {
    pub fn success_count(&self) -> usize {
        self.generated.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Options for [`generate`]
#[derive(Debug, Clone)]
pub struct GenerateOptions<'a> {
    pub output_dir: &'a Path,
    /// Render step names, run in this order for every attendee
    pub steps: &'a [String],
    pub mark_printed: bool,
}

/// Output document path for an attendee
///
/// ASCII letters, digits and `-` are kept. Every other byte of the id is
/// written as `_XX` hex, so distinct ids never share a file.
pub fn nametag_path(output_dir: &Path, attendee_id: &str, extension: &str) -> PathBuf {
    let mut safe_id = String::with_capacity(attendee_id.len());
    for c in attendee_id.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            safe_id.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                safe_id.push_str(&format!("_{:02X}", byte));
            }
        }
    }
    output_dir.join(format!("nametag_{}.{}", safe_id, extension))
}

/// Generate nametags for every unprinted attendee
///
/// Fails up front on an unknown step name or an unusable output directory;
/// after that, failures are per attendee and land in the report.
pub fn generate(
    registry: &mut AttendeeRegistry,
    engine: &mut dyn TemplateEngine,
    binder: &ContextBinder,
    step_registry: &StepRegistry,
    options: &GenerateOptions<'_>,
) -> Result<GenerateReport> {
    let steps = step_registry.select(options.steps)?;
    fs::create_dir_all(options.output_dir)?;

    let pending = registry.unprinted_ids();
    let mut report = GenerateReport {
        skipped: registry.len() - pending.len(),
        ..GenerateReport::default()
    };

    tracing::info!(
        pending = pending.len(),
        skipped = report.skipped,
        steps = ?options.steps,
        output_dir = %options.output_dir.display(),
        "Generating nametags"
    );

    for id in pending {
        let Some(attendee) = registry.get(&id) else {
            continue;
        };
        let output_path = nametag_path(options.output_dir, &id, engine.output_extension());

        match render_one(engine, binder, &steps, attendee, &output_path) {
            Ok(()) => {
                if options.mark_printed {
                    registry.set_printing_status(&id, PrintStatus::Printed)?;
                }
                tracing::info!(attendee_id = %id, path = %output_path.display(), "Generated nametag");
                report.generated.push(output_path);
            }
            Err(error) => {
                tracing::warn!(attendee_id = %id, error = %error, "Failed to generate nametag");
                report.failures.push(NametagFailure {
                    attendee_id: id,
                    error,
                });
            }
        }
    }

    tracing::info!(
        generated = report.success_count(),
        failed = report.failures.len(),
        "Nametag generation finished"
    );
    Ok(report)
}

fn render_one(
    engine: &mut dyn TemplateEngine,
    binder: &ContextBinder,
    steps: &[&RenderStep],
    attendee: &Attendee,
    output_path: &Path,
) -> Result<()> {
    engine.reset_transient_state()?;
    for step in steps {
        step.run(engine, attendee, output_path)?;
    }
    let context = binder.resolve(attendee)?;
    engine.render(&context)?;
    engine.save(output_path)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording template engine for pipeline tests

    use std::collections::BTreeSet;
    use std::path::{Path, PathBuf};

    use crate::error::{Error, Result};
    use crate::template::{RenderContext, TemplateEngine};

    #[derive(Debug, Default)]
    pub struct RecordingEngine {
        pub calls: Vec<String>,
        pub images: Vec<(String, PathBuf)>,
        pub contexts: Vec<RenderContext>,
        pub saved: Vec<PathBuf>,
        /// Saves to paths containing this string fail
        pub fail_save_containing: Option<String>,
        pub pending_images: usize,
    }

    impl TemplateEngine for RecordingEngine {
        fn discover_variables(&self) -> Result<BTreeSet<String>> {
            Ok(["Company", "FullName"].iter().map(|s| s.to_string()).collect())
        }

        fn reset_transient_state(&mut self) -> Result<()> {
            self.calls.push("reset".into());
            self.pending_images = 0;
            Ok(())
        }

        fn replace_named_image(&mut self, slot: &str, image_path: &Path) -> Result<()> {
            self.calls.push(format!("image:{}", slot));
            self.pending_images += 1;
            self.images.push((slot.to_string(), image_path.to_path_buf()));
            Ok(())
        }

        fn render(&mut self, context: &RenderContext) -> Result<()> {
            self.calls.push(format!("render:{}", self.pending_images));
            self.contexts.push(context.clone());
            Ok(())
        }

        fn save(&mut self, output_path: &Path) -> Result<()> {
            self.calls.push("save".into());
            if let Some(needle) = &self.fail_save_containing {
                if output_path.to_string_lossy().contains(needle.as_str()) {
                    return Err(Error::TemplateEngine("disk full".into()));
                }
            }
            std::fs::write(output_path, "nametag")?;
            self.saved.push(output_path.to_path_buf());
            Ok(())
        }

        fn output_extension(&self) -> &str {
            "txt"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingEngine;
    use super::*;
    use crate::models::AttendeeField;
    use crate::registry::ingest;
    use crate::template::TextTemplate;
    use serde_json::json;
    use tempfile::TempDir;

    fn registry_abc() -> AttendeeRegistry {
        let records: Vec<_> = ["A", "B", "C"]
            .iter()
            .map(|id| {
                json!({
                    "id": id,
                    "profile": {
                        "first_name": format!("First{}", id),
                        "last_name": "Doe",
                        "email": format!("{}@example.com", id),
                        "company": format!("Company {}", id)
                    },
                    "barcodes": [{ "barcode": format!("BC-{}", id) }]
                })
            })
            .collect();
        let mut registry = AttendeeRegistry::new();
        registry.merge(ingest(&records).attendees, false);
        registry.set_printing_status("B", PrintStatus::Printed).unwrap();
        registry.set_printing_status("C", PrintStatus::Excluded).unwrap();
        registry
    }

    fn binder() -> ContextBinder {
        let mut binder = ContextBinder::new();
        binder.bind("Company", true, "company").unwrap();
        binder.bind("FullName", false, "Guest").unwrap();
        binder
    }

    fn qr_steps() -> Vec<String> {
        vec![qr::STEP_NAME.to_string()]
    }

    #[test]
    fn test_generate_only_unprinted() {
        let temp = TempDir::new().unwrap();
        let mut registry = registry_abc();
        let mut engine = RecordingEngine::default();
        let steps = qr_steps();
        let options = GenerateOptions {
            output_dir: temp.path(),
            steps: &steps,
            mark_printed: true,
        };

        let report = generate(
            &mut registry,
            &mut engine,
            &binder(),
            &StepRegistry::builtin(),
            &options,
        )
        .unwrap();

        assert_eq!(report.success_count(), 1);
        assert!(report.is_clean());
        assert_eq!(report.skipped, 2);
        assert_eq!(engine.saved, vec![temp.path().join("nametag_A.txt")]);
        assert_eq!(engine.contexts.len(), 1);
        assert_eq!(engine.contexts[0]["Company"], "Company A");
        assert_eq!(engine.contexts[0]["FullName"], "Guest");
        assert_eq!(
            engine.calls,
            vec!["reset", "image:qr_code", "render:1", "save"]
        );
        assert!(temp.path().join("nametag_A_qr.png").exists());

        assert_eq!(registry.get("A").unwrap().printing_status, PrintStatus::Printed);
        assert_eq!(registry.get("B").unwrap().printing_status, PrintStatus::Printed);
        assert_eq!(registry.get("C").unwrap().printing_status, PrintStatus::Excluded);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mut registry = registry_abc();
        let steps: Vec<String> = Vec::new();
        let options = GenerateOptions {
            output_dir: temp.path(),
            steps: &steps,
            mark_printed: true,
        };

        let mut first = RecordingEngine::default();
        generate(
            &mut registry,
            &mut first,
            &binder(),
            &StepRegistry::builtin(),
            &options,
        )
        .unwrap();

        let mut second = RecordingEngine::default();
        let report = generate(
            &mut registry,
            &mut second,
            &binder(),
            &StepRegistry::builtin(),
            &options,
        )
        .unwrap();
        assert_eq!(report.success_count(), 0);
        assert_eq!(report.skipped, 3);
        assert!(second.calls.is_empty());
    }

    #[test]
    fn test_without_mark_printed_status_unchanged() {
        let temp = TempDir::new().unwrap();
        let mut registry = registry_abc();
        let steps: Vec<String> = Vec::new();
        let options = GenerateOptions {
            output_dir: temp.path(),
            steps: &steps,
            mark_printed: false,
        };
        let mut engine = RecordingEngine::default();
        generate(
            &mut registry,
            &mut engine,
            &binder(),
            &StepRegistry::builtin(),
            &options,
        )
        .unwrap();

        assert_eq!(engine.saved.len(), 1);
        assert_eq!(registry.get("A").unwrap().printing_status, PrintStatus::Unprinted);
    }

    #[test]
    fn test_failed_save_is_reported_and_not_marked() {
        let temp = TempDir::new().unwrap();
        let mut registry = registry_abc();
        registry.set_printing_status("B", PrintStatus::Unprinted).unwrap();
        let steps: Vec<String> = Vec::new();
        let options = GenerateOptions {
            output_dir: temp.path(),
            steps: &steps,
            mark_printed: true,
        };
        let mut engine = RecordingEngine {
            fail_save_containing: Some("nametag_A".into()),
            ..RecordingEngine::default()
        };

        let report = generate(
            &mut registry,
            &mut engine,
            &binder(),
            &StepRegistry::builtin(),
            &options,
        )
        .unwrap();

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].attendee_id, "A");
        assert!(matches!(report.failures[0].error, Error::TemplateEngine(_)));
        assert_eq!(registry.get("A").unwrap().printing_status, PrintStatus::Unprinted);
        assert_eq!(registry.get("B").unwrap().printing_status, PrintStatus::Printed);
    }

    #[test]
    fn test_unknown_field_fails_single_attendee() {
        let temp = TempDir::new().unwrap();
        let mut registry = registry_abc();
        let mut bad = binder();
        bad.bind("Shoe", true, "shoe_size").unwrap();
        let steps: Vec<String> = Vec::new();
        let options = GenerateOptions {
            output_dir: temp.path(),
            steps: &steps,
            mark_printed: true,
        };
        let mut engine = RecordingEngine::default();

        let report = generate(
            &mut registry,
            &mut engine,
            &bad,
            &StepRegistry::builtin(),
            &options,
        )
        .unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].error, Error::UnknownField(_)));
        assert!(engine.saved.is_empty());
        assert_eq!(registry.get("A").unwrap().printing_status, PrintStatus::Unprinted);
    }

    #[test]
    fn test_unknown_step_aborts_before_processing() {
        let temp = TempDir::new().unwrap();
        let mut registry = registry_abc();
        let steps = vec!["sparkles".to_string()];
        let options = GenerateOptions {
            output_dir: temp.path(),
            steps: &steps,
            mark_printed: true,
        };
        let mut engine = RecordingEngine::default();

        assert!(matches!(
            generate(
                &mut registry,
                &mut engine,
                &binder(),
                &StepRegistry::builtin(),
                &options,
            ),
            Err(Error::UnknownRenderStep(_))
        ));
        assert!(engine.calls.is_empty());
    }

    #[test]
    fn test_images_do_not_leak_between_attendees() {
        let temp = TempDir::new().unwrap();
        let mut registry = registry_abc();
        registry.set_printing_status("B", PrintStatus::Unprinted).unwrap();

        let template_path = temp.path().join("badge.svg");
        fs::write(
            &template_path,
            r#"<svg><text>{{ Company }}</text><image href="[[qr_code]]"/></svg>"#,
        )
        .unwrap();
        let mut engine = TextTemplate::load(&template_path).unwrap();
        let out_dir = temp.path().join("out");
        let steps = qr_steps();
        let options = GenerateOptions {
            output_dir: &out_dir,
            steps: &steps,
            mark_printed: true,
        };

        let report = generate(
            &mut registry,
            &mut engine,
            &binder(),
            &StepRegistry::builtin(),
            &options,
        )
        .unwrap();
        assert_eq!(report.success_count(), 2);

        let b = fs::read_to_string(out_dir.join("nametag_B.svg")).unwrap();
        assert!(b.contains("Company B"));
        assert!(b.contains("nametag_B_qr.png"));
        assert!(!b.contains("nametag_A_qr.png"));
    }

    #[test]
    fn test_nametag_path_sanitizes_id() {
        assert_eq!(
            nametag_path(Path::new("out"), "12/34 x", "svg"),
            PathBuf::from("out/nametag_12_2F34_20x.svg")
        );
        assert_eq!(
            nametag_path(Path::new("out"), "1001-7", "svg"),
            PathBuf::from("out/nametag_1001-7.svg")
        );
    }

    #[test]
    fn test_nametag_path_distinct_for_distinct_ids() {
        let out = Path::new("out");
        let slash = nametag_path(out, "a/b", "svg");
        let underscore = nametag_path(out, "a_b", "svg");
        assert_ne!(slash, underscore);
        assert_eq!(underscore, PathBuf::from("out/nametag_a_5Fb.svg"));
        assert_eq!(
            nametag_path(out, "é", "txt"),
            PathBuf::from("out/nametag__C3_A9.txt")
        );
    }

    #[test]
    fn test_step_failure_fails_single_attendee() {
        let temp = TempDir::new().unwrap();
        let mut registry = registry_abc();
        registry.set_printing_status("B", PrintStatus::Unprinted).unwrap();
        registry
            .update_field("A", AttendeeField::Barcode, String::new())
            .unwrap();
        let steps = qr_steps();
        let options = GenerateOptions {
            output_dir: temp.path(),
            steps: &steps,
            mark_printed: true,
        };
        let mut engine = RecordingEngine::default();

        let report = generate(
            &mut registry,
            &mut engine,
            &binder(),
            &StepRegistry::builtin(),
            &options,
        )
        .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].attendee_id, "A");
        assert!(matches!(
            &report.failures[0].error,
            Error::RenderStep { step, .. } if step == qr::STEP_NAME
        ));
        assert_eq!(engine.saved, vec![temp.path().join("nametag_B.txt")]);
        assert!(!temp.path().join("nametag_A_qr.png").exists());
        assert_eq!(registry.get("A").unwrap().printing_status, PrintStatus::Unprinted);
        assert_eq!(registry.get("B").unwrap().printing_status, PrintStatus::Printed);
    }

    #[test]
    fn test_template_without_qr_slot_fails_step() {
        let temp = TempDir::new().unwrap();
        let mut registry = registry_abc();
        registry.set_printing_status("B", PrintStatus::Unprinted).unwrap();

        let template_path = temp.path().join("plain.svg");
        fs::write(&template_path, "<svg><text>{{ Company }}</text></svg>").unwrap();
        let mut engine = TextTemplate::load(&template_path).unwrap();
        let out_dir = temp.path().join("out");
        let steps = qr_steps();
        let options = GenerateOptions {
            output_dir: &out_dir,
            steps: &steps,
            mark_printed: true,
        };

        let report = generate(
            &mut registry,
            &mut engine,
            &binder(),
            &StepRegistry::builtin(),
            &options,
        )
        .unwrap();

        assert_eq!(report.success_count(), 0);
        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|f| matches!(f.error, Error::TemplateEngine(_))));
        assert!(!out_dir.join("nametag_A.svg").exists());
        assert_eq!(registry.get("A").unwrap().printing_status, PrintStatus::Unprinted);
        assert_eq!(registry.get("B").unwrap().printing_status, PrintStatus::Unprinted);
    }
}
