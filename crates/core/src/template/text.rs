//! Text document template backend
//!
//! Templates are UTF-8 documents with `{{ name }}` placeholders and
//! `[[slot]]` image slots. SVG nametags would typically write a slot as
//! `<image href="[[qr_code]]" .../>`.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};

use super::{RenderContext, TemplateEngine};

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
    })
}

fn image_slot_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[\[\s*([A-Za-z_][A-Za-z0-9_]*)\s*\]\]").expect("image slot pattern is valid")
    })
}

/// Extensions whose documents get XML escaping by default
const MARKUP_EXTENSIONS: &[&str] = &["svg", "html", "htm", "xml"];

/// A loaded text template
#[derive(Debug, Clone)]
pub struct TextTemplate {
    source_path: PathBuf,
    source: String,
    extension: String,
    autoescape: bool,
    images: HashMap<String, PathBuf>,
    rendered: Option<String>,
}

impl TextTemplate {
    /// Load a template document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("txt")
            .to_ascii_lowercase();
        tracing::info!(path = %path.display(), "Loaded nametag template");

        let mut template = Self::from_source(source, extension);
        template.source_path = path.to_path_buf();
        Ok(template)
    }

    /// Build a template from in-memory text
    pub fn from_source(source: impl Into<String>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        let autoescape = MARKUP_EXTENSIONS.contains(&extension.as_str());
        Self {
            source_path: PathBuf::new(),
            source: source.into(),
            extension,
            autoescape,
            images: HashMap::new(),
            rendered: None,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Image slot names declared by the document
    pub fn image_slots(&self) -> BTreeSet<String> {
        image_slot_pattern()
            .captures_iter(&self.source)
            .map(|c| c[1].to_string())
            .collect()
    }

    /// Rendered output, if [`TemplateEngine::render`] ran since the last reset
    pub fn rendered(&self) -> Option<&str> {
        self.rendered.as_deref()
    }

    fn escape(&self, value: &str) -> String {
        if !self.autoescape {
            return value.to_string();
        }
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        out
    }
}

impl TemplateEngine for TextTemplate {
    fn discover_variables(&self) -> Result<BTreeSet<String>> {
        Ok(placeholder_pattern()
            .captures_iter(&self.source)
            .map(|c| c[1].to_string())
            .collect())
    }

    fn reset_transient_state(&mut self) -> Result<()> {
        self.images.clear();
        self.rendered = None;
        Ok(())
    }

    fn replace_named_image(&mut self, slot: &str, image_path: &Path) -> Result<()> {
        if !self.image_slots().contains(slot) {
            return Err(Error::TemplateEngine(format!(
                "template has no image slot named '{}'",
                slot
            )));
        }
        self.images.insert(slot.to_string(), image_path.to_path_buf());
        Ok(())
    }

    fn render(&mut self, context: &RenderContext) -> Result<()> {
        let with_values = placeholder_pattern().replace_all(&self.source, |caps: &Captures| {
            match context.get(&caps[1]) {
                Some(value) => self.escape(value),
                None => {
                    tracing::debug!(variable = &caps[1], "No value for template variable");
                    String::new()
                }
            }
        });
        let rendered = image_slot_pattern().replace_all(&with_values, |caps: &Captures| {
            self.images
                .get(&caps[1])
                .map(|p| self.escape(&p.display().to_string()))
                .unwrap_or_default()
        });
        self.rendered = Some(rendered.into_owned());
        Ok(())
    }

    fn save(&mut self, output_path: &Path) -> Result<()> {
        let rendered = self.rendered.as_deref().ok_or_else(|| {
            Error::TemplateEngine("template saved before it was rendered".into())
        })?;
        fs::write(output_path, rendered)?;
        tracing::debug!(path = %output_path.display(), "Saved nametag document");
        Ok(())
    }

    fn output_extension(&self) -> &str {
        &self.extension
    }
}
