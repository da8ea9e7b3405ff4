//! Nametag document templates
//!
//! The render pipeline talks to documents only through [`TemplateEngine`],
//! allowing for different document backends. [`TextTemplate`] is the
//! built-in backend for text, SVG, HTML and XML nametags.

mod binder;
mod text;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::Result;

pub use binder::ContextBinder;
pub use text::TextTemplate;

/// Substitution context handed to [`TemplateEngine::render`]
pub type RenderContext = BTreeMap<String, String>;

/// Document template operations used while generating nametags
///
/// A loaded engine is the template handle. Render state (the rendered
/// output and any replaced pictures) is transient and must be dropped by
/// [`TemplateEngine::reset_transient_state`] between attendees.
pub trait TemplateEngine {
    /// Undeclared placeholder names found in the template
    fn discover_variables(&self) -> Result<BTreeSet<String>>;

    /// Forget everything rendered or replaced since the template was loaded
    fn reset_transient_state(&mut self) -> Result<()>;

    /// Swap the picture called `slot` for the image at `image_path`
    fn replace_named_image(&mut self, slot: &str, image_path: &Path) -> Result<()>;

    /// Substitute placeholders with `context`
    fn render(&mut self, context: &RenderContext) -> Result<()>;

    /// Write the rendered document
    fn save(&mut self, output_path: &Path) -> Result<()>;

    /// File extension (without the dot) for saved documents
    fn output_extension(&self) -> &str;
}
