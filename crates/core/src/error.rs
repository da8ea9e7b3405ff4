//! Error types for Tagdesk Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed attendee record {record}: missing {field}")]
    MalformedRecord { record: String, field: &'static str },

    #[error("Malformed event: missing {0}")]
    MalformedEvent(&'static str),

    #[error("Unknown attendee field: {0}")]
    UnknownField(String),

    #[error("Corrupt session: {0}")]
    CorruptSession(String),

    #[error("Render step '{step}' failed: {reason}")]
    RenderStep { step: String, reason: String },

    #[error("Unknown render step: {0}")]
    UnknownRenderStep(String),

    #[error("Template engine error: {0}")]
    TemplateEngine(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Helper for building a render step failure
    pub fn render_step(step: &str, reason: impl std::fmt::Display) -> Self {
        Error::RenderStep {
            step: step.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
