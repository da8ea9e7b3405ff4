//! Tagdesk Core Library
//!
//! Attendee registry, session persistence, template binding, and the
//! nametag render pipeline for the Tagdesk check-in desk.

pub mod error;
pub mod invariants;
pub mod models;
pub mod registry;
pub mod render;
pub mod session;
pub mod template;
pub mod ticketing;

pub use error::{Error, Result};
pub use models::*;
pub use registry::{ingest, AttendeeRegistry, IngestOutcome, MergeSummary};
pub use render::{
    generate, nametag_path, GenerateOptions, GenerateReport, NametagFailure, RenderStep,
    StepRegistry,
};
pub use session::{NametagSettings, RefreshReport, Session, SessionRecord, SessionStore};
pub use template::{ContextBinder, RenderContext, TemplateEngine, TextTemplate};
pub use ticketing::TicketingApi;
