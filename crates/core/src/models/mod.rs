//! Data models for Tagdesk

mod attendee;
mod binding;
mod event;

pub use attendee::*;
pub use binding::*;
pub use event::*;
