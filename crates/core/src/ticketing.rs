//! Ticketing platform interface
//!
//! The core only consumes the ticketing platform through this trait,
//! allowing for different implementations (HTTP client, fixtures).

use serde_json::Value;

use crate::error::Result;
use crate::models::{ApiUser, Event, EventSummary, Organization};

/// Read-only ticketing operations
pub trait TicketingApi {
    /// Account the credential belongs to
    fn fetch_current_user(&self) -> Result<ApiUser>;

    /// Organizations visible to the account
    fn fetch_organizations(&self) -> Result<Vec<Organization>>;

    /// Events owned by an organization
    fn fetch_events(&self, org_id: &str) -> Result<Vec<EventSummary>>;

    /// Full event object
    fn fetch_event(&self, event_id: &str) -> Result<Event>;

    /// Raw attendee records of an event, unparsed
    fn fetch_attendee_records(&self, event_id: &str) -> Result<Vec<Value>>;
}
