//! Eventbrite response bodies
//!
//! Listing endpoints wrap their items in a page object with a
//! `pagination` block. Events and attendees are kept as raw JSON so the
//! core can parse them and keep the original objects.

use serde::Deserialize;
use serde_json::Value;

use tagdesk_core::{ApiUser, Organization};

/// Pagination block of a listing response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub object_count: u64,
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub has_more_items: bool,
    #[serde(default)]
    pub continuation: Option<String>,
}

impl Pagination {
    /// Token for the next page, if there is one
    pub fn next_continuation(&self) -> Option<&str> {
        if self.has_more_items {
            self.continuation.as_deref()
        } else {
            None
        }
    }
}

/// A listing response page
pub trait Paged {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Pagination);
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserBody {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl From<UserBody> for ApiUser {
    fn from(body: UserBody) -> Self {
        ApiUser {
            id: body.id,
            name: body.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationBody {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl From<OrganizationBody> for Organization {
    fn from(body: OrganizationBody) -> Self {
        Organization {
            id: body.id,
            name: body.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationsPage {
    pub organizations: Vec<OrganizationBody>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl Paged for OrganizationsPage {
    type Item = OrganizationBody;

    fn into_parts(self) -> (Vec<Self::Item>, Pagination) {
        (self.organizations, self.pagination)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventsPage {
    pub events: Vec<Value>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl Paged for EventsPage {
    type Item = Value;

    fn into_parts(self) -> (Vec<Self::Item>, Pagination) {
        (self.events, self.pagination)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendeesPage {
    pub attendees: Vec<Value>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl Paged for AttendeesPage {
    type Item = Value;

    fn into_parts(self) -> (Vec<Self::Item>, Pagination) {
        (self.attendees, self.pagination)
    }
}

/// Error body returned with non-success statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ApiErrorBody {
    pub fn message(&self) -> Option<String> {
        match (&self.error, &self.error_description) {
            (Some(code), Some(description)) => Some(format!("{}: {}", code, description)),
            (None, Some(description)) => Some(description.clone()),
            (Some(code), None) => Some(code.clone()),
            (None, None) => None,
        }
    }
}
