//! Blocking Eventbrite client

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use tagdesk_core::{ApiUser, Event, EventSummary, Organization, TicketingApi};

use crate::error::{Error, Result};
use crate::protocol::{
    ApiErrorBody, AttendeesPage, EventsPage, OrganizationsPage, Paged, UserBody,
};

/// Per-request timeout
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Authenticated API client
#[derive(Debug, Clone)]
pub struct TicketingClient {
    http: Client,
    base_url: String,
    token: String,
}

impl TicketingClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("tagdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Create a client and check the token against the account endpoint
    pub fn connect(base_url: &str, token: impl Into<String>) -> Result<(Self, ApiUser)> {
        let client = Self::new(base_url, token)?;
        let user: ApiUser = client.get::<UserBody>("users/me/", &[])?.into();
        info!(user_id = %user.id, name = %user.name, "Authenticated with ticketing API");
        Ok((client, user))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()?;
        let status = response.status();
        let body = response.text()?;
        decode_body(status, &body)
    }

    /// Follow `continuation` tokens until the listing is exhausted
    fn get_all<P>(&self, path: &str) -> Result<Vec<P::Item>>
    where
        P: Paged + DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let query: Vec<(&str, &str)> = match continuation.as_deref() {
                Some(token) => vec![("continuation", token)],
                None => Vec::new(),
            };
            let page: P = self.get(path, &query)?;
            let (batch, pagination) = page.into_parts();
            items.extend(batch);

            let next = pagination.next_continuation().map(str::to_string);
            match next {
                Some(token) if continuation.as_deref() == Some(token.as_str()) => {
                    return Err(Error::Protocol(format!(
                        "{} repeated continuation token",
                        path
                    )));
                }
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        debug!(path, count = items.len(), "Fetched listing");
        Ok(items)
    }
}

/// Decode a response body, turning error statuses into [`Error::Status`]
fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.message())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        warn!(status = status.as_u16(), %message, "API request failed");
        return Err(Error::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(body).map_err(|e| Error::Protocol(e.to_string()))
}

impl TicketingApi for TicketingClient {
    fn fetch_current_user(&self) -> tagdesk_core::Result<ApiUser> {
        Ok(self.get::<UserBody>("users/me/", &[])?.into())
    }

    fn fetch_organizations(&self) -> tagdesk_core::Result<Vec<Organization>> {
        let orgs = self.get_all::<OrganizationsPage>("users/me/organizations/")?;
        info!(count = orgs.len(), "Fetched organizations");
        Ok(orgs.into_iter().map(Organization::from).collect())
    }

    fn fetch_events(&self, org_id: &str) -> tagdesk_core::Result<Vec<EventSummary>> {
        let raw = self.get_all::<EventsPage>(&format!("organizations/{}/events/", org_id))?;
        info!(org_id, count = raw.len(), "Fetched events");
        raw.into_iter()
            .map(|value| Event::from_value(value).map(|e| EventSummary::from(&e)))
            .collect()
    }

    fn fetch_event(&self, event_id: &str) -> tagdesk_core::Result<Event> {
        let raw: Value = self.get(&format!("events/{}/", event_id), &[])?;
        let event = Event::from_value(raw)?;
        info!(event_id = %event.id, name = %event.name, "Fetched event");
        Ok(event)
    }

    fn fetch_attendee_records(&self, event_id: &str) -> tagdesk_core::Result<Vec<Value>> {
        Ok(self.get_all::<AttendeesPage>(&format!("events/{}/attendees/", event_id))?)
    }
}
