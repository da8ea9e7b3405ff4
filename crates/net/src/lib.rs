//! Tagdesk Network Library
//!
//! Blocking HTTP client for the Eventbrite v3 API.
//!
//! # Usage
//!
//! ```ignore
//! let (client, user) = TicketingClient::connect(DEFAULT_BASE_URL, token)?;
//! for org in client.fetch_organizations()? {
//!     println!("{} ({})", org.name, org.id);
//! }
//! ```
//!
//! [`TicketingClient`] implements [`tagdesk_core::TicketingApi`], so the
//! session code never sees HTTP types.

pub mod client;
pub mod error;
pub mod protocol;

pub use client::TicketingClient;
pub use error::{Error, Result};

/// Default Eventbrite API root
pub const DEFAULT_BASE_URL: &str = "https://www.eventbriteapi.com/v3";
