//! Application state management

use std::path::PathBuf;

use tagdesk_core::session::{restore, SessionStore};
use tagdesk_core::{Error, Result, Session, TextTemplate};
use tagdesk_net::TicketingClient;

use crate::config::AppConfig;

/// Main application state
pub struct AppState {
    pub config: AppConfig,
    pub store: SessionStore,
    pub session: Session,
}

impl AppState {
    /// Open the session store and resume the quicksaved session
    ///
    /// Starts from an empty session when nothing has been saved yet.
    pub fn open(config: AppConfig) -> Result<Self> {
        let store = SessionStore::new(&config.sessions_dir);
        let session = match store.quickload() {
            Ok(record) => restore(record)?,
            Err(Error::NotFound(_)) => {
                tracing::info!(dir = %store.dir().display(), "No saved session, starting fresh");
                Session::default()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            config,
            store,
            session,
        })
    }

    /// Quicksave the current session
    pub fn save(&self) -> Result<PathBuf> {
        self.store.quicksave(&self.session.snapshot())
    }

    /// Client for the stored API key
    pub fn client(&self) -> Result<TicketingClient> {
        if self.session.api_key.is_empty() {
            return Err(Error::InvalidOperation(
                "not connected, run `tagdesk connect <api-key>` first".into(),
            ));
        }
        Ok(TicketingClient::new(
            &self.config.api_base_url,
            self.session.api_key.clone(),
        )?)
    }

    /// Load the selected nametag template
    pub fn template(&self) -> Result<TextTemplate> {
        let path = self.session.nametag.template_path.as_ref().ok_or_else(|| {
            Error::InvalidOperation(
                "no nametag template selected, run `tagdesk template <path>` first".into(),
            )
        })?;
        TextTemplate::load(path)
    }
}
