//! Session files on disk
//!
//! The quicksave slot is overwritten on every save. Each save also leaves a
//! timestamped copy next to it for history.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::instrument;

use crate::error::{Error, Result};

use super::record::SessionRecord;

/// Canonical session file name
pub const QUICKSAVE_FILE: &str = "quicksave.json";

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const HISTORY_SUFFIX: &str = "_quicksave.json";

/// Directory of saved sessions
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn quicksave_path(&self) -> PathBuf {
        self.dir.join(QUICKSAVE_FILE)
    }

    /// Path of the history copy written at `at`
    pub fn history_path(&self, at: DateTime<Local>) -> PathBuf {
        self.dir
            .join(format!("{}{}", at.format(TIMESTAMP_FORMAT), HISTORY_SUFFIX))
    }

    /// Save to the quicksave slot plus a timestamped copy
    pub fn quicksave(&self, record: &SessionRecord) -> Result<PathBuf> {
        self.quicksave_at(record, Local::now())
    }

    #[instrument(skip(self, record), fields(dir = %self.dir.display()))]
    pub fn quicksave_at(&self, record: &SessionRecord, at: DateTime<Local>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let canonical = self.quicksave_path();
        fs::write(&canonical, record.to_json()?)?;

        let history = self.history_path(at);
        fs::copy(&canonical, &history)?;

        tracing::info!(path = %canonical.display(), backup = %history.display(), "Saved session");
        Ok(history)
    }

    /// Read the quicksave slot
    pub fn quickload(&self) -> Result<SessionRecord> {
        let path = self.quicksave_path();
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "no saved session at {}",
                path.display()
            )));
        }
        self.load(&path)
    }

    /// Read any session file
    pub fn load(&self, path: &Path) -> Result<SessionRecord> {
        let text = fs::read_to_string(path)?;
        let record = SessionRecord::from_json(&text)?;
        tracing::info!(path = %path.display(), "Loaded session");
        Ok(record)
    }

    /// Timestamped copies, oldest first
    pub fn history(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(is_history_name)
            })
            .collect();
        entries.sort();
        Ok(entries)
    }
}

fn is_history_name(name: &str) -> bool {
    name.strip_suffix(HISTORY_SUFFIX).is_some_and(|stamp| {
        stamp.len() == 15
            && stamp
                .char_indices()
                .all(|(i, c)| if i == 8 { c == '_' } else { c.is_ascii_digit() })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 3, 14, hour, minute, second)
            .single()
            .unwrap()
    }

    #[test]
    fn test_quicksave_writes_slot_and_history() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::new(temp.path().join("sessions"));
        let record = Session::new("token").snapshot();

        let history = store.quicksave_at(&record, at(9, 5, 7)).unwrap();
        assert_eq!(
            history.file_name().unwrap().to_str().unwrap(),
            "20260314_090507_quicksave.json"
        );
        assert!(store.quicksave_path().exists());
        assert_eq!(
            fs::read_to_string(store.quicksave_path()).unwrap(),
            fs::read_to_string(&history).unwrap()
        );
        assert_eq!(store.quickload().unwrap(), record);
    }

    #[test]
    fn test_quicksave_overwrites_slot() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::new(temp.path());

        store
            .quicksave_at(&Session::new("first").snapshot(), at(10, 0, 0))
            .unwrap();
        store
            .quicksave_at(&Session::new("second").snapshot(), at(10, 0, 1))
            .unwrap();

        assert_eq!(store.quickload().unwrap().api_key, "second");
        let history = store.history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(store.load(&history[0]).unwrap().api_key, "first");
    }

    #[test]
    fn test_quickload_missing() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::new(temp.path().join("none"));
        assert!(matches!(store.quickload(), Err(Error::NotFound(_))));
        assert!(store.history().unwrap().is_empty());
    }

    #[test]
    fn test_quickload_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let store = SessionStore::new(temp.path());
        fs::write(store.quicksave_path(), r#"{"api_key": "x"}"#).unwrap();
        assert!(matches!(store.quickload(), Err(Error::CorruptSession(_))));
    }

    #[test]
    fn test_history_name_filter() {
        assert!(is_history_name("20260314_090507_quicksave.json"));
        assert!(!is_history_name("quicksave.json"));
        assert!(!is_history_name("2026031_0905077_quicksave.json"));
        assert!(!is_history_name("notes.json"));
    }
}
