//! Application state: the loaded issue store plus session, viewer location,
//! and theme.
//!
//! One owned value instead of free-floating globals: collections load from
//! storage at startup and every mutation writes the full document back.

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::debug;

use crate::config::AppConfig;
use crate::error::CtError;
use crate::storage::{keys, load_doc, load_opt, save_doc, Storage};
use crate::types::{
    generate_issue_id, generate_record_id, Coordinate, Issue, Session, Theme,
};

pub struct AppState {
    storage: Box<dyn Storage>,
    pub config: AppConfig,
    pub issues: Vec<Issue>,
    pub session: Option<Session>,
    pub theme: Theme,
    location: Option<Coordinate>,
    id_seq: u64,
}

impl AppState {
    /// Loads all page-start state from storage. Malformed documents fall
    /// back to their defaults inside the storage helpers.
    pub fn open(storage: Box<dyn Storage>, config: AppConfig) -> Result<Self> {
        debug!("loading issue store from {}", storage.path());
        let issues = load_doc(storage.as_ref(), keys::ISSUES)?;
        let session = load_opt(storage.as_ref(), keys::SESSION)?;
        let location = load_opt(storage.as_ref(), keys::LOCATION)?;
        let theme = load_opt(storage.as_ref(), keys::THEME)?.unwrap_or_default();
        let id_seq = load_doc(storage.as_ref(), keys::ID_SEQ)?;

        Ok(AppState {
            storage,
            config,
            issues,
            session,
            theme,
            location,
            id_seq,
        })
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Writes the full issue collection back to storage.
    pub fn persist_issues(&self) -> Result<(), CtError> {
        save_doc(self.storage.as_ref(), keys::ISSUES, &self.issues)?;
        Ok(())
    }

    pub fn find_issue(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id == id)
    }

    pub fn find_issue_mut(&mut self, id: &str) -> Option<&mut Issue> {
        self.issues.iter_mut().find(|issue| issue.id == id)
    }

    /// The saved viewer coordinate, or the configured fallback when none has
    /// been recorded.
    pub fn viewer_location(&self) -> Coordinate {
        match self.location {
            Some(coord) => coord,
            None => {
                debug!("no saved location, using configured fallback");
                self.config.default_location()
            }
        }
    }

    /// Records the viewer's coordinate (the one-shot geolocation callback).
    pub fn locate(&mut self, coord: Coordinate) -> Result<(), CtError> {
        save_doc(self.storage.as_ref(), keys::LOCATION, &coord)?;
        self.location = Some(coord);
        Ok(())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), CtError> {
        save_doc(self.storage.as_ref(), keys::THEME, &theme)?;
        self.theme = theme;
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, CtError> {
        let next = self.theme.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    /// Replaces the current session (None clears it) and persists.
    pub fn set_session(&mut self, session: Option<Session>) -> Result<(), CtError> {
        match &session {
            Some(s) => save_doc(self.storage.as_ref(), keys::SESSION, s)?,
            None => self
                .storage
                .delete(keys::SESSION)
                .map_err(|e| CtError::Storage(e.to_string()))?,
        }
        self.session = session;
        Ok(())
    }

    /// Session, or `NotLoggedIn`.
    pub fn require_session(&self) -> Result<&Session, CtError> {
        self.session.as_ref().ok_or(CtError::NotLoggedIn)
    }

    /// Session with the Admin role, or `AdminRequired`.
    pub fn require_admin(&self) -> Result<&Session, CtError> {
        let session = self.require_session()?;
        if session.is_admin() {
            Ok(session)
        } else {
            Err(CtError::AdminRequired)
        }
    }

    /// Issues a fresh id, unique across the live store.
    pub fn next_issue_id(
        &mut self,
        title: &str,
        date: &DateTime<Utc>,
    ) -> Result<String, CtError> {
        loop {
            self.id_seq += 1;
            let id = generate_issue_id(title, date, self.id_seq);
            if self.find_issue(&id).is_none() {
                save_doc(self.storage.as_ref(), keys::ID_SEQ, &self.id_seq)?;
                return Ok(id);
            }
        }
    }

    /// Issues a fresh id for side records (log entries, posts, comments).
    pub fn next_record_id(&mut self, tag: &str) -> Result<String, CtError> {
        self.id_seq += 1;
        let id = generate_record_id(tag, &Utc::now(), self.id_seq);
        save_doc(self.storage.as_ref(), keys::ID_SEQ, &self.id_seq)?;
        Ok(id)
    }
}
