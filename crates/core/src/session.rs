//! Admin editing session: the state held while one page is being edited.
//!
//! One session edits one page at a time in a fixed locale. Loading a
//! different page replaces the held document wholesale. A save flattens
//! the document back into records and commits them in one shot; while a
//! save is outstanding the session refuses a second one, so two saves can
//! never interleave partial writes to the same key set.

use serde_json::Value;
use thiserror::Error;

use crate::document::Document;
use crate::keypath::KeyPath;
use crate::record::validate::KeyPathError;
use crate::store::{ContentStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No page loaded yet.
    Idle,
    /// A load is in flight.
    Loading,
    /// Document held, unmodified since load or last save.
    Ready,
    /// Document held with local edits not yet saved.
    Editing,
    /// A save is in flight.
    Saving,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no page loaded")]
    NotLoaded,
    #[error("a save is already in progress")]
    SaveInProgress,
    #[error(transparent)]
    Key(#[from] KeyPathError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct EditSession<S> {
    store: S,
    /// Acting identity, stamped as `owner` on every saved row.
    user: String,
    locale: String,
    state: SessionState,
    page: Option<String>,
    document: Document,
}

impl<S: ContentStore> EditSession<S> {
    pub fn new(store: S, user: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            store,
            user: user.into(),
            locale: locale.into(),
            state: SessionState::Idle,
            page: None,
            document: Document::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Fetch a page's records and hold the decoded document. Replaces any
    /// previously loaded page; rejected while a save is outstanding.
    pub async fn load(&mut self, page: &str) -> Result<(), SessionError> {
        if self.state == SessionState::Saving {
            return Err(SessionError::SaveInProgress);
        }
        self.state = SessionState::Loading;
        let loaded = match self.fetch_document(page).await {
            Ok(document) => document,
            Err(err) => {
                // Keep whatever was loaded before; the UI shows the error
                // and the user can retry.
                self.state = if self.page.is_some() {
                    SessionState::Ready
                } else {
                    SessionState::Idle
                };
                return Err(err);
            }
        };
        self.document = loaded;
        self.page = Some(page.to_string());
        self.state = SessionState::Ready;
        tracing::debug!(page, "page loaded into session");
        Ok(())
    }

    async fn fetch_document(&self, page: &str) -> Result<Document, SessionError> {
        let records = self.store.fetch_page(page, &self.locale).await?;
        let document =
            Document::from_records(records.iter().map(|r| (r.key.as_str(), r.value.as_str())))?;
        Ok(document)
    }

    /// Local edit of the held document. No network effect; the value's
    /// `type` compatibility is not checked here.
    pub fn set_field(&mut self, key: &str, value: Value) -> Result<(), SessionError> {
        if self.page.is_none() {
            return Err(SessionError::NotLoaded);
        }
        if self.state == SessionState::Saving {
            return Err(SessionError::SaveInProgress);
        }
        let path = KeyPath::parse(key)?;
        self.document.set(&path, value);
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Read a field of the held document.
    pub fn field(&self, key: &str) -> Result<Option<Value>, SessionError> {
        let path = KeyPath::parse(key)?;
        Ok(self.document.get(&path))
    }

    /// Flatten the held document and commit it. Returns the number of
    /// records written. On a store error the local document is kept and
    /// the session returns to `Ready` for retry; the atomic store means
    /// nothing was partially committed.
    pub async fn save(&mut self) -> Result<usize, SessionError> {
        if self.state == SessionState::Saving {
            return Err(SessionError::SaveInProgress);
        }
        let page = self.page.clone().ok_or(SessionError::NotLoaded)?;
        self.state = SessionState::Saving;
        let records = self.document.to_records(&page, &self.locale);
        let result = self.store.save_page(&records, &self.user).await;
        self.state = SessionState::Ready;
        match result {
            Ok(()) => {
                tracing::info!(%page, count = records.len(), "page saved");
                Ok(records.len())
            }
            Err(err) => Err(err.into()),
        }
    }
}
