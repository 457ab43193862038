//! Shared application state.
//!
//! `AppState` is constructed explicitly at startup and handed to the router
//! behind an `Arc`, so tests can build one against a throwaway directory
//! and reach the hub and session store directly. No ambient singletons.

use std::path::PathBuf;
use std::sync::Mutex;

use rusqlite::Connection;

use crate::auth::{Principal, SessionStore};
use crate::broadcast::BroadcastHub;
use crate::config::Config;
use crate::db::{self, DatabaseError};

pub struct AppState {
    /// Path of the SQLite database. Each request opens its own connection;
    /// SQLite serializes writers.
    pub db_path: PathBuf,
    /// Root of the uploaded-files tree, served at `/uploads`.
    pub uploads_dir: PathBuf,
    /// Broadcast fan-out for connected dashboard clients.
    pub hub: BroadcastHub,
    /// Bearer-token sessions for both token types.
    sessions: Mutex<SessionStore>,
    /// Demo mode: echo one-time codes in the request-otp response.
    pub demo_mode: bool,
}

impl AppState {
    pub fn new(db_path: PathBuf, uploads_dir: PathBuf, demo_mode: bool) -> Self {
        Self {
            db_path,
            uploads_dir,
            hub: BroadcastHub::new(),
            sessions: Mutex::new(SessionStore::new()),
            demo_mode,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.database_path(), config.uploads_dir(), config.demo_mode)
    }

    /// Open a connection to the application database.
    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        db::open_database(&self.db_path)
    }

    /// Issue a bearer token for the principal.
    pub fn issue_token(&self, principal: Principal) -> String {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.issue(principal)
    }

    /// Resolve a bearer token. `None` for unknown or expired tokens.
    pub fn resolve_token(&self, token: &str) -> Option<Principal> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.resolve(token)
    }

    /// Voice-note storage directory.
    pub fn voice_notes_dir(&self) -> PathBuf {
        self.uploads_dir.join("voice-notes")
    }
}
