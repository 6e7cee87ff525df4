//! Application State Management
//!
//! Central application state that is shared across all API handlers

use std::sync::Arc;

use crate::auth::SessionVerifier;
use crate::config::SheetsrvConfig;
use crate::reconcile::SheetReconciler;
use crate::store::{RecordStore, SettingsStore};

pub struct AppState {
    pub config: Arc<SheetsrvConfig>,

    /// Podcast records
    pub records: Arc<dyn RecordStore>,

    /// Site settings rows
    pub settings: Arc<dyn SettingsStore>,

    /// One reconciler per configured sheet
    pub reconciler: Arc<SheetReconciler>,

    pub sessions: SessionVerifier,
}

impl AppState {
    pub fn new(
        config: Arc<SheetsrvConfig>,
        records: Arc<dyn RecordStore>,
        settings: Arc<dyn SettingsStore>,
        reconciler: Arc<SheetReconciler>,
    ) -> Self {
        let sessions = SessionVerifier::new(&config.auth.session_secret);
        Self {
            config,
            records,
            settings,
            reconciler,
            sessions,
        }
    }
}
