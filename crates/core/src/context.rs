use crate::catalog::CatalogSearch;
use crate::playback::PlaybackEngine;
use crate::resolver::TrackResolver;
use crate::session::SessionSettings;
use crate::system::System;
use std::sync::Arc;

/// Everything a playback session talks to. Built once at startup and cloned
/// into each session worker.
#[derive(Clone)]
pub struct PlaybackContext {
    pub engine: Arc<dyn PlaybackEngine>,
    pub resolver: Arc<dyn TrackResolver>,
    pub catalog: Arc<dyn CatalogSearch>,
    pub system: Arc<dyn System>,
    pub settings: SessionSettings,
}

impl PlaybackContext {
    pub fn new(
        engine: Arc<dyn PlaybackEngine>,
        resolver: Arc<dyn TrackResolver>,
        catalog: Arc<dyn CatalogSearch>,
        system: Arc<dyn System>,
    ) -> Self {
        Self {
            engine,
            resolver,
            catalog,
            system,
            settings: SessionSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }
}
