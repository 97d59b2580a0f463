//! Stateful fakes for the collaborator traits, used where a test needs to
//! follow a whole playback sequence rather than set up single expectations.

use crate::catalog::CatalogSearch;
use crate::context::PlaybackContext;
use crate::error::{CatalogError, DeviceError, ResolveError};
use crate::playback::{EngineState, PlaybackEngine};
use crate::resolver::{ResolvedTrack, TrackQuery, TrackResolver};
use crate::session::SessionSettings;
use crate::system::System;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) fn fast_settings() -> SessionSettings {
    SessionSettings {
        poll_interval: Duration::from_millis(5),
        lookup_timeout: Duration::from_millis(100),
    }
}

pub(crate) fn context(
    engine: Arc<FakeEngine>,
    resolver: FakeResolver,
    catalog: FakeCatalog,
    system: Arc<RecordingSystem>,
) -> PlaybackContext {
    PlaybackContext::new(engine, Arc::new(resolver), Arc::new(catalog), system)
        .with_settings(fast_settings())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EngineCall {
    Play(String),
    Stop,
    Pause(bool),
}

struct EngineInner {
    calls: Vec<EngineCall>,
    state: EngineState,
    polls_left: Option<u32>,
    overlaps: usize,
}

/// Plays a track for a fixed number of state polls, or forever.
pub(crate) struct FakeEngine {
    polls_per_track: Option<u32>,
    inner: Mutex<EngineInner>,
}

impl FakeEngine {
    fn with_polls(polls_per_track: Option<u32>) -> Self {
        Self {
            polls_per_track,
            inner: Mutex::new(EngineInner {
                calls: Vec::new(),
                state: EngineState::Idle,
                polls_left: None,
                overlaps: 0,
            }),
        }
    }

    /// Each track reports Playing for `polls` polls, then Ended.
    pub(crate) fn finishing_after(polls: u32) -> Self {
        Self::with_polls(Some(polls))
    }

    pub(crate) fn never_finishing() -> Self {
        Self::with_polls(None)
    }

    pub(crate) fn calls(&self) -> Vec<EngineCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub(crate) fn plays(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Play(media) => Some(media),
                _ => None,
            })
            .collect()
    }

    /// How many times a track was started while another was still active.
    pub(crate) fn overlaps(&self) -> usize {
        self.inner.lock().unwrap().overlaps
    }
}

#[async_trait]
impl PlaybackEngine for FakeEngine {
    async fn play(&self, media_ref: &str) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(EngineCall::Play(media_ref.to_string()));
        if inner.state.is_active() {
            inner.overlaps += 1;
        }
        inner.state = EngineState::Playing;
        inner.polls_left = self.polls_per_track;
        Ok(())
    }

    async fn stop(&self) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(EngineCall::Stop);
        inner.state = EngineState::Stopped;
        Ok(())
    }

    async fn pause(&self, paused: bool) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(EngineCall::Pause(paused));
        inner.state = match (inner.state, paused) {
            (EngineState::Playing, true) => EngineState::Paused,
            (EngineState::Paused, false) => EngineState::Playing,
            (state, _) => state,
        };
        Ok(())
    }

    async fn state(&self) -> EngineState {
        let mut inner = self.inner.lock().unwrap();
        if inner.state == EngineState::Playing {
            match inner.polls_left {
                Some(0) => inner.state = EngineState::Ended,
                Some(n) => inner.polls_left = Some(n - 1),
                None => {}
            }
        }
        inner.state
    }
}

/// Resolves every query to itself, except the ones marked failing or hanging.
#[derive(Clone, Default)]
pub(crate) struct FakeResolver {
    failing: HashSet<String>,
    hanging: HashSet<String>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl FakeResolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    pub(crate) fn hanging(mut self, query: &str) -> Self {
        self.hanging.insert(query.to_string());
        self
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackResolver for FakeResolver {
    async fn resolve(&self, query: &str) -> Result<ResolvedTrack, ResolveError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.hanging.contains(query) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(query) {
            return Err(ResolveError::NotFound);
        }
        Ok(ResolvedTrack {
            media_ref: query.to_string(),
            title: format!("{query}!"),
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeCatalog {
    artists: HashMap<String, Vec<TrackQuery>>,
    playlists: HashMap<String, Vec<TrackQuery>>,
    error: Option<CatalogError>,
    hanging: bool,
}

impl FakeCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_artist(mut self, name: &str, tracks: Vec<TrackQuery>) -> Self {
        self.artists.insert(name.to_string(), tracks);
        self
    }

    pub(crate) fn with_playlist(mut self, name: &str, tracks: Vec<TrackQuery>) -> Self {
        self.playlists.insert(name.to_string(), tracks);
        self
    }

    pub(crate) fn failing(mut self, error: CatalogError) -> Self {
        self.error = Some(error);
        self
    }

    /// Every search waits forever.
    pub(crate) fn hanging(mut self) -> Self {
        self.hanging = true;
        self
    }

    async fn lookup(
        &self,
        table: &HashMap<String, Vec<TrackQuery>>,
        name: &str,
    ) -> Result<Vec<TrackQuery>, CatalogError> {
        if self.hanging {
            std::future::pending::<()>().await;
        }
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        table.get(name).cloned().ok_or(CatalogError::NotFound)
    }
}

#[async_trait]
impl CatalogSearch for FakeCatalog {
    async fn search_by_artist(&self, name: &str) -> Result<Vec<TrackQuery>, CatalogError> {
        self.lookup(&self.artists, name).await
    }

    async fn search_by_playlist(&self, name: &str) -> Result<Vec<TrackQuery>, CatalogError> {
        self.lookup(&self.playlists, name).await
    }
}

/// Remembers what was said and keeps a volume level.
pub(crate) struct RecordingSystem {
    said: Mutex<Vec<String>>,
    volume: Mutex<u8>,
}

impl RecordingSystem {
    pub(crate) fn new() -> Self {
        Self::with_volume(50)
    }

    pub(crate) fn with_volume(volume: u8) -> Self {
        Self {
            said: Mutex::new(Vec::new()),
            volume: Mutex::new(volume),
        }
    }

    pub(crate) fn said(&self) -> Vec<String> {
        self.said.lock().unwrap().clone()
    }

    pub(crate) fn current_volume(&self) -> u8 {
        *self.volume.lock().unwrap()
    }
}

#[async_trait]
impl System for RecordingSystem {
    async fn say(&self, text: &str) -> Result<(), DeviceError> {
        self.said.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), DeviceError> {
        Ok(())
    }

    async fn reboot(&self) -> Result<(), DeviceError> {
        Ok(())
    }

    async fn ip_address(&self) -> Result<String, DeviceError> {
        Ok("192.168.1.20".to_string())
    }

    async fn volume(&self) -> Result<u8, DeviceError> {
        Ok(self.current_volume())
    }

    async fn set_volume(&self, percent: u8) -> Result<(), DeviceError> {
        *self.volume.lock().unwrap() = percent;
        Ok(())
    }
}
