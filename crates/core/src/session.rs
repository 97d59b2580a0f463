use crate::catalog::ARTIST_TRACK_LIMIT;
use crate::context::PlaybackContext;
use crate::error::{CatalogError, DeviceError, ResolveError, SessionError};
use crate::playback::{EngineState, PlaybackEngine};
use crate::resolver::{ResolvedTrack, TrackQuery, spoken_title};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::time::Instant;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(20);

const SONG_NOT_FOUND: &str = "Sorry, I can't find that song.";
const SONG_NOT_PLAYABLE: &str = "Sorry, I can't play that song.";
const CATALOG_UNREACHABLE: &str = "Sorry, I can't reach the music catalog right now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Looking up the current track, or the catalog for a sequence.
    Resolving,
    Playing,
    /// The previous track is done; the next one has not started yet.
    Advancing,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// How often the engine is asked whether the current track is still going.
    pub poll_interval: Duration,
    /// Upper bound for a single resolver or catalog call.
    pub lookup_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

/// A one-way stop request shared between a session worker and whoever
/// controls it. Once set it stays set.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    requested: AtomicBool,
    notify: Notify,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        // Registered before the check so a concurrent cancel is not missed.
        let notified = self.inner.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// What a session worker is asked to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackRequest {
    Single(TrackQuery),
    Sequence(Vec<TrackQuery>),
    Artist(String),
    Playlist(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The engine was told to play the track.
    Playing,
    /// A stop arrived before the track could start.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The engine left the active set, ending in this state.
    Finished(EngineState),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatalogKind {
    Artist,
    Playlist,
}

impl CatalogKind {
    fn noun(self) -> &'static str {
        match self {
            CatalogKind::Artist => "artist",
            CatalogKind::Playlist => "playlist",
        }
    }
}

/// One playback request from start to finish: resolves tracks, plays them
/// one at a time and watches the engine to know when to move on.
///
/// The session is owned by a single worker. Other tasks observe and stop it
/// through its [`SessionControl`].
pub struct PlaybackSession {
    id: u64,
    queue: Vec<TrackQuery>,
    current_index: usize,
    cancel: CancelFlag,
    state_tx: watch::Sender<SessionState>,
    ctx: PlaybackContext,
}

impl PlaybackSession {
    pub fn new(id: u64, ctx: PlaybackContext) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        Self {
            id,
            queue: Vec::new(),
            current_index: 0,
            cancel: CancelFlag::new(),
            state_tx,
            ctx,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// A handle for stopping, pausing and observing this session from
    /// another task.
    pub fn control(&self) -> SessionControl {
        SessionControl {
            id: self.id,
            cancel: self.cancel.clone(),
            state: self.state_tx.subscribe(),
            engine: self.ctx.engine.clone(),
        }
    }

    fn set_state(&self, state: SessionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            tracing::debug!(
                session = self.id,
                ?previous,
                ?state,
                "session state changed"
            );
        }
    }

    /// The state a session settles in once it has nothing left to play.
    fn finish(&self) -> SessionState {
        let state = if self.cancel.is_cancelled() {
            SessionState::Stopped
        } else {
            SessionState::Idle
        };
        self.set_state(state);
        state
    }

    async fn say(&self, text: &str) {
        if let Err(e) = self.ctx.system.say(text).await {
            tracing::warn!(error = %e, text, "failed to speak");
        }
    }

    /// Runs `request` to completion and returns the state the session ended in.
    pub async fn run(mut self, request: PlaybackRequest) -> SessionState {
        tracing::info!(session = self.id, ?request, "playback session started");
        let state = match request {
            PlaybackRequest::Single(query) => match self.start_single(&query).await {
                Ok(StartOutcome::Playing) => {
                    self.wait_for_track_end().await;
                    self.finish()
                }
                Ok(StartOutcome::Cancelled) => self.finish(),
                Err(_) => self.state(),
            },
            PlaybackRequest::Sequence(queries) => self.start_sequence(queries).await,
            PlaybackRequest::Artist(name) => self.play_catalog(CatalogKind::Artist, &name).await,
            PlaybackRequest::Playlist(name) => {
                self.play_catalog(CatalogKind::Playlist, &name).await
            }
        };
        tracing::info!(session = self.id, ?state, "playback session ended");
        state
    }

    /// Resolves `query` and starts playing it.
    ///
    /// On failure the user is told once and the session goes back to idle.
    pub async fn start_single(&mut self, query: &str) -> Result<StartOutcome, SessionError> {
        self.queue = vec![query.to_string()];
        self.current_index = 0;
        match self.play_track(query).await {
            Ok(StartOutcome::Cancelled) => {
                self.set_state(SessionState::Stopped);
                Ok(StartOutcome::Cancelled)
            }
            Ok(StartOutcome::Playing) => Ok(StartOutcome::Playing),
            Err(e) => {
                self.set_state(SessionState::Idle);
                Err(e)
            }
        }
    }

    /// Plays `queries` in order, one track at a time. A track that cannot be
    /// resolved is skipped; a stop ends the whole sequence.
    pub async fn start_sequence(&mut self, queries: Vec<TrackQuery>) -> SessionState {
        self.queue = queries;
        for index in 0..self.queue.len() {
            self.current_index = index;
            if self.cancel.is_cancelled() {
                break;
            }
            let query = self.queue[index].clone();
            match self.play_track(&query).await {
                Ok(StartOutcome::Cancelled) => break,
                Ok(StartOutcome::Playing) => match self.wait_for_track_end().await {
                    WaitOutcome::Cancelled => break,
                    WaitOutcome::Finished(engine_state) => {
                        tracing::debug!(index, ?engine_state, "track finished");
                        self.set_state(SessionState::Advancing);
                    }
                },
                Err(e) => {
                    tracing::warn!(index, query, error = %e, "skipping track");
                    self.set_state(SessionState::Advancing);
                }
            }
        }
        self.finish()
    }

    async fn play_track(&mut self, query: &str) -> Result<StartOutcome, SessionError> {
        if self.cancel.is_cancelled() {
            return Ok(StartOutcome::Cancelled);
        }
        self.set_state(SessionState::Resolving);

        let track = match self.resolve(query).await {
            Ok(Some(track)) => track,
            Ok(None) => return Ok(StartOutcome::Cancelled),
            Err(e) => {
                match &e {
                    ResolveError::NotFound => tracing::info!(query, "no track found"),
                    other => tracing::warn!(query, error = %other, "track lookup failed"),
                }
                self.say(SONG_NOT_FOUND).await;
                return Err(e.into());
            }
        };

        tracing::info!(
            query,
            index = self.current_index,
            title = %track.title,
            "now playing"
        );
        self.say(&format!("Now playing {}", spoken_title(&track.title)))
            .await;
        if self.cancel.is_cancelled() {
            return Ok(StartOutcome::Cancelled);
        }

        if let Err(e) = self.ctx.engine.play(&track.media_ref).await {
            tracing::error!(query, error = %e, "engine refused the track");
            self.say(SONG_NOT_PLAYABLE).await;
            return Err(e.into());
        }
        // Published before the cancel check: a concurrent stop either sees
        // Playing and stops the engine itself, or is seen here.
        self.set_state(SessionState::Playing);
        if self.cancel.is_cancelled() {
            if let Err(e) = self.ctx.engine.stop().await {
                tracing::warn!(error = %e, "failed to stop engine");
            }
            return Ok(StartOutcome::Cancelled);
        }
        Ok(StartOutcome::Playing)
    }

    /// `Ok(None)` when cancelled while the resolver was still working.
    async fn resolve(&self, query: &str) -> Result<Option<ResolvedTrack>, ResolveError> {
        let limit = self.ctx.settings.lookup_timeout;
        tokio::select! {
            _ = self.cancel.cancelled() => Ok(None),
            result = tokio::time::timeout(limit, self.ctx.resolver.resolve(query)) => {
                match result {
                    Ok(resolved) => resolved.map(Some),
                    Err(_) => Err(ResolveError::Timeout(limit)),
                }
            }
        }
    }

    /// Polls the engine until the current track leaves the active set.
    /// The first poll happens one interval after the track was started.
    pub async fn wait_for_track_end(&self) -> WaitOutcome {
        let poll = self.ctx.settings.poll_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + poll, poll);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return WaitOutcome::Cancelled,
                _ = ticker.tick() => {
                    let state = self.ctx.engine.state().await;
                    if !state.is_active() {
                        return WaitOutcome::Finished(state);
                    }
                }
            }
        }
    }

    async fn play_catalog(&mut self, kind: CatalogKind, name: &str) -> SessionState {
        self.set_state(SessionState::Resolving);
        let limit = self.ctx.settings.lookup_timeout;
        let catalog = self.ctx.catalog.clone();
        let search = async {
            match kind {
                CatalogKind::Artist => catalog.search_by_artist(name).await,
                CatalogKind::Playlist => catalog.search_by_playlist(name).await,
            }
        };

        let result = tokio::select! {
            _ = self.cancel.cancelled() => return self.finish(),
            result = tokio::time::timeout(limit, search) => {
                result.unwrap_or_else(|_| Err(CatalogError::Timeout(limit)))
            }
        };

        match result {
            Ok(mut queries) if !queries.is_empty() => {
                if kind == CatalogKind::Artist {
                    queries.truncate(ARTIST_TRACK_LIMIT);
                }
                tracing::info!(
                    kind = kind.noun(),
                    name,
                    tracks = queries.len(),
                    "catalog match"
                );
                self.start_sequence(queries).await
            }
            Ok(_) | Err(CatalogError::NotFound) => {
                tracing::info!(kind = kind.noun(), name, "nothing in the catalog");
                self.say(&format!("Sorry, I can't find that {}.", kind.noun()))
                    .await;
                self.finish()
            }
            Err(e) => {
                tracing::warn!(kind = kind.noun(), name, error = %e, "catalog search failed");
                self.say(CATALOG_UNREACHABLE).await;
                self.finish()
            }
        }
    }
}

/// The controlling side of a [`PlaybackSession`].
///
/// `stop` only requests cancellation (and silences the engine when this
/// session is the one playing); the worker settles in `Stopped` itself.
#[derive(Clone)]
pub struct SessionControl {
    id: u64,
    cancel: CancelFlag,
    state: watch::Receiver<SessionState>,
    engine: Arc<dyn PlaybackEngine>,
}

impl SessionControl {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn stop(&self) {
        self.cancel.cancel();
        if self.state() == SessionState::Playing {
            if let Err(e) = self.engine.stop().await {
                tracing::warn!(session = self.id, error = %e, "failed to stop engine");
            }
        }
    }

    /// Returns `false` without touching the engine unless the session is Playing.
    pub async fn pause(&self) -> Result<bool, DeviceError> {
        self.set_paused(true).await
    }

    pub async fn resume(&self) -> Result<bool, DeviceError> {
        self.set_paused(false).await
    }

    async fn set_paused(&self, paused: bool) -> Result<bool, DeviceError> {
        if self.state() != SessionState::Playing {
            tracing::debug!(session = self.id, paused, "nothing playing, ignoring");
            return Ok(false);
        }
        self.engine.pause(paused).await?;
        Ok(true)
    }
}
