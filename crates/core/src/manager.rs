use crate::context::PlaybackContext;
use crate::error::DeviceError;
use crate::session::{PlaybackSession, SessionControl, SessionState};
use tokio::task::JoinHandle;
use tracing::Instrument;

pub use crate::session::PlaybackRequest;

/// A session running on its own worker task.
pub struct SessionHandle {
    control: SessionControl,
    task: JoinHandle<SessionState>,
}

impl SessionHandle {
    pub fn control(&self) -> &SessionControl {
        &self.control
    }

    /// Waits for the worker and returns the state it ended in.
    pub async fn join(self) -> SessionState {
        match self.task.await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(
                    session = self.control.id(),
                    error = %e,
                    "playback worker failed"
                );
                SessionState::Stopped
            }
        }
    }
}

/// Owns the one playback session that may be active at a time.
pub struct SessionManager {
    ctx: PlaybackContext,
    current: Option<SessionHandle>,
    next_id: u64,
}

impl SessionManager {
    pub fn new(ctx: PlaybackContext) -> Self {
        Self {
            ctx,
            current: None,
            next_id: 0,
        }
    }

    /// Starts a session for `request`, superseding the current one.
    ///
    /// The previous session is stopped first, and the new worker waits for
    /// the previous worker to exit before it touches the engine.
    pub async fn start(&mut self, request: PlaybackRequest) -> u64 {
        let previous = match self.current.take() {
            Some(previous) => {
                let session = previous.control.id();
                tracing::info!(session, "superseding playback session");
                previous.control.stop().await;
                Some(previous.task)
            }
            None => None,
        };

        self.next_id += 1;
        let id = self.next_id;
        let session = PlaybackSession::new(id, self.ctx.clone());
        let control = session.control();

        let task = tokio::spawn(
            async move {
                if let Some(previous) = previous {
                    if let Err(e) = previous.await {
                        tracing::error!(error = %e, "superseded worker failed");
                    }
                }
                session.run(request).await
            }
            .instrument(tracing::info_span!("playback_session", id)),
        );

        self.current = Some(SessionHandle { control, task });
        id
    }

    /// Stops the current session, if any. Returns whether there was one.
    pub async fn stop(&mut self) -> bool {
        match &self.current {
            Some(handle) => {
                let session = handle.control.id();
                tracing::info!(session, "stopping playback session");
                handle.control.stop().await;
                true
            }
            None => false,
        }
    }

    pub async fn pause(&self) -> Result<bool, DeviceError> {
        match &self.current {
            Some(handle) => handle.control.pause().await,
            None => Ok(false),
        }
    }

    pub async fn resume(&self) -> Result<bool, DeviceError> {
        match &self.current {
            Some(handle) => handle.control.resume().await,
            None => Ok(false),
        }
    }

    /// Idle when no session was ever started.
    pub fn state(&self) -> SessionState {
        self.current
            .as_ref()
            .map_or(SessionState::Idle, |handle| handle.control.state())
    }

    pub fn current(&self) -> Option<&SessionHandle> {
        self.current.as_ref()
    }

    pub async fn join_current(&mut self) -> Option<SessionState> {
        match self.current.take() {
            Some(handle) => Some(handle.join().await),
            None => None,
        }
    }

    /// Stops the current session and waits for its worker to exit.
    pub async fn shutdown(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.control.stop().await;
            let state = handle.join().await;
            tracing::info!(?state, "playback shut down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        EngineCall, FakeCatalog, FakeEngine, FakeResolver, RecordingSystem, context,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    async fn wait_until(mut rx: watch::Receiver<SessionState>, state: SessionState) {
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| *s == state))
            .await
            .expect("timed out waiting for session state")
            .expect("session state channel closed");
    }

    fn current_state(manager: &SessionManager) -> watch::Receiver<SessionState> {
        manager.current().unwrap().control().subscribe()
    }

    fn manager(engine: Arc<FakeEngine>, catalog: FakeCatalog) -> SessionManager {
        manager_with(engine, FakeResolver::new(), catalog)
    }

    fn manager_with(
        engine: Arc<FakeEngine>,
        resolver: FakeResolver,
        catalog: FakeCatalog,
    ) -> SessionManager {
        let mut ctx = context(engine, resolver, catalog, Arc::new(RecordingSystem::new()));
        // Long enough that only a stop can end a hanging lookup.
        ctx.settings.lookup_timeout = Duration::from_secs(30);
        SessionManager::new(ctx)
    }

    #[tokio::test]
    async fn no_session_is_idle() {
        let mut manager = manager(Arc::new(FakeEngine::never_finishing()), FakeCatalog::new());
        assert_eq!(manager.state(), SessionState::Idle);
        assert!(!manager.stop().await);
        assert_eq!(manager.pause().await, Ok(false));
        assert_eq!(manager.join_current().await, None);
    }

    #[tokio::test]
    async fn single_track_ends_idle_when_the_engine_finishes() {
        let engine = Arc::new(FakeEngine::finishing_after(1));
        let mut manager = manager(engine.clone(), FakeCatalog::new());

        manager.start(PlaybackRequest::Single("a".into())).await;

        assert_eq!(manager.join_current().await, Some(SessionState::Idle));
        assert_eq!(engine.plays(), vec!["a"]);
    }

    #[tokio::test]
    async fn new_request_stops_the_playing_session_first() {
        let engine = Arc::new(FakeEngine::never_finishing());
        let mut manager = manager(engine.clone(), FakeCatalog::new());

        let first = manager.start(PlaybackRequest::Single("a".into())).await;
        let first_state = current_state(&manager);
        wait_until(first_state.clone(), SessionState::Playing).await;

        let second = manager.start(PlaybackRequest::Single("b".into())).await;
        wait_until(current_state(&manager), SessionState::Playing).await;

        assert_ne!(first, second);
        assert_eq!(*first_state.borrow(), SessionState::Stopped);
        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::Play("a".into()),
                EngineCall::Stop,
                EngineCall::Play("b".into()),
            ]
        );
        manager.shutdown().await;
    }

    #[tokio::test]
    async fn stop_during_a_sequence_prevents_further_tracks() {
        let engine = Arc::new(FakeEngine::never_finishing());
        let tracks = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let mut manager = manager(engine.clone(), FakeCatalog::new().with_playlist("mix", tracks));

        manager.start(PlaybackRequest::Playlist("mix".into())).await;
        wait_until(current_state(&manager), SessionState::Playing).await;

        assert!(manager.stop().await);
        assert!(manager.current().unwrap().control().is_cancelled());
        assert_eq!(manager.join_current().await, Some(SessionState::Stopped));
        assert_eq!(
            engine.calls(),
            vec![EngineCall::Play("one".into()), EngineCall::Stop]
        );
    }

    #[tokio::test]
    async fn pause_reaches_the_engine_only_while_playing() {
        let engine = Arc::new(FakeEngine::never_finishing());
        let mut manager = manager(engine.clone(), FakeCatalog::new());

        manager.start(PlaybackRequest::Single("a".into())).await;
        wait_until(current_state(&manager), SessionState::Playing).await;

        assert_eq!(manager.pause().await, Ok(true));
        assert_eq!(manager.resume().await, Ok(true));
        manager.shutdown().await;

        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::Play("a".into()),
                EngineCall::Pause(true),
                EngineCall::Pause(false),
                EngineCall::Stop,
            ]
        );
        assert!(manager.current().is_none());
    }

    #[tokio::test]
    async fn stop_while_resolving_ends_stopped_without_playing() {
        let engine = Arc::new(FakeEngine::finishing_after(1));
        let resolver = FakeResolver::new().hanging("slow");
        let mut manager = manager_with(engine.clone(), resolver.clone(), FakeCatalog::new());

        manager
            .start(PlaybackRequest::Sequence(vec!["slow".into(), "next".into()]))
            .await;
        wait_until(current_state(&manager), SessionState::Resolving).await;

        assert!(manager.stop().await);
        let state = tokio::time::timeout(Duration::from_secs(2), manager.join_current())
            .await
            .unwrap();

        assert_eq!(state, Some(SessionState::Stopped));
        assert_eq!(resolver.queries(), vec!["slow"]);
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn superseding_a_resolving_session_plays_only_the_new_track() {
        let engine = Arc::new(FakeEngine::never_finishing());
        let resolver = FakeResolver::new().hanging("slow");
        let mut manager = manager_with(engine.clone(), resolver, FakeCatalog::new());

        manager.start(PlaybackRequest::Single("slow".into())).await;
        let first_state = current_state(&manager);
        wait_until(first_state.clone(), SessionState::Resolving).await;

        manager.start(PlaybackRequest::Single("b".into())).await;
        wait_until(current_state(&manager), SessionState::Playing).await;

        assert_eq!(*first_state.borrow(), SessionState::Stopped);
        assert_eq!(engine.calls(), vec![EngineCall::Play("b".into())]);
        manager.shutdown().await;
    }

    #[tokio::test]
    async fn stop_during_a_catalog_search_ends_stopped() {
        let engine = Arc::new(FakeEngine::never_finishing());
        let mut manager = manager_with(
            engine.clone(),
            FakeResolver::new(),
            FakeCatalog::new().hanging(),
        );

        manager.start(PlaybackRequest::Artist("daft punk".into())).await;
        wait_until(current_state(&manager), SessionState::Resolving).await;

        assert!(manager.stop().await);
        let state = tokio::time::timeout(Duration::from_secs(2), manager.join_current())
            .await
            .unwrap();

        assert_eq!(state, Some(SessionState::Stopped));
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn stop_while_playing_stops_the_engine_once() {
        let engine = Arc::new(FakeEngine::never_finishing());
        let mut manager = manager(engine.clone(), FakeCatalog::new());

        manager.start(PlaybackRequest::Single("a".into())).await;
        wait_until(current_state(&manager), SessionState::Playing).await;

        assert!(manager.stop().await);
        assert_eq!(manager.join_current().await, Some(SessionState::Stopped));
        assert_eq!(
            engine.calls(),
            vec![EngineCall::Play("a".into()), EngineCall::Stop]
        );
    }
}
