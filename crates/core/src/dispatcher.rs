use crate::Command;
use crate::context::PlaybackContext;
use crate::error::DispatchError;
use crate::events::{EventKind, RecognizedEvent};
use crate::grammar;
use crate::manager::{PlaybackRequest, SessionManager};
use crate::recognizer::{Recognizer, Status, StatusUi};
use crate::system::{System, adjust_volume};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const DEFAULT_VOLUME_STEP: u8 = 10;

/// Starts a conversation turn on a button press, but only while no turn is
/// running and only once the assistant has finished starting up.
#[derive(Clone)]
pub struct ButtonTrigger {
    armed: Arc<AtomicBool>,
    can_start: Arc<AtomicBool>,
    recognizer: Arc<dyn Recognizer>,
}

impl ButtonTrigger {
    /// Returns whether the press opened a new turn.
    pub async fn press(&self) -> bool {
        if !self.armed.load(Ordering::SeqCst) {
            tracing::debug!("button pressed before the assistant was ready");
            return false;
        }
        if self
            .can_start
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("button pressed during a turn, ignoring");
            return false;
        }
        match self.recognizer.start_conversation().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = ?e, "failed to start conversation");
                self.can_start.store(true, Ordering::SeqCst);
                false
            }
        }
    }
}

/// Turns recognizer events into actions, one event at a time.
pub struct CommandDispatcher {
    sessions: SessionManager,
    system: Arc<dyn System>,
    recognizer: Arc<dyn Recognizer>,
    status_ui: Arc<dyn StatusUi>,
    can_start: Arc<AtomicBool>,
    armed: Arc<AtomicBool>,
    volume_step: u8,
}

impl CommandDispatcher {
    pub fn new(
        ctx: PlaybackContext,
        recognizer: Arc<dyn Recognizer>,
        status_ui: Arc<dyn StatusUi>,
    ) -> Self {
        Self {
            system: ctx.system.clone(),
            sessions: SessionManager::new(ctx),
            recognizer,
            status_ui,
            can_start: Arc::new(AtomicBool::new(false)),
            armed: Arc::new(AtomicBool::new(false)),
            volume_step: DEFAULT_VOLUME_STEP,
        }
    }

    pub fn with_volume_step(mut self, step: u8) -> Self {
        self.volume_step = step;
        self
    }

    /// A trigger that can be moved to whatever task watches the button.
    /// Presses are ignored until the assistant reports it has started.
    pub fn button_trigger(&self) -> ButtonTrigger {
        ButtonTrigger {
            armed: self.armed.clone(),
            can_start: self.can_start.clone(),
            recognizer: self.recognizer.clone(),
        }
    }

    pub fn can_start_conversation(&self) -> bool {
        self.can_start.load(Ordering::SeqCst)
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut SessionManager {
        &mut self.sessions
    }

    fn set_can_start(&self, value: bool) {
        self.can_start.store(value, Ordering::SeqCst);
    }

    pub async fn handle(&mut self, event: RecognizedEvent) -> Result<(), DispatchError> {
        tracing::debug!(kind = ?event.kind, "recognizer event");
        match event.kind {
            EventKind::StartFinished => {
                self.status_ui.status(Status::Ready);
                self.set_can_start(true);
                if !self.armed.swap(true, Ordering::SeqCst) {
                    tracing::info!("button armed");
                }
            }
            EventKind::TurnStarted => {
                self.set_can_start(false);
                self.status_ui.status(Status::Listening);
            }
            EventKind::SpeechFinished => {
                if let Some(text) = event.text.as_deref().filter(|t| !t.trim().is_empty()) {
                    let command = grammar::parse(text);
                    tracing::info!(text, ?command, "speech recognized");
                    self.execute(command).await;
                }
            }
            EventKind::EndOfUtterance => self.status_ui.status(Status::Thinking),
            EventKind::TurnFinished | EventKind::TurnTimeout | EventKind::NoResponse => {
                self.set_can_start(true);
                self.status_ui.status(Status::Ready);
            }
            EventKind::AssistantError => {
                if event.is_fatal == Some(true) {
                    tracing::error!("fatal assistant error");
                    return Err(DispatchError::FatalAssistant);
                }
                tracing::warn!("assistant reported a recoverable error");
            }
        }
        Ok(())
    }

    /// Carries out one command. Everything except "stop" ends the current
    /// conversation turn first, so the assistant does not answer on top of it.
    pub async fn execute(&mut self, command: Command) {
        if command == Command::Unknown {
            return;
        }
        if command.ends_turn() {
            if let Err(e) = self.recognizer.stop_conversation().await {
                tracing::warn!(error = ?e, "failed to end conversation turn");
            }
        }

        match command {
            Command::Stop => {
                self.sessions.stop().await;
            }
            Command::PowerOff => {
                self.say("Good bye!").await;
                if let Err(e) = self.system.shutdown().await {
                    tracing::error!(error = %e, "shutdown failed");
                }
            }
            Command::Reboot => {
                self.say("See you in a bit!").await;
                if let Err(e) = self.system.reboot().await {
                    tracing::error!(error = %e, "reboot failed");
                }
            }
            Command::SayIp => match self.system.ip_address().await {
                Ok(ip) => self.say(&format!("My IP address is {ip}")).await,
                Err(e) => tracing::warn!(error = %e, "failed to read IP address"),
            },
            Command::Pause => self.set_paused(true).await,
            Command::Resume => self.set_paused(false).await,
            Command::Play(query) => {
                self.sessions.start(PlaybackRequest::Single(query)).await;
            }
            Command::Artist(name) => {
                self.sessions.start(PlaybackRequest::Artist(name)).await;
            }
            Command::Playlist(name) => {
                self.sessions.start(PlaybackRequest::Playlist(name)).await;
            }
            Command::VolumeUp => self.change_volume(i32::from(self.volume_step)).await,
            Command::VolumeDown => self.change_volume(-i32::from(self.volume_step)).await,
            Command::Unknown => {}
        }
    }

    async fn set_paused(&self, paused: bool) {
        let result = if paused {
            self.sessions.pause().await
        } else {
            self.sessions.resume().await
        };
        match result {
            Ok(true) => tracing::info!(paused, "playback paused state changed"),
            Ok(false) => tracing::debug!(paused, "nothing playing"),
            Err(e) => tracing::warn!(paused, error = %e, "engine refused"),
        }
    }

    async fn change_volume(&self, delta: i32) {
        match adjust_volume(self.system.as_ref(), delta).await {
            Ok(volume) => self.say(&format!("Volume at {volume} %.")).await,
            Err(e) => {
                tracing::warn!(delta, error = %e, "failed to change volume");
                self.say("Sorry, I couldn't change the volume.").await;
            }
        }
    }

    async fn say(&self, text: &str) {
        if let Err(e) = self.system.say(text).await {
            tracing::warn!(error = %e, text, "failed to speak");
        }
    }

    /// Stops playback and waits for the worker to exit.
    pub async fn shutdown(&mut self) {
        self.sessions.shutdown().await;
    }
}
