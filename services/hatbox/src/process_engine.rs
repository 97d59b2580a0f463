use crate::process::CommandLine;
use async_trait::async_trait;
use hatbox_core::error::DeviceError;
use hatbox_core::playback::{EngineState, PlaybackEngine};
use std::process::{ExitStatus, Stdio};
use tokio::process::Child;
use tokio::sync::Mutex;

struct Track {
    child: Child,
    paused: bool,
    /// Set once the child has been reaped or stopped by us.
    finished: Option<EngineState>,
}

/// [`PlaybackEngine`] that runs one player process per track, with the media
/// reference as its last argument. Pausing suspends the process.
pub struct ProcessEngine {
    player: CommandLine,
    track: Mutex<Option<Track>>,
}

impl ProcessEngine {
    pub fn new(player: CommandLine) -> Self {
        Self {
            player,
            track: Mutex::new(None),
        }
    }
}

fn exit_state(status: ExitStatus) -> EngineState {
    if status.success() {
        EngineState::Ended
    } else if status.code().is_none() {
        // Terminated by a signal.
        EngineState::Stopped
    } else {
        EngineState::Error
    }
}

async fn kill(track: &mut Track) {
    if track.finished.is_some() {
        return;
    }
    if let Err(e) = track.child.kill().await {
        tracing::warn!(error = %e, "failed to kill player");
    }
    track.finished = Some(EngineState::Stopped);
}

async fn signal(pid: u32, name: &str) -> Result<(), DeviceError> {
    CommandLine::new("sh")
        .arg("-c")
        .arg("kill -s \"$0\" \"$1\"")
        .output(&[name, &pid.to_string()])
        .await
        .map(|_| ())
}

#[async_trait]
impl PlaybackEngine for ProcessEngine {
    async fn play(&self, media_ref: &str) -> Result<(), DeviceError> {
        let mut current = self.track.lock().await;
        if let Some(previous) = current.as_mut() {
            kill(previous).await;
        }
        let child = self
            .player
            .command()
            .arg(media_ref)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| DeviceError::Spawn {
                program: self.player.program().to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!(pid = child.id(), media_ref, "player started");
        *current = Some(Track {
            child,
            paused: false,
            finished: None,
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), DeviceError> {
        if let Some(track) = self.track.lock().await.as_mut() {
            kill(track).await;
        }
        Ok(())
    }

    async fn pause(&self, paused: bool) -> Result<(), DeviceError> {
        let mut current = self.track.lock().await;
        let track = current.as_mut().ok_or(DeviceError::NothingLoaded)?;
        if track.finished.is_some() || track.paused == paused {
            return Ok(());
        }
        let pid = track.child.id().ok_or(DeviceError::NothingLoaded)?;
        signal(pid, if paused { "STOP" } else { "CONT" }).await?;
        track.paused = paused;
        Ok(())
    }

    async fn state(&self) -> EngineState {
        let mut current = self.track.lock().await;
        let Some(track) = current.as_mut() else {
            return EngineState::Idle;
        };
        if let Some(state) = track.finished {
            return state;
        }
        match track.child.try_wait() {
            Ok(Some(status)) => {
                let state = exit_state(status);
                tracing::debug!(%status, ?state, "player exited");
                track.finished = Some(state);
                state
            }
            Ok(None) if track.paused => EngineState::Paused,
            Ok(None) => EngineState::Playing,
            Err(e) => {
                tracing::warn!(error = %e, "failed to poll player");
                EngineState::Error
            }
        }
    }
}
