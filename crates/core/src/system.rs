use crate::error::DeviceError;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Device facilities outside of music playback.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait System: Send + Sync {
    /// Speak `text` through the speaker, returning once it has been said.
    async fn say(&self, text: &str) -> Result<(), DeviceError>;

    async fn shutdown(&self) -> Result<(), DeviceError>;

    async fn reboot(&self) -> Result<(), DeviceError>;

    async fn ip_address(&self) -> Result<String, DeviceError>;

    /// Master volume in percent.
    async fn volume(&self) -> Result<u8, DeviceError>;

    async fn set_volume(&self, percent: u8) -> Result<(), DeviceError>;
}

pub fn clamp_volume(current: u8, delta: i32) -> u8 {
    (i32::from(current) + delta).clamp(0, 100) as u8
}

/// Moves the master volume by `delta` percent, clamped to 0..=100, and
/// returns the new value.
pub async fn adjust_volume(system: &dyn System, delta: i32) -> Result<u8, DeviceError> {
    let current = system.volume().await?;
    let target = clamp_volume(current, delta);
    tracing::info!(current, target, "adjusting volume");
    system.set_volume(target).await?;
    Ok(target)
}
