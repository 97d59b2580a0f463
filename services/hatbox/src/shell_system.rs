use crate::process::CommandLine;
use async_trait::async_trait;
use hatbox_core::error::DeviceError;
use hatbox_core::system::System;

/// [`System`] backed by the usual Raspberry Pi command line tools.
pub struct ShellSystem {
    tts: CommandLine,
    audio_player: CommandLine,
    mixer: CommandLine,
    mixer_control: String,
    power_off: CommandLine,
    reboot: CommandLine,
    hostname: CommandLine,
}

impl ShellSystem {
    pub fn new(tts: CommandLine) -> Self {
        Self {
            tts,
            audio_player: CommandLine::new("aplay").arg("-q"),
            mixer: CommandLine::new("amixer"),
            mixer_control: "Master".to_string(),
            power_off: CommandLine::new("sudo").arg("shutdown").arg("now"),
            reboot: CommandLine::new("sudo").arg("reboot"),
            hostname: CommandLine::new("hostname").arg("-I"),
        }
    }

    pub fn with_audio_player(mut self, audio_player: CommandLine) -> Self {
        self.audio_player = audio_player;
        self
    }

    pub fn with_mixer(mut self, mixer: CommandLine, control: &str) -> Self {
        self.mixer = mixer;
        self.mixer_control = control.to_string();
        self
    }

    /// Replaces the commands run for "power off" and "reboot".
    pub fn with_power_commands(mut self, power_off: CommandLine, reboot: CommandLine) -> Self {
        self.power_off = power_off;
        self.reboot = reboot;
        self
    }

    pub fn with_hostname(mut self, hostname: CommandLine) -> Self {
        self.hostname = hostname;
        self
    }
}

/// Reads the first "[NN%]" field of `amixer get` output.
fn parse_volume(output: &str) -> Option<u8> {
    output.split('[').skip(1).find_map(|field| {
        let (number, _) = field.split_once("%]")?;
        number.trim().parse::<u8>().ok().map(|v| v.min(100))
    })
}

fn first_address(output: &str) -> Option<&str> {
    output.split_whitespace().next()
}

#[async_trait]
impl System for ShellSystem {
    /// Synthesizes `text` into a temporary wav file and plays it.
    async fn say(&self, text: &str) -> Result<(), DeviceError> {
        let wav = tempfile::Builder::new()
            .prefix("hatbox-say-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| DeviceError::Failed {
                program: self.tts.program().to_string(),
                reason: format!("no temporary file: {e}"),
            })?;
        let path = wav.path().to_string_lossy().into_owned();
        self.tts.output(&["-w", &path, text]).await?;
        self.audio_player.output(&[&path]).await?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), DeviceError> {
        tracing::warn!("powering off");
        self.power_off.output(&[]).await.map(|_| ())
    }

    async fn reboot(&self) -> Result<(), DeviceError> {
        tracing::warn!("rebooting");
        self.reboot.output(&[]).await.map(|_| ())
    }

    async fn ip_address(&self) -> Result<String, DeviceError> {
        let output = self.hostname.output(&[]).await?;
        first_address(&output)
            .map(str::to_string)
            .ok_or_else(|| DeviceError::Output {
                program: self.hostname.program().to_string(),
                output,
            })
    }

    async fn volume(&self) -> Result<u8, DeviceError> {
        let output = self.mixer.output(&["get", &self.mixer_control]).await?;
        parse_volume(&output).ok_or_else(|| DeviceError::Output {
            program: self.mixer.program().to_string(),
            output,
        })
    }

    async fn set_volume(&self, percent: u8) -> Result<(), DeviceError> {
        let level = format!("{}%", percent.min(100));
        self.mixer
            .output(&["-q", "set", &self.mixer_control, &level])
            .await
            .map(|_| ())
    }
}
