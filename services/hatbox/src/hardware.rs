use crate::process::CommandLine;
use anyhow::{Context, Result};

/// Machine types the voice kit software cannot run on (Pi Zero / Pi 1).
pub const UNSUPPORTED_MACHINES: &[&str] = &["armv6l"];

/// Exit code reported when the hardware check fails.
pub const UNSUPPORTED_EXIT_CODE: u8 = 255;

pub fn is_supported(machine: &str) -> bool {
    !UNSUPPORTED_MACHINES.contains(&machine.trim())
}

/// The kernel's machine hardware name, as printed by `uname -m`.
pub async fn machine() -> Result<String> {
    let output = CommandLine::new("uname")
        .arg("-m")
        .output(&[])
        .await
        .context("Failed to query the machine type")?;
    Ok(output.trim().to_string())
}
