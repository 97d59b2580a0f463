use hatbox_core::error::DeviceError;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;

/// An external program plus its fixed leading arguments, as configured
/// through a single whitespace-separated string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let program = words.next()?;
        Some(Self {
            program: program.to_string(),
            args: words.map(str::to_string).collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// A ready-to-spawn command, killed if the handle is dropped.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).stdin(Stdio::null()).kill_on_drop(true);
        command
    }

    /// Runs the program with `extra` appended and returns its stdout.
    /// A non-zero exit is an error carrying stderr.
    pub async fn output(&self, extra: &[&str]) -> Result<String, DeviceError> {
        tracing::debug!(command = %self, ?extra, "running");
        let output = self
            .command()
            .args(extra)
            .output()
            .await
            .map_err(|e| DeviceError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => output.status.to_string(),
                message => message.to_string(),
            };
            return Err(DeviceError::Failed {
                program: self.program.clone(),
                reason,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
