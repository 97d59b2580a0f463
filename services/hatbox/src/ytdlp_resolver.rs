use crate::process::CommandLine;
use async_trait::async_trait;
use hatbox_core::error::ResolveError;
use hatbox_core::resolver::{ResolvedTrack, TrackResolver};
use serde::Deserialize;

/// The fields of a `yt-dlp -j` entry this program cares about.
#[derive(Debug, Deserialize)]
struct Entry {
    url: Option<String>,
    title: Option<String>,
}

/// [`TrackResolver`] that asks yt-dlp for the first search hit.
pub struct YtDlpResolver {
    command: CommandLine,
}

impl YtDlpResolver {
    pub fn new(command: CommandLine) -> Self {
        Self { command }
    }
}

fn parse_entry(stdout: &str) -> Result<ResolvedTrack, ResolveError> {
    let line = stdout
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or(ResolveError::NotFound)?;
    let entry: Entry = serde_json::from_str(line)
        .map_err(|e| ResolveError::Unavailable(format!("unreadable yt-dlp output: {e}")))?;
    match entry.url {
        Some(url) if !url.is_empty() => Ok(ResolvedTrack {
            media_ref: url,
            title: entry.title.unwrap_or_default(),
        }),
        _ => Err(ResolveError::NotFound),
    }
}

#[async_trait]
impl TrackResolver for YtDlpResolver {
    async fn resolve(&self, query: &str) -> Result<ResolvedTrack, ResolveError> {
        let search = format!("ytsearch1:{query}");
        let output = self
            .command
            .command()
            .args(["-j", &search])
            .output()
            .await
            .map_err(|e| ResolveError::Unavailable(format!("{}: {e}", self.command.program())))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(query, %stderr, "resolver failed");
            return Err(ResolveError::Unavailable(format!(
                "{} exited with {}",
                self.command.program(),
                output.status
            )));
        }
        parse_entry(&String::from_utf8_lossy(&output.stdout))
    }
}
