use anyhow::{Context, Result};
use hatbox_core::dispatcher::ButtonTrigger;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Treats every line read from `input` as a button press. Returns the number
/// of presses that opened a turn once the input is exhausted.
pub async fn watch_presses<R: AsyncRead + Unpin>(
    input: R,
    trigger: ButtonTrigger,
) -> Result<usize> {
    let mut lines = BufReader::new(input).lines();
    let mut started = 0;
    while lines
        .next_line()
        .await
        .context("Failed to read button input")?
        .is_some()
    {
        if trigger.press().await {
            tracing::info!("button pressed, listening");
            started += 1;
        }
    }
    Ok(started)
}
