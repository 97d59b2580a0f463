use anyhow::{Context, Result};
use clap::Parser;
use hatbox_core::context::PlaybackContext;
use hatbox_core::dispatcher::CommandDispatcher;
use hatbox_service::bridge_adapter::{BridgeRecognizer, to_recognized};
use hatbox_service::bridge_types::ServerEvent;
use hatbox_service::config::Config;
use hatbox_service::process_engine::ProcessEngine;
use hatbox_service::shell_system::ShellSystem;
use hatbox_service::spotify_catalog::SpotifyCatalog;
use hatbox_service::status_log::LogStatusUi;
use hatbox_service::ytdlp_resolver::YtDlpResolver;
use hatbox_service::{button, hardware};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Capacity of the bridge event channels.
const EVENT_CAPACITY: usize = 64;

#[derive(Parser)]
#[command(version, about = "Voice-controlled jukebox for the voice kit")]
struct Cli {
    /// Assistant bridge WebSocket URL, overriding BRIDGE_URL
    #[arg(long)]
    bridge_url: Option<String>,

    /// Do not read button presses from stdin
    #[arg(long)]
    no_button: bool,

    /// Run even on hardware the assistant does not support
    #[arg(long)]
    skip_hardware_check: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    // --- 3. Parse Command-Line Arguments ---
    let args = Cli::parse();

    // --- 4. Check the Hardware ---
    if !args.skip_hardware_check {
        match hardware::machine().await {
            Ok(machine) if !hardware::is_supported(&machine) => {
                tracing::error!(
                    %machine,
                    "unsupported hardware, pass --skip-hardware-check to run anyway"
                );
                return Ok(ExitCode::from(hardware::UNSUPPORTED_EXIT_CODE));
            }
            Ok(machine) => tracing::debug!(%machine, "hardware check passed"),
            Err(e) => tracing::warn!("Could not check the hardware: {:#}", e),
        }
    }

    // --- 5. Connect to the Assistant Bridge ---
    let bridge_url = args.bridge_url.unwrap_or_else(|| config.bridge_url.clone());
    let link_config = hatbox_link::Config::builder().with_url(&bridge_url).build();
    let link = Arc::new(
        hatbox_link::connect_with_config(EVENT_CAPACITY, link_config)
            .await
            .with_context(|| format!("Failed to connect to the assistant bridge at {bridge_url}"))?,
    );
    let mut events = link.server_events()?;

    // --- 6. Wire the Dispatcher ---
    let settings = config.session_settings();
    let catalog = SpotifyCatalog::new(
        &config.spotify_client_id,
        config.spotify_client_secret,
        &config.spotify_market,
    );
    let ctx = PlaybackContext::new(
        Arc::new(ProcessEngine::new(config.player_command)),
        Arc::new(YtDlpResolver::new(config.resolver_command)),
        Arc::new(catalog),
        Arc::new(
            ShellSystem::new(config.tts_command)
                .with_power_commands(config.power_off_command, config.reboot_command),
        ),
    )
    .with_settings(settings);

    let mut dispatcher = CommandDispatcher::new(
        ctx,
        Arc::new(BridgeRecognizer::new(link.clone())),
        Arc::new(LogStatusUi::new()),
    )
    .with_volume_step(config.volume_step);

    if !args.no_button && std::io::stdin().is_terminal() {
        let trigger = dispatcher.button_trigger();
        tokio::spawn(async move {
            tracing::info!("Press Enter to start a conversation.");
            if let Err(e) = button::watch_presses(tokio::io::stdin(), trigger).await {
                tracing::warn!("Button input stopped: {:#}", e);
            }
        });
    }

    tracing::info!("Configuration loaded successfully. Waiting for the assistant...");

    // --- 7. Event Loop ---
    let code = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down.");
                break ExitCode::SUCCESS;
            }
            event = events.recv() => match event {
                Ok(ServerEvent::Close { reason }) => {
                    tracing::info!("Bridge closed the connection: {:?}", reason);
                    break ExitCode::SUCCESS;
                }
                Ok(event) => {
                    let Some(event) = to_recognized(&event) else {
                        continue;
                    };
                    if let Err(e) = dispatcher.handle(event).await {
                        tracing::error!("{}", e);
                        break ExitCode::FAILURE;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event loop fell behind the bridge");
                }
                Err(RecvError::Closed) => break ExitCode::SUCCESS,
            }
        }
    };

    dispatcher.shutdown().await;
    if let Ok(stats) = link.stats() {
        tracing::info!(
            events = stats.events_received(),
            turns = stats.turns_started(),
            speech = stats.speech_recognized(),
            "Bridge session summary"
        );
    }
    Ok(code)
}
