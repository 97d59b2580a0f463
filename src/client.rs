use crate::client::stats::Stats;
use crate::types;
use anyhow::Result;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex};
use tokio_tungstenite::tungstenite::Message;

pub(crate) mod config;
mod consts;
pub(crate) mod stats;
mod utils;

pub type ClientTx = tokio::sync::mpsc::Sender<types::ClientEvent>;
type ServerTx = tokio::sync::broadcast::Sender<types::ServerEvent>;
pub type ServerRx = tokio::sync::broadcast::Receiver<types::ServerEvent>;

// Holds the channel capacity, the client/server transmitters once connected,
// the bridge configuration, and event stats guarded by a Mutex.
pub struct Client {
    capacity: usize,
    config: config::Config,
    c_tx: Option<ClientTx>,
    s_tx: Option<ServerTx>,
    stats: Arc<Mutex<Stats>>,
}

impl Client {
    fn new(capacity: usize, config: config::Config) -> Self {
        Self {
            capacity,
            config,
            c_tx: None,
            s_tx: None,
            stats: Arc::new(Mutex::new(Stats::new())),
        }
    }

    async fn connect(&mut self) -> Result<()> {
        if self.c_tx.is_some() {
            return Err(anyhow::anyhow!("already connected"));
        }

        let request = utils::build_request(&self.config)?;
        let (ws_stream, _) = tokio_tungstenite::connect_async(request).await?;
        tracing::info!(url = %self.config.url(), "connected to assistant bridge");

        let (mut write, mut read) = ws_stream.split();

        let (c_tx, mut c_rx) = tokio::sync::mpsc::channel::<types::ClientEvent>(self.capacity);
        // Subscribers attach later through `server_events`.
        let (s_tx, _) = tokio::sync::broadcast::channel(self.capacity);

        self.c_tx = Some(c_tx.clone());
        self.s_tx = Some(s_tx.clone());

        // Outgoing: serialize each control event and write it to the socket.
        tokio::spawn(async move {
            while let Some(event) = c_rx.recv().await {
                match serde_json::to_string(&event) {
                    Ok(text) => {
                        if let Err(e) = write.send(Message::Text(text.into())).await {
                            tracing::error!("failed to send message: {}", e);
                        }
                    }
                    Err(e) => {
                        tracing::error!("failed to serialize event: {}", e);
                    }
                }
            }
        });

        let stats = self.stats.clone();
        // Incoming: decode bridge events and broadcast them. A close frame is
        // forwarded as a synthetic `Close` event so subscribers can exit.
        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                let message = match message {
                    Err(e) => {
                        tracing::error!("failed to read message: {}", e);
                        break;
                    }
                    Ok(message) => message,
                };
                match message {
                    Message::Text(text) => {
                        match serde_json::from_str::<types::ServerEvent>(&text) {
                            Ok(event) => {
                                if let Ok(mut stats_guard) = stats.lock() {
                                    stats_guard.record(&event);
                                } else {
                                    tracing::error!("failed to update stats");
                                }
                                if let Err(e) = s_tx.send(event) {
                                    tracing::error!("failed to send event: {}", e);
                                }
                            }
                            Err(e) => {
                                let event_type = serde_json::from_str::<serde_json::Value>(&text)
                                    .ok()
                                    .and_then(|json| {
                                        json.get("type")
                                            .and_then(|v| v.as_str())
                                            .map(str::to_string)
                                    });
                                tracing::warn!(
                                    "failed to deserialize event: {}, type=> {:?}",
                                    e,
                                    event_type
                                );
                            }
                        }
                    }
                    Message::Binary(bin) => {
                        tracing::warn!("unexpected binary message: {} bytes", bin.len());
                    }
                    Message::Close(reason) => {
                        tracing::info!("connection closed: {:?}", reason);
                        let close_event = types::ServerEvent::Close {
                            reason: reason.map(|v| format!("{:?}", v)),
                        };
                        if let Err(e) = s_tx.send(close_event) {
                            tracing::error!("failed to send close event: {}", e);
                        }
                        break;
                    }
                    _ => {}
                }
            }
            drop(c_tx);
            drop(s_tx);
        });
        Ok(())
    }

    // Get a receiver for bridge events.
    pub fn server_events(&self) -> Result<ServerRx> {
        match self.s_tx {
            Some(ref tx) => Ok(tx.subscribe()),
            None => Err(anyhow::anyhow!("not connected yet")),
        }
    }

    pub fn stats(&self) -> Result<Stats> {
        if let Ok(stats_guard) = self.stats.lock() {
            Ok(stats_guard.clone())
        } else {
            Err(anyhow::anyhow!("failed to get stats"))
        }
    }

    async fn send_client_event(&self, event: types::ClientEvent) -> Result<()> {
        match self.c_tx {
            Some(ref tx) => {
                tx.send(event).await?;
                Ok(())
            }
            None => Err(anyhow::anyhow!("not connected yet")),
        }
    }

    /// Ask the assistant to open a new conversation turn.
    pub async fn start_conversation(&self) -> Result<()> {
        let event = types::ClientEvent::ConversationStart(
            types::events::client::ConversationStartEvent::new(),
        );
        self.send_client_event(event).await
    }

    /// Ask the assistant to end the current turn without answering.
    pub async fn stop_conversation(&self) -> Result<()> {
        let event = types::ClientEvent::ConversationStop(
            types::events::client::ConversationStopEvent::new(),
        );
        self.send_client_event(event).await
    }
}

/// The conversation controls of a bridge connection, split out so adapters
/// can be tested without a live bridge.
#[async_trait]
pub trait ConversationControl: Send + Sync {
    async fn start_conversation(&self) -> Result<()>;
    async fn stop_conversation(&self) -> Result<()>;
}

#[async_trait]
impl ConversationControl for Client {
    async fn start_conversation(&self) -> Result<()> {
        Client::start_conversation(self).await
    }

    async fn stop_conversation(&self) -> Result<()> {
        Client::stop_conversation(self).await
    }
}

pub async fn connect_with_config(capacity: usize, config: config::Config) -> Result<Client> {
    let mut client = Client::new(capacity, config);
    client.connect().await?;
    Ok(client)
}

pub async fn connect() -> Result<Client> {
    connect_with_config(consts::DEFAULT_CAPACITY, config::Config::new()).await
}
